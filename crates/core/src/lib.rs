//! cmdhub-core - reusable, templated shell commands
//!
//! This crate provides functionality to:
//! - Extract placeholders from command templates and resolve them through
//!   an interaction port (text, choice, file and folder prompts)
//! - Substitute resolved values and workspace built-ins into the final command
//! - Dispatch commands to integrated terminals or external shell windows
//! - Build test-runner commands from module paths for Python and JavaScript
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod interaction;
pub mod module_path;
pub mod resolver;
pub mod state;
pub mod template;
pub mod test_command;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use types::*;

// Re-export main API components
pub use catalog::VariableCatalog;
pub use config::{ConfigManager, HubConfig};
pub use dispatch::{Dispatcher, ProcessSpawner, SpawnRequest, TerminalHost};
pub use executor::{CommandExecutor, ExecutionResult};
pub use interaction::InteractionPort;
pub use module_path::{ModulePathContext, TestPathResolver, resolver_for};
pub use resolver::{Resolution, VariableResolver};
pub use state::StateStore;
pub use template::{Template, WorkspaceContext};
pub use test_command::TestInvocation;
