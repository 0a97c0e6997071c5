pub mod command;
pub mod terminal;
pub mod test_item;
pub mod test_runner;
pub mod variable;

// Re-export commonly used types
pub use command::{Command, Folder};
pub use terminal::{DEFAULT_TERMINAL_NAME, TerminalConfig, TerminalKind};
pub use test_item::{DiscoveredTest, Ecosystem, PathStyle};
pub use test_runner::TestRunnerConfig;
pub use variable::{
    CommandVariable, ResolvedVariable, SharedList, SharedVariable, Variable, VariableKind,
    VariableSource, VariableType,
};
