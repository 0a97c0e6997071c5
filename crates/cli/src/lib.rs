pub mod cli;
pub mod commands;
pub mod display;
pub mod host;
pub mod interaction;
pub mod session;
pub mod utils;

// Re-export commonly used items
pub use cli::{Cli, Commands};
pub use session::Session;
