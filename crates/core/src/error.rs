use std::io;

/// Errors that can occur while resolving or dispatching a command
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    #[error("Command execution cancelled by user")]
    UserCancelled,

    #[error("Unknown variable type: {0}")]
    UnknownVariableType(String),

    #[error("Unknown terminal type: {0}")]
    UnknownTerminalType(String),

    #[error("No options provided for variable: {0}")]
    NoOptionsProvided(String),

    #[error("Invalid variable(s) in test command: {0}")]
    InvalidTestVariable(String),

    #[error("Invalid format \"{format}\" for variable ${variable}. Valid formats: dot, slash, hyphen")]
    InvalidTestFormat { variable: String, format: String },

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Interaction error: {0}")]
    InteractionError(String),

    #[error("Failed to spawn process: {0}")]
    SpawnError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Cancellation is expected and should not be reported as a failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::UserCancelled)
    }
}

/// Result type alias for cmdhub operations
pub type Result<T> = std::result::Result<T, Error>;
