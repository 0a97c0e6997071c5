//! Configuration management for cmdhub

mod hub;
mod manager;
mod validation;

// Re-export main types
pub use hub::{HubConfig, default_config};
pub use manager::{CONFIG_ENV_VAR, CONFIG_FILE_NAMES, ConfigManager, find_config_file};
pub use validation::{ValidationIssue, validate};
