pub mod glob;
pub mod path;
pub mod serde_helpers;
