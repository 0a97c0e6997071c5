use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A variable attached to a single command, as stored in the config file.
///
/// `variable_type` stays a plain string on disk and is only parsed into a
/// [`VariableKind`] when the catalog for a run is built, so an unsupported
/// type surfaces as [`Error::UnknownVariableType`] for that run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandVariable {
    pub key: String,
    #[serde(rename = "type")]
    pub variable_type: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub remember: bool,
}

/// Process-wide fixed value shared by every command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedVariable {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Process-wide option list shared by every command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedList {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    Fixed,
    Options,
    Input,
    File,
    Folder,
    Environment,
}

impl VariableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::Fixed => "fixed",
            VariableType::Options => "options",
            VariableType::Input => "input",
            VariableType::File => "file",
            VariableType::Folder => "folder",
            VariableType::Environment => "environment",
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariableType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(VariableType::Fixed),
            "options" => Ok(VariableType::Options),
            "input" => Ok(VariableType::Input),
            "file" => Ok(VariableType::File),
            "folder" => Ok(VariableType::Folder),
            "environment" | "env" => Ok(VariableType::Environment),
            _ => Err(Error::UnknownVariableType(s.to_string())),
        }
    }
}

/// Typed form of a variable; each kind carries only what it needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableKind {
    Fixed { value: String },
    Options { options: Vec<String> },
    Input { default_value: Option<String> },
    File { base_dir: Option<String> },
    Folder { base_dir: Option<String> },
    Environment { name: String },
}

impl VariableKind {
    pub fn variable_type(&self) -> VariableType {
        match self {
            VariableKind::Fixed { .. } => VariableType::Fixed,
            VariableKind::Options { .. } => VariableType::Options,
            VariableKind::Input { .. } => VariableType::Input,
            VariableKind::File { .. } => VariableType::File,
            VariableKind::Folder { .. } => VariableType::Folder,
            VariableKind::Environment { .. } => VariableType::Environment,
        }
    }
}

/// Where a catalog entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableSource {
    Command,
    SharedList,
    SharedVariable,
}

impl fmt::Display for VariableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableSource::Command => f.write_str("command"),
            VariableSource::SharedList => f.write_str("shared list"),
            VariableSource::SharedVariable => f.write_str("shared variable"),
        }
    }
}

/// A merged, typed catalog entry ready for resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub key: String,
    pub label: String,
    pub kind: VariableKind,
    pub remember: bool,
    pub source: VariableSource,
}

impl Variable {
    pub fn variable_type(&self) -> VariableType {
        self.kind.variable_type()
    }

    /// Declared default, used by preview and as the input preload
    pub fn default_value(&self) -> Option<&str> {
        match &self.kind {
            VariableKind::Input { default_value } => default_value.as_deref(),
            VariableKind::Fixed { value } => Some(value.as_str()),
            _ => None,
        }
    }
}

/// A placeholder bound to its concrete value for one execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedVariable {
    pub key: String,
    pub value: String,
}

impl ResolvedVariable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
