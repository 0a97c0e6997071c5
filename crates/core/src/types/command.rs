use super::{CommandVariable, TerminalConfig};
use serde::{Deserialize, Serialize};

/// A reusable, templated shell command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub id: String,
    pub label: String,
    /// Template string with `$name`, `${name}` or `${input:name}` placeholders
    pub command: String,
    #[serde(default)]
    pub terminal: TerminalConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<CommandVariable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Command {
    pub fn new(id: impl Into<String>, label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            command: command.into(),
            ..Default::default()
        }
    }

    pub fn with_variable(mut self, variable: CommandVariable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn with_terminal(mut self, terminal: TerminalConfig) -> Self {
        self.terminal = terminal;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub commands: Vec<Command>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subfolders: Vec<Folder>,
}
