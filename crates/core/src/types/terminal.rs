use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_TERMINAL_NAME: &str = "cmdhub";

/// Where and how a resolved command is executed, as stored in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalConfig {
    #[serde(rename = "type", default = "default_terminal_type")]
    pub terminal_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub clear_before_run: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub keep_open: bool,
}

fn default_terminal_type() -> String {
    TerminalKind::ReuseCurrent.as_str().to_string()
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            terminal_type: default_terminal_type(),
            name: None,
            cwd: None,
            clear_before_run: false,
            keep_open: false,
        }
    }
}

impl TerminalConfig {
    pub fn new(kind: TerminalKind) -> Self {
        Self {
            terminal_type: kind.as_str().to_string(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_clear_before_run(mut self, clear: bool) -> Self {
        self.clear_before_run = clear;
        self
    }

    pub fn with_keep_open(mut self, keep_open: bool) -> Self {
        self.keep_open = keep_open;
        self
    }

    pub fn kind(&self) -> Result<TerminalKind> {
        self.terminal_type.parse()
    }

    /// Configured name, or the default terminal name
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_TERMINAL_NAME)
    }

    /// `cwd` when set to something non-blank
    pub fn working_dir(&self) -> Option<&str> {
        self.cwd.as_deref().filter(|c| !c.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalKind {
    /// Reuse the active terminal, creating one if none is active
    ReuseCurrent,
    /// A named terminal reused by name across runs
    Dedicated,
    /// Detached `cmd.exe` window
    ExternalCmd,
    /// Detached PowerShell window
    ExternalPowerShell,
}

impl TerminalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalKind::ReuseCurrent => "current",
            TerminalKind::Dedicated => "dedicated",
            TerminalKind::ExternalCmd => "external-cmd",
            TerminalKind::ExternalPowerShell => "external-powershell",
        }
    }
}

impl fmt::Display for TerminalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TerminalKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "current" | "reuse-current" | "vscode-current" => Ok(TerminalKind::ReuseCurrent),
            "dedicated" | "new" | "vscode-new" => Ok(TerminalKind::Dedicated),
            "external-cmd" | "cmd" => Ok(TerminalKind::ExternalCmd),
            "external-powershell" | "powershell" => Ok(TerminalKind::ExternalPowerShell),
            _ => Err(Error::UnknownTerminalType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_kind_aliases() {
        assert_eq!("vscode-new".parse::<TerminalKind>().unwrap(), TerminalKind::Dedicated);
        assert_eq!("Current".parse::<TerminalKind>().unwrap(), TerminalKind::ReuseCurrent);
        assert_eq!("powershell".parse::<TerminalKind>().unwrap(), TerminalKind::ExternalPowerShell);
        assert!(matches!(
            "xterm".parse::<TerminalKind>(),
            Err(Error::UnknownTerminalType(t)) if t == "xterm"
        ));
    }

    #[test]
    fn test_terminal_config_defaults() {
        let config: TerminalConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.kind().unwrap(), TerminalKind::ReuseCurrent);
        assert_eq!(config.display_name(), DEFAULT_TERMINAL_NAME);
        assert!(!config.clear_before_run);

        let config: TerminalConfig = serde_json::from_str(
            r#"{"type": "dedicated", "name": "build", "cwd": " ", "clearBeforeRun": true}"#,
        )
        .unwrap();
        assert_eq!(config.display_name(), "build");
        assert_eq!(config.working_dir(), None);
        assert!(config.clear_before_run);
    }
}
