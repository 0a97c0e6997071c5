//! Placeholder extraction and substitution.
//!
//! Recognised forms:
//! - `$name`, `${name}`: a user variable
//! - `${input:name}`: explicit user variable `name`
//! - `$input`, `${input}`, `$input:helptext="..."`: the free-text input token
//! - `${workspaceFolder}` and the other built-ins, braced form only
//!
//! Substitution is a single literal walk over the template, so substituted
//! values are never scanned for placeholders again.

use crate::catalog::VariableCatalog;
use crate::state::StateStore;
use crate::types::{ResolvedVariable, VariableKind};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Name of the reserved free-text token
pub const INPUT_TOKEN: &str = "input";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"\$(?:"#,
        r#"\{input:helptext=(?:"(?P<h1>[^"]*)"|'(?P<h2>[^']*)')\}"#,
        r#"|input:helptext=(?:"(?P<h3>[^"]*)"|'(?P<h4>[^']*)')"#,
        r#"|\{input:(?P<scoped>[A-Za-z0-9_]+)\}"#,
        r#"|\{(?P<braced>[A-Za-z0-9_]+)\}"#,
        r#"|(?P<bare>[A-Za-z0-9_]+)"#,
        r#")"#
    ))
    .expect("placeholder pattern is valid")
});

/// Workspace-context tokens substituted after user variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    WorkspaceFolder,
    WorkspaceFolderBasename,
    File,
    FileBasename,
    FileDirname,
    FileExtname,
    FileBasenameNoExtension,
    Cwd,
    PathSeparator,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "workspaceFolder" => Some(Builtin::WorkspaceFolder),
            "workspaceFolderBasename" => Some(Builtin::WorkspaceFolderBasename),
            "file" => Some(Builtin::File),
            "fileBasename" => Some(Builtin::FileBasename),
            "fileDirname" => Some(Builtin::FileDirname),
            "fileExtname" => Some(Builtin::FileExtname),
            "fileBasenameNoExtension" | "fileBasenameNoExt" => {
                Some(Builtin::FileBasenameNoExtension)
            }
            "cwd" => Some(Builtin::Cwd),
            "pathSeparator" => Some(Builtin::PathSeparator),
            _ => None,
        }
    }
}

/// One placeholder occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'t> {
    User(&'t str),
    Input { help_text: Option<&'t str> },
    Builtin(Builtin),
}

impl<'t> Token<'t> {
    fn from_captures(caps: &Captures<'t>) -> Self {
        let help = ["h1", "h2", "h3", "h4"]
            .iter()
            .find_map(|name| caps.name(name));
        if let Some(help) = help {
            let text = help.as_str();
            return Token::Input {
                help_text: (!text.is_empty()).then_some(text),
            };
        }
        if let Some(scoped) = caps.name("scoped") {
            return Self::user_or_input(scoped.as_str());
        }
        if let Some(braced) = caps.name("braced") {
            return match Builtin::from_name(braced.as_str()) {
                Some(builtin) => Token::Builtin(builtin),
                None => Self::user_or_input(braced.as_str()),
            };
        }
        let bare = caps.name("bare").map(|m| m.as_str()).unwrap_or_default();
        Self::user_or_input(bare)
    }

    fn user_or_input(name: &'t str) -> Self {
        if name == INPUT_TOKEN {
            Token::Input { help_text: None }
        } else {
            Token::User(name)
        }
    }

    /// Variable name the resolver must supply, if any
    pub fn variable_name(&self) -> Option<&'t str> {
        match self {
            Token::User(name) => Some(name),
            Token::Input { .. } => Some(INPUT_TOKEN),
            Token::Builtin(_) => None,
        }
    }
}

/// Live values for the built-in tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceContext {
    pub workspace_root: Option<PathBuf>,
    pub workspace_name: Option<String>,
    pub active_file: Option<PathBuf>,
    pub cwd: PathBuf,
    pub path_separator: char,
}

impl Default for WorkspaceContext {
    fn default() -> Self {
        Self {
            workspace_root: None,
            workspace_name: None,
            active_file: None,
            cwd: PathBuf::new(),
            path_separator: std::path::MAIN_SEPARATOR,
        }
    }
}

impl WorkspaceContext {
    /// Context for the current process working directory
    pub fn from_env(workspace_root: Option<PathBuf>, active_file: Option<PathBuf>) -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        let workspace_name = workspace_root
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned());
        Self {
            workspace_root,
            workspace_name,
            active_file,
            cwd,
            path_separator: std::path::MAIN_SEPARATOR,
        }
    }

    /// `None` when the value's prerequisite (workspace, active file) is absent
    pub fn builtin_value(&self, builtin: Builtin) -> Option<String> {
        let file = self.active_file.as_deref();
        match builtin {
            Builtin::WorkspaceFolder => self.workspace_root.as_deref().map(display),
            Builtin::WorkspaceFolderBasename => self.workspace_name.clone(),
            Builtin::File => file.map(display),
            Builtin::FileBasename => file.and_then(Path::file_name).map(lossy),
            Builtin::FileDirname => file.and_then(Path::parent).map(display),
            Builtin::FileExtname => file.map(|f| f.extension().map(lossy).unwrap_or_default()),
            Builtin::FileBasenameNoExtension => file.and_then(Path::file_stem).map(lossy),
            Builtin::Cwd => Some(display(&self.cwd)),
            Builtin::PathSeparator => Some(self.path_separator.to_string()),
        }
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn lossy(name: &std::ffi::OsStr) -> String {
    name.to_string_lossy().into_owned()
}

/// A command template
#[derive(Debug, Clone, Copy)]
pub struct Template<'t> {
    source: &'t str,
}

impl<'t> Template<'t> {
    pub fn new(source: &'t str) -> Self {
        Self { source }
    }

    /// Every placeholder occurrence, in template order
    pub fn tokens(&self) -> Vec<Token<'t>> {
        PLACEHOLDER
            .captures_iter(self.source)
            .map(|caps| Token::from_captures(&caps))
            .collect()
    }

    /// Unique variable names in first-occurrence order; built-ins excluded
    pub fn placeholders(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for token in self.tokens() {
            if let Some(name) = token.variable_name() {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    /// First non-empty `helptext` attached to the input token
    pub fn input_help_text(&self) -> Option<String> {
        self.tokens().into_iter().find_map(|token| match token {
            Token::Input {
                help_text: Some(text),
            } => Some(text.to_string()),
            _ => None,
        })
    }

    /// Substitute resolved variables and built-ins. Tokens without a value
    /// are left as written.
    pub fn render(&self, resolved: &[ResolvedVariable], context: &WorkspaceContext) -> String {
        let values: HashMap<&str, &str> = resolved
            .iter()
            .map(|v| (v.key.as_str(), v.value.as_str()))
            .collect();
        self.substitute(context, |name| values.get(name).map(|v| v.to_string()))
    }

    /// Render without prompting: fixed values are shown, anything that would
    /// need an answer appears as its default or as `[Label]`.
    pub fn preview(
        &self,
        catalog: &VariableCatalog<'_>,
        context: &WorkspaceContext,
        state: &StateStore,
    ) -> String {
        let help_text = self.input_help_text();
        self.substitute(context, |name| {
            if name == INPUT_TOKEN {
                return Some(format!("[{}]", help_text.as_deref().unwrap_or(INPUT_TOKEN)));
            }
            let variable = catalog.lookup(name).ok().flatten()?;
            let value = match &variable.kind {
                VariableKind::Fixed { value } => value.clone(),
                VariableKind::Input { default_value } => state
                    .remembered(name)
                    .map(str::to_string)
                    .or_else(|| default_value.clone())
                    .unwrap_or_else(|| format!("[{}]", variable.label)),
                _ => format!("[{}]", variable.label),
            };
            Some(value)
        })
    }

    fn substitute<F>(&self, context: &WorkspaceContext, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        PLACEHOLDER
            .replace_all(self.source, |caps: &Captures<'_>| {
                let original = &caps[0];
                let token = Token::from_captures(caps);
                let value = match token {
                    Token::Builtin(builtin) => context.builtin_value(builtin),
                    other => other.variable_name().and_then(&lookup),
                };
                value.unwrap_or_else(|| original.to_string())
            })
            .into_owned()
    }
}
