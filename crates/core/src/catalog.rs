//! Variable catalog: command-scoped definitions merged over shared ones.
//!
//! Precedence when a key appears more than once is command variable, then
//! shared list, then shared variable. A catalog is built fresh for every
//! command run.

use crate::error::{Error, Result};
use crate::types::{
    Command, CommandVariable, SharedList, SharedVariable, Variable, VariableKind, VariableSource,
    VariableType,
};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct VariableCatalog<'a> {
    command_variables: HashMap<&'a str, &'a CommandVariable>,
    shared_lists: HashMap<&'a str, &'a SharedList>,
    shared_variables: HashMap<&'a str, &'a SharedVariable>,
}

/// Summary of a shared definition, for listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSummary {
    pub key: String,
    pub label: String,
    pub variable_type: VariableType,
    pub description: Option<String>,
    pub value: Option<String>,
    pub options: Vec<String>,
}

impl<'a> VariableCatalog<'a> {
    pub fn new(shared_variables: &'a [SharedVariable], shared_lists: &'a [SharedList]) -> Self {
        Self {
            command_variables: HashMap::new(),
            shared_lists: shared_lists.iter().map(|l| (l.key.as_str(), l)).collect(),
            shared_variables: shared_variables
                .iter()
                .map(|v| (v.key.as_str(), v))
                .collect(),
        }
    }

    /// Catalog for one command run
    pub fn for_command(
        command: &'a Command,
        shared_variables: &'a [SharedVariable],
        shared_lists: &'a [SharedList],
    ) -> Self {
        let mut catalog = Self::new(shared_variables, shared_lists);
        catalog.command_variables = command
            .variables
            .iter()
            .map(|v| (v.key.as_str(), v))
            .collect();
        catalog
    }

    /// Look up and type the definition for `key`.
    ///
    /// Returns `Ok(None)` when nothing defines the key; an unparseable type or
    /// an options variable without options is an error.
    pub fn lookup(&self, key: &str) -> Result<Option<Variable>> {
        if let Some(definition) = self.command_variables.get(key) {
            return self.from_command_variable(definition).map(Some);
        }

        if let Some(list) = self.shared_lists.get(key) {
            if list.options.is_empty() {
                return Err(Error::NoOptionsProvided(key.to_string()));
            }
            return Ok(Some(Variable {
                key: key.to_string(),
                label: label_or_key(&list.label, key),
                kind: VariableKind::Options {
                    options: list.options.clone(),
                },
                remember: false,
                source: VariableSource::SharedList,
            }));
        }

        if let Some(shared) = self.shared_variables.get(key) {
            return Ok(Some(Variable {
                key: key.to_string(),
                label: label_or_key(&shared.label, key),
                kind: VariableKind::Fixed {
                    value: shared.value.clone(),
                },
                remember: false,
                source: VariableSource::SharedVariable,
            }));
        }

        Ok(None)
    }

    fn from_command_variable(&self, definition: &CommandVariable) -> Result<Variable> {
        let key = definition.key.as_str();
        let variable_type: VariableType = definition.variable_type.parse()?;
        let label = label_or_key(definition.label.as_deref().unwrap_or(""), key);

        let kind = match variable_type {
            VariableType::Fixed => {
                // An empty command value defers to a shared value of the same key
                let value = if !definition.value.is_empty() {
                    definition.value.clone()
                } else if let Some(shared) = self.shared_variables.get(key) {
                    debug!("Fixed variable '{}' has no value, using shared value", key);
                    shared.value.clone()
                } else {
                    return Err(Error::MissingVariable(key.to_string()));
                };
                VariableKind::Fixed { value }
            }
            VariableType::Options => {
                let mut options = split_options(&definition.value);
                if options.is_empty() {
                    if let Some(list) = self.shared_lists.get(key) {
                        options = list.options.clone();
                    }
                }
                if options.is_empty() {
                    return Err(Error::NoOptionsProvided(key.to_string()));
                }
                VariableKind::Options { options }
            }
            VariableType::Input => VariableKind::Input {
                default_value: definition
                    .default_value
                    .clone()
                    .or_else(|| non_empty(&definition.value)),
            },
            VariableType::File => VariableKind::File {
                base_dir: non_empty(&definition.value),
            },
            VariableType::Folder => VariableKind::Folder {
                base_dir: non_empty(&definition.value),
            },
            VariableType::Environment => VariableKind::Environment {
                name: non_empty(&definition.value).unwrap_or_else(|| key.to_string()),
            },
        };

        Ok(Variable {
            key: key.to_string(),
            label,
            kind,
            remember: definition.remember,
            source: VariableSource::Command,
        })
    }

    /// Shared variables followed by shared lists, sorted by key within each group
    pub fn available(&self) -> Vec<VariableSummary> {
        let mut variables: Vec<_> = self
            .shared_variables
            .values()
            .map(|v| VariableSummary {
                key: v.key.clone(),
                label: label_or_key(&v.label, &v.key),
                variable_type: VariableType::Fixed,
                description: v.description.clone(),
                value: Some(v.value.clone()),
                options: Vec::new(),
            })
            .collect();
        variables.sort_by(|a, b| a.key.cmp(&b.key));

        let mut lists: Vec<_> = self
            .shared_lists
            .values()
            .map(|l| VariableSummary {
                key: l.key.clone(),
                label: label_or_key(&l.label, &l.key),
                variable_type: VariableType::Options,
                description: l.description.clone(),
                value: None,
                options: l.options.clone(),
            })
            .collect();
        lists.sort_by(|a, b| a.key.cmp(&b.key));

        variables.extend(lists);
        variables
    }
}

/// Newline-delimited option text to a list, dropping blank lines
pub fn split_options(value: &str) -> Vec<String> {
    value
        .lines()
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

fn label_or_key(label: &str, key: &str) -> String {
    if label.trim().is_empty() {
        key.to_string()
    } else {
        label.to_string()
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
