//! Configuration validation, run before saving and by `cmdhub validate`

use super::HubConfig;
use crate::catalog::split_options;
use crate::test_command::validate_test_command;
use crate::types::{Command, Folder, VariableType};
use std::collections::HashSet;
use std::fmt;

/// One problem found in a config, with where it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub location: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Every issue in `config`; an empty list means the config is valid
pub fn validate(config: &HubConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let shared_lists: HashSet<&str> = config
        .shared_lists
        .iter()
        .map(|list| list.key.as_str())
        .collect();

    let mut command_ids = HashSet::new();
    for (index, folder) in config.folders.iter().enumerate() {
        validate_folder(
            folder,
            &format!("folders[{index}]"),
            &shared_lists,
            &mut command_ids,
            &mut issues,
        );
    }

    let mut shared_keys = HashSet::new();
    for variable in &config.shared_variables {
        if !shared_keys.insert(variable.key.as_str()) {
            issues.push(ValidationIssue::new(
                format!("sharedVariables.{}", variable.key),
                "duplicate shared key",
            ));
        }
    }
    for list in &config.shared_lists {
        let location = format!("sharedLists.{}", list.key);
        if !shared_keys.insert(list.key.as_str()) {
            issues.push(ValidationIssue::new(&location, "duplicate shared key"));
        }
        if list.options.iter().all(|option| option.trim().is_empty()) {
            issues.push(ValidationIssue::new(&location, "shared list has no options"));
        }
    }

    let mut runner_ids = HashSet::new();
    for runner in &config.test_runners {
        let location = format!("testRunners.{}", runner.id);
        if !runner_ids.insert(runner.id.as_str()) {
            issues.push(ValidationIssue::new(&location, "duplicate test runner id"));
        }
        if let Err(e) = validate_test_command(&runner.run_test_command) {
            issues.push(ValidationIssue::new(&location, e.to_string()));
        }
    }

    issues
}

fn validate_folder<'a>(
    folder: &'a Folder,
    location: &str,
    shared_lists: &HashSet<&str>,
    command_ids: &mut HashSet<&'a str>,
    issues: &mut Vec<ValidationIssue>,
) {
    if folder.name.trim().is_empty() {
        issues.push(ValidationIssue::new(location, "folder name is empty"));
    }

    for command in &folder.commands {
        if command.id.trim().is_empty() {
            issues.push(ValidationIssue::new(
                format!("{location}.commands[{}]", command.label),
                "command id is empty",
            ));
        } else if !command_ids.insert(command.id.as_str()) {
            issues.push(ValidationIssue::new(
                format!("commands.{}", command.id),
                "duplicate command id",
            ));
        }
        validate_command(command, shared_lists, issues);
    }

    for (index, subfolder) in folder.subfolders.iter().enumerate() {
        validate_folder(
            subfolder,
            &format!("{location}.subfolders[{index}]"),
            shared_lists,
            command_ids,
            issues,
        );
    }
}

fn validate_command(command: &Command, shared_lists: &HashSet<&str>, issues: &mut Vec<ValidationIssue>) {
    if let Err(e) = command.terminal.kind() {
        issues.push(ValidationIssue::new(
            format!("commands.{}.terminal", command.id),
            e.to_string(),
        ));
    }

    for variable in &command.variables {
        let location = format!("commands.{}.variables.{}", command.id, variable.key);
        match variable.variable_type.parse::<VariableType>() {
            Ok(VariableType::Options) => {
                if split_options(&variable.value).is_empty()
                    && !shared_lists.contains(variable.key.as_str())
                {
                    issues.push(ValidationIssue::new(location, "options variable has no options"));
                }
            }
            Ok(_) => {}
            Err(e) => issues.push(ValidationIssue::new(location, e.to_string())),
        }
    }
}
