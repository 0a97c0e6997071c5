//! Variable resolution: one sequential pass over a template's placeholders.
//!
//! Prompts appear in first-occurrence order. Resolution is all-or-nothing:
//! the first failure or cancellation discards everything resolved so far.
//! Values to remember are handed back to the caller, which persists them
//! once the command actually ran.

use crate::catalog::VariableCatalog;
use crate::error::{Error, Result};
use crate::interaction::{InteractionPort, PickRequest, TextPrompt};
use crate::state::StateStore;
use crate::template::{INPUT_TOKEN, Template, WorkspaceContext};
use crate::types::{ResolvedVariable, Variable, VariableKind};
use crate::utils::path;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Values for every placeholder, plus the ones marked `remember`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub variables: Vec<ResolvedVariable>,
    pub to_remember: Vec<(String, String)>,
}

impl Resolution {
    /// Persist the remembered values; failures are logged and skipped
    pub fn remember_in(&self, state: &mut StateStore) {
        for (key, value) in &self.to_remember {
            if let Err(e) = state.remember(key, value) {
                warn!("Failed to remember value for '{}': {}", key, e);
            }
        }
    }
}

/// First entry of every options prompt
pub const CUSTOM_INPUT_OPTION: &str = "✏️ Custom Input...";

/// Looks up a process environment variable
pub type EnvLookup = fn(&str) -> Option<String>;

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

pub struct VariableResolver<'a> {
    catalog: &'a VariableCatalog<'a>,
    context: &'a WorkspaceContext,
    env_lookup: EnvLookup,
}

impl<'a> VariableResolver<'a> {
    pub fn new(catalog: &'a VariableCatalog<'a>, context: &'a WorkspaceContext) -> Self {
        Self {
            catalog,
            context,
            env_lookup: process_env,
        }
    }

    pub fn with_env_lookup(mut self, env_lookup: EnvLookup) -> Self {
        self.env_lookup = env_lookup;
        self
    }

    /// Resolve every placeholder in `template`
    pub fn resolve(
        &self,
        template: &Template<'_>,
        interaction: &mut dyn InteractionPort,
        state: &StateStore,
    ) -> Result<Resolution> {
        let placeholders = template.placeholders();
        if placeholders.is_empty() {
            return Ok(Resolution::default());
        }

        let help_text = template.input_help_text();
        let mut resolved = Vec::with_capacity(placeholders.len());
        let mut to_remember = Vec::new();

        for key in &placeholders {
            if key == INPUT_TOKEN {
                let value = self.prompt_free_input(help_text.as_deref(), interaction)?;
                resolved.push(ResolvedVariable::new(key.as_str(), value));
                continue;
            }

            let variable = self
                .catalog
                .lookup(key)?
                .ok_or_else(|| Error::MissingVariable(key.clone()))?;
            let value = self.resolve_variable(&variable, interaction, state)?;

            if variable.remember {
                to_remember.push((key.clone(), value.clone()));
            }
            resolved.push(ResolvedVariable::new(key.as_str(), value));
        }

        Ok(Resolution {
            variables: resolved,
            to_remember,
        })
    }

    fn prompt_free_input(
        &self,
        help_text: Option<&str>,
        interaction: &mut dyn InteractionPort,
    ) -> Result<String> {
        let request = TextPrompt {
            prompt: if help_text.is_some() {
                "Tip: add $input:helptext=\"Your text\" to commands to show custom guidance."
                    .to_string()
            } else {
                "Enter input for the command".to_string()
            },
            placeholder: help_text
                .unwrap_or("Type your input here (can be empty)")
                .to_string(),
            default_value: String::new(),
        };
        interaction
            .prompt_text(&request)?
            .ok_or(Error::UserCancelled)
    }

    fn resolve_variable(
        &self,
        variable: &Variable,
        interaction: &mut dyn InteractionPort,
        state: &StateStore,
    ) -> Result<String> {
        let key = variable.key.as_str();
        match &variable.kind {
            VariableKind::Fixed { value } => {
                debug!("Resolved fixed variable '{}' from {}", key, variable.source);
                Ok(value.clone())
            }
            VariableKind::Options { options } => {
                self.resolve_options(variable, options, interaction)
            }
            VariableKind::Input { default_value } => {
                let default_value = state
                    .remembered(key)
                    .map(str::to_string)
                    .or_else(|| default_value.clone())
                    .unwrap_or_default();
                let request = TextPrompt {
                    prompt: format!("Enter value for {}", variable.label),
                    placeholder: variable.label.clone(),
                    default_value,
                };
                interaction
                    .prompt_text(&request)?
                    .ok_or(Error::UserCancelled)
            }
            VariableKind::File { base_dir } => {
                let request = self.pick_request(variable, base_dir.as_deref(), "file");
                let picked = interaction
                    .pick_file(&request)?
                    .ok_or(Error::UserCancelled)?;
                Ok(picked.display().to_string())
            }
            VariableKind::Folder { base_dir } => {
                let request = self.pick_request(variable, base_dir.as_deref(), "folder");
                let picked = interaction
                    .pick_folder(&request)?
                    .ok_or(Error::UserCancelled)?;
                Ok(picked.display().to_string())
            }
            VariableKind::Environment { name } => {
                let value = (self.env_lookup)(name)
                    .ok_or_else(|| Error::MissingVariable(key.to_string()))?;
                debug!("Resolved environment variable '{}' from ${}", key, name);
                Ok(value)
            }
        }
    }

    fn resolve_options(
        &self,
        variable: &Variable,
        options: &[String],
        interaction: &mut dyn InteractionPort,
    ) -> Result<String> {
        debug!(
            "Resolving list variable '{}' from {} with {} options",
            variable.key,
            variable.source,
            options.len()
        );

        let mut choices = Vec::with_capacity(options.len() + 1);
        choices.push(CUSTOM_INPUT_OPTION.to_string());
        choices.extend(options.iter().cloned());

        let placeholder = format!("Select {} or choose custom input", variable.label);
        let selection = interaction
            .prompt_choice(&choices, &placeholder)?
            .ok_or(Error::UserCancelled)?;

        match selection {
            0 => {
                debug!("User selected custom input for '{}'", variable.key);
                let request = TextPrompt {
                    prompt: format!("Enter custom value for {}", variable.label),
                    placeholder: "Type your custom option here".to_string(),
                    default_value: String::new(),
                };
                interaction
                    .prompt_text(&request)?
                    .ok_or(Error::UserCancelled)
            }
            index => choices.get(index).cloned().ok_or_else(|| {
                Error::InteractionError(format!(
                    "selection {index} is out of range for '{}'",
                    variable.key
                ))
            }),
        }
    }

    fn pick_request(&self, variable: &Variable, base_dir: Option<&str>, noun: &str) -> PickRequest {
        let label = if variable.label != variable.key {
            format!("Select {}", variable.label)
        } else {
            format!("Select {noun}")
        };
        PickRequest {
            label,
            base_dir: self.base_directory(base_dir),
        }
    }

    /// Starting directory for a picker: `${workspaceFolder}` is expanded and
    /// relative paths are taken from the workspace root.
    fn base_directory(&self, base_dir: Option<&str>) -> Option<PathBuf> {
        let root = self.context.workspace_root.as_ref();
        let Some(raw) = base_dir else {
            return root.cloned();
        };
        let root_text = root.map(|r| r.display().to_string()).unwrap_or_default();
        let expanded = raw.replace("${workspaceFolder}", &root_text);
        let trimmed = expanded.trim();
        if trimmed.is_empty() {
            return root.cloned();
        }
        if path::is_absolute(trimmed) || root.is_none() {
            Some(PathBuf::from(trimmed))
        } else {
            root.map(|r| r.join(trimmed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{Answer, Asked, ScriptedInteraction};
    use crate::types::{Command, CommandVariable, SharedList, SharedVariable};

    fn var(key: &str, variable_type: &str, value: &str) -> CommandVariable {
        CommandVariable {
            key: key.to_string(),
            variable_type: variable_type.to_string(),
            value: value.to_string(),
            ..Default::default()
        }
    }

    fn context() -> WorkspaceContext {
        WorkspaceContext {
            workspace_root: Some(PathBuf::from("/ws")),
            ..Default::default()
        }
    }

    fn resolve(
        command: &Command,
        shared: &[SharedVariable],
        lists: &[SharedList],
        answers: Vec<Answer>,
    ) -> (Result<Vec<ResolvedVariable>>, ScriptedInteraction, StateStore) {
        let catalog = VariableCatalog::for_command(command, shared, lists);
        let ctx = context();
        let resolver = VariableResolver::new(&catalog, &ctx).with_env_lookup(fake_env);
        let mut interaction = ScriptedInteraction::new(answers);
        let state = StateStore::in_memory();
        let result = resolver
            .resolve(&Template::new(&command.command), &mut interaction, &state)
            .map(|resolution| resolution.variables);
        (result, interaction, state)
    }

    fn fake_env(name: &str) -> Option<String> {
        (name == "CMDHUB_TEST_USER").then(|| "alice".to_string())
    }

    #[test]
    fn test_one_interaction_per_unique_placeholder() {
        let command = Command::new("c", "C", "$a ${b} $a ${input:b}")
            .with_variable(var("a", "input", ""))
            .with_variable(var("b", "options", "x\ny"));
        let (result, interaction, _) = resolve(
            &command,
            &[],
            &[],
            vec![Answer::text("first"), Answer::Choice(2)],
        );

        let resolved = result.unwrap();
        assert_eq!(
            resolved,
            vec![ResolvedVariable::new("a", "first"), ResolvedVariable::new("b", "y")]
        );
        assert_eq!(interaction.asked().len(), 2);
    }

    #[test]
    fn test_fixed_and_environment_need_no_interaction() {
        let command = Command::new("c", "C", "$env $user")
            .with_variable(var("env", "fixed", "staging"))
            .with_variable(var("user", "environment", "CMDHUB_TEST_USER"));
        let shared = vec![SharedVariable {
            key: "env".to_string(),
            label: "Env".to_string(),
            value: "prod".to_string(),
            description: None,
        }];
        let (result, interaction, _) = resolve(&command, &shared, &[], vec![]);

        assert_eq!(
            result.unwrap(),
            vec![
                ResolvedVariable::new("env", "staging"),
                ResolvedVariable::new("user", "alice")
            ]
        );
        assert!(interaction.asked().is_empty());
    }

    #[test]
    fn test_unset_environment_variable_is_missing() {
        let command = Command::new("c", "C", "echo $home")
            .with_variable(var("home", "environment", "CMDHUB_UNSET_VARIABLE"));
        let (result, _, _) = resolve(&command, &[], &[], vec![]);

        assert!(matches!(result, Err(Error::MissingVariable(k)) if k == "home"));
    }

    #[test]
    fn test_undefined_placeholder_is_missing() {
        let command = Command::new("c", "C", "echo $nothing");
        let (result, _, _) = resolve(&command, &[], &[], vec![]);
        assert!(matches!(result, Err(Error::MissingVariable(k)) if k == "nothing"));
    }

    #[test]
    fn test_options_present_custom_input_first() {
        let lists = vec![SharedList {
            key: "region".to_string(),
            label: "Region".to_string(),
            options: vec!["eu".to_string(), "us".to_string()],
            description: None,
        }];
        let command = Command::new("c", "C", "deploy $region");
        let (result, interaction, _) =
            resolve(&command, &[], &lists, vec![Answer::Choice(0), Answer::text("ap")]);

        assert_eq!(result.unwrap(), vec![ResolvedVariable::new("region", "ap")]);
        match &interaction.asked()[0] {
            Asked::Choice {
                options,
                placeholder,
            } => {
                assert_eq!(options[0], CUSTOM_INPUT_OPTION);
                assert_eq!(&options[1..], ["eu".to_string(), "us".to_string()]);
                assert_eq!(placeholder, "Select Region or choose custom input");
            }
            other => panic!("unexpected prompt {other:?}"),
        }
    }

    #[test]
    fn test_cancelling_custom_input_cancels_everything() {
        let command = Command::new("c", "C", "$region")
            .with_variable(var("region", "options", "eu\nus"));
        let (result, _, _) =
            resolve(&command, &[], &[], vec![Answer::Choice(0), Answer::Cancel]);

        assert!(matches!(result, Err(Error::UserCancelled)));
    }

    #[test]
    fn test_cancellation_discards_partial_results() {
        let mut remembered = var("name", "input", "");
        remembered.remember = true;
        let command = Command::new("c", "C", "$name $input")
            .with_variable(remembered);
        let (result, interaction, state) =
            resolve(&command, &[], &[], vec![Answer::text("bob"), Answer::Cancel]);

        assert!(matches!(result, Err(Error::UserCancelled)));
        assert_eq!(interaction.asked().len(), 2);
        assert_eq!(state.remembered("name"), None);
    }

    #[test]
    fn test_resolution_reports_values_to_remember_without_writing() {
        let mut remembered = var("name", "input", "");
        remembered.remember = true;
        let command = Command::new("c", "C", "hello $name $greeting")
            .with_variable(remembered)
            .with_variable(var("greeting", "fixed", "hi"));
        let catalog = VariableCatalog::for_command(&command, &[], &[]);
        let ctx = context();
        let resolver = VariableResolver::new(&catalog, &ctx);
        let state = StateStore::in_memory();
        let mut interaction = ScriptedInteraction::new([Answer::text("bob")]);

        let resolution = resolver
            .resolve(&Template::new(&command.command), &mut interaction, &state)
            .unwrap();

        assert_eq!(
            resolution.to_remember,
            vec![("name".to_string(), "bob".to_string())]
        );
        assert_eq!(state.remembered("name"), None);
    }

    #[test]
    fn test_free_input_accepts_empty_answer_and_help_text() {
        let command = Command::new("c", "C", r#"git commit -m "$input:helptext="Message"""#);
        let (result, interaction, _) = resolve(&command, &[], &[], vec![Answer::text("")]);

        assert_eq!(result.unwrap(), vec![ResolvedVariable::new("input", "")]);
        match &interaction.asked()[0] {
            Asked::Text(prompt) => assert_eq!(prompt.placeholder, "Message"),
            other => panic!("unexpected prompt {other:?}"),
        }
    }

    #[test]
    fn test_remembered_value_preloads_input() {
        let mut variable = var("branch", "input", "");
        variable.remember = true;
        variable.default_value = Some("main".to_string());
        let command = Command::new("c", "C", "git checkout $branch").with_variable(variable);
        let catalog = VariableCatalog::for_command(&command, &[], &[]);
        let ctx = context();
        let resolver = VariableResolver::new(&catalog, &ctx);
        let mut state = StateStore::in_memory();
        let template = Template::new(&command.command);

        let mut first = ScriptedInteraction::new([Answer::text("feature")]);
        resolver
            .resolve(&template, &mut first, &state)
            .unwrap()
            .remember_in(&mut state);
        assert!(matches!(&first.asked()[0], Asked::Text(p) if p.default_value == "main"));
        assert_eq!(state.remembered("branch"), Some("feature"));

        let mut second = ScriptedInteraction::new([Answer::text("feature")]);
        resolver.resolve(&template, &mut second, &state).unwrap();
        assert!(matches!(&second.asked()[0], Asked::Text(p) if p.default_value == "feature"));
    }

    #[test]
    fn test_file_and_folder_picks() {
        let command = Command::new("c", "C", "cp $src $dest")
            .with_variable(var("src", "file", "${workspaceFolder}/assets"))
            .with_variable(var("dest", "folder", "out"));
        let (result, interaction, _) = resolve(
            &command,
            &[],
            &[],
            vec![Answer::path("/ws/assets/logo.png"), Answer::path("/ws/out")],
        );

        assert_eq!(
            result.unwrap(),
            vec![
                ResolvedVariable::new("src", "/ws/assets/logo.png"),
                ResolvedVariable::new("dest", "/ws/out")
            ]
        );
        match &interaction.asked()[..] {
            [Asked::File(file), Asked::Folder(folder)] => {
                assert_eq!(file.base_dir, Some(PathBuf::from("/ws/assets")));
                assert_eq!(folder.base_dir, Some(PathBuf::from("/ws").join("out")));
            }
            other => panic!("unexpected prompts {other:?}"),
        }
    }

    #[test]
    fn test_cancelled_file_pick() {
        let command = Command::new("c", "C", "cat $f").with_variable(var("f", "file", ""));
        let (result, _, _) = resolve(&command, &[], &[], vec![Answer::Cancel]);
        assert!(matches!(result, Err(Error::UserCancelled)));
    }
}
