//! Ties resolution, substitution and dispatch together for one command

use crate::config::HubConfig;
use crate::dispatch::{Dispatcher, ProcessSpawner, TerminalHost};
use crate::error::Result;
use crate::interaction::InteractionPort;
use crate::resolver::{EnvLookup, Resolution, VariableResolver};
use crate::state::StateStore;
use crate::template::{Template, WorkspaceContext};
use crate::types::{Command, TestRunnerConfig};
use tracing::{debug, info, warn};

/// Outcome of running a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub success: bool,
    /// Final command string, when resolution got that far
    pub command: Option<String>,
    pub error: Option<String>,
    /// The user dismissed a prompt; nothing was dispatched
    pub cancelled: bool,
}

impl ExecutionResult {
    fn ok(command: String) -> Self {
        Self {
            success: true,
            command: Some(command),
            error: None,
            cancelled: false,
        }
    }

    fn cancelled() -> Self {
        Self {
            success: false,
            command: None,
            error: None,
            cancelled: true,
        }
    }

    fn failed(command: Option<String>, error: String) -> Self {
        Self {
            success: false,
            command,
            error: Some(error),
            cancelled: false,
        }
    }
}

pub struct CommandExecutor<H: TerminalHost, S: ProcessSpawner> {
    dispatcher: Dispatcher<H, S>,
    context: WorkspaceContext,
    env_lookup: Option<EnvLookup>,
}

impl<H: TerminalHost, S: ProcessSpawner> CommandExecutor<H, S> {
    pub fn new(dispatcher: Dispatcher<H, S>, context: WorkspaceContext) -> Self {
        Self {
            dispatcher,
            context,
            env_lookup: None,
        }
    }

    pub fn with_env_lookup(mut self, env_lookup: EnvLookup) -> Self {
        self.env_lookup = Some(env_lookup);
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher<H, S> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<H, S> {
        &mut self.dispatcher
    }

    pub fn context(&self) -> &WorkspaceContext {
        &self.context
    }

    /// Prompt for every placeholder and return the final command string.
    /// Nothing is remembered; see [`CommandExecutor::execute`].
    pub fn resolve_command(
        &self,
        command: &Command,
        config: &HubConfig,
        interaction: &mut dyn InteractionPort,
        state: &StateStore,
    ) -> Result<String> {
        self.resolve(command, config, interaction, state)
            .map(|(final_command, _)| final_command)
    }

    fn resolve(
        &self,
        command: &Command,
        config: &HubConfig,
        interaction: &mut dyn InteractionPort,
        state: &StateStore,
    ) -> Result<(String, Resolution)> {
        let catalog = config.catalog_for(command);
        let mut resolver = VariableResolver::new(&catalog, &self.context);
        if let Some(env_lookup) = self.env_lookup {
            resolver = resolver.with_env_lookup(env_lookup);
        }

        let template = Template::new(&command.command);
        let resolution = resolver.resolve(&template, interaction, state)?;
        let final_command = template.render(&resolution.variables, &self.context);
        Ok((final_command, resolution))
    }

    /// Resolve and dispatch `command`. Failures are reported in the result,
    /// never returned. Remembered values are written only after a
    /// successful dispatch.
    pub fn execute(
        &mut self,
        command: &Command,
        config: &HubConfig,
        interaction: &mut dyn InteractionPort,
        state: &mut StateStore,
    ) -> ExecutionResult {
        info!("Executing command '{}'", command.id);

        let (final_command, resolution) = match self.resolve(command, config, interaction, state) {
            Ok(resolved) => resolved,
            Err(e) if e.is_cancellation() => {
                debug!("Command '{}' cancelled during resolution", command.id);
                return ExecutionResult::cancelled();
            }
            Err(e) => {
                warn!("Failed to resolve '{}': {}", command.id, e);
                return ExecutionResult::failed(None, e.to_string());
            }
        };

        match self.dispatcher.dispatch(&final_command, &command.terminal) {
            Ok(()) => {
                resolution.remember_in(state);
                ExecutionResult::ok(final_command)
            }
            Err(e) => {
                warn!("Failed to dispatch '{}': {}", command.id, e);
                ExecutionResult::failed(Some(final_command), e.to_string())
            }
        }
    }

    /// Render `command` without prompting
    pub fn preview(&self, command: &Command, config: &HubConfig, state: &StateStore) -> String {
        let catalog = config.catalog_for(command);
        Template::new(&command.command).preview(&catalog, &self.context, state)
    }

    /// Dispatch an already rendered test command to the runner's terminal
    pub fn execute_test(&mut self, runner: &TestRunnerConfig, test_command: &str) -> ExecutionResult {
        info!("Running tests with '{}': {}", runner.id, test_command);
        match self.dispatcher.dispatch(test_command, &runner.terminal_config()) {
            Ok(()) => ExecutionResult::ok(test_command.to_string()),
            Err(e) => ExecutionResult::failed(Some(test_command.to_string()), e.to_string()),
        }
    }
}
