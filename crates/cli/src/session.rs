use anyhow::{Context, Result};
use cmdhub_core::dispatch::Dispatcher;
use cmdhub_core::{
    Command, CommandExecutor, ConfigManager, Error, HubConfig, StateStore, TerminalConfig,
    TestRunnerConfig, WorkspaceContext,
};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::host::{ShellSessionHost, SystemSpawner};

pub type Executor = CommandExecutor<ShellSessionHost, SystemSpawner>;

/// Loaded config and state for one CLI invocation
pub struct Session {
    pub manager: ConfigManager,
    pub state: StateStore,
    root: PathBuf,
}

impl Session {
    pub fn open(config: Option<&Path>, no_state: bool) -> Result<Self> {
        let manager = match config {
            Some(path) => ConfigManager::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => {
                let cwd = env::current_dir().context("Failed to get current directory")?;
                ConfigManager::discover(&cwd).context("Failed to find a cmdhub config")?
            }
        };

        let root = manager.workspace_root();
        let root = root.canonicalize().unwrap_or(root);
        debug!("Workspace root: {:?}", root);

        let mut state = if no_state {
            StateStore::in_memory()
        } else {
            let path = manager.state_path();
            StateStore::open(&path)
                .with_context(|| format!("Failed to open state {}", path.display()))?
        };

        let dropped = state
            .prune_pins(manager.config().command_ids())
            .context("Failed to update pinned commands")?;
        if !dropped.is_empty() {
            info!("Dropped pins for removed commands: {}", dropped.join(", "));
        }

        Ok(Self {
            manager,
            state,
            root,
        })
    }

    pub fn config(&self) -> &HubConfig {
        self.manager.config()
    }

    pub fn workspace_root(&self) -> &Path {
        &self.root
    }

    /// Executor whose terminals are shells started in the workspace root.
    /// With `dry_run` every final command is printed instead.
    pub fn executor(&self, active_file: Option<PathBuf>, dry_run: bool) -> Executor {
        let dispatcher = Dispatcher::new(ShellSessionHost::new(&self.root), SystemSpawner)
            .with_workspace_root(&self.root);
        let context = WorkspaceContext::from_env(Some(self.root.clone()), active_file);
        let mut executor = CommandExecutor::new(dispatcher, context);
        if dry_run {
            executor
                .dispatcher_mut()
                .set_runner(Some(Box::new(print_command)));
        }
        executor
    }

    pub fn test_runner(&self, id: &str) -> Result<&TestRunnerConfig> {
        self.manager
            .test_runner(id)
            .with_context(|| format!("Test runner not found: {id}"))
    }
}

/// `path` made absolute against the current directory, symlinks resolved
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("Failed to resolve {}", path.display()))
}

/// Command `id` from `config`
pub fn require_command<'a>(config: &'a HubConfig, id: &str) -> Result<&'a Command> {
    config
        .find_command(id)
        .ok_or_else(|| Error::CommandNotFound(id.to_string()).into())
}

fn print_command(command: &str, terminal: &TerminalConfig) -> cmdhub_core::Result<()> {
    debug!(
        "Dry run for {} terminal '{}'",
        terminal.terminal_type,
        terminal.display_name()
    );
    println!("{command}");
    Ok(())
}
