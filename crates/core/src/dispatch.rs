//! Execution dispatch: sends a final command string to a terminal or spawns
//! an external shell for it.
//!
//! Terminals and processes are reached through the [`TerminalHost`] and
//! [`ProcessSpawner`] traits, so the dispatcher owns no platform code. The
//! dispatcher keeps the only terminal-by-name cache.

use crate::error::Result;
use crate::types::{TerminalConfig, TerminalKind};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Clear-screen instruction sent before a command when `clearBeforeRun` is set
pub const CLEAR_SCREEN: &str = if cfg!(windows) { "cls" } else { "clear" };

/// Integrated terminals owned by the host
pub trait TerminalHost {
    type Terminal: Clone + PartialEq + std::fmt::Debug;

    /// Terminal the user is currently looking at, if any
    fn active_terminal(&self) -> Option<Self::Terminal>;

    /// Names of every terminal the host currently has open
    fn terminal_names(&self) -> Vec<String>;

    fn create_terminal(&mut self, name: &str) -> Result<Self::Terminal>;

    /// Send one line of input; the host appends the newline
    fn send_text(&mut self, terminal: &Self::Terminal, text: &str) -> Result<()>;

    fn show(&mut self, terminal: &Self::Terminal) -> Result<()>;

    fn dispose(&mut self, terminal: &Self::Terminal);

    /// Whether the terminal has exited since it was created
    fn is_closed(&self, terminal: &Self::Terminal) -> bool;
}

/// A process launch for an external shell window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Pass arguments to the program without re-quoting
    pub verbatim: bool,
}

pub trait ProcessSpawner {
    /// Start a process in its own process group (and console on Windows)
    /// with ignored stdio, and do not wait for it
    fn spawn_detached(&mut self, request: &SpawnRequest) -> Result<()>;

    /// Run `command` through the platform shell and wait for its exit code
    fn run_to_completion(&mut self, command: &str, cwd: Option<&Path>) -> Result<i32>;
}

/// Argument list for launching `command` in a new external shell window
pub fn external_invocation(kind: TerminalKind, command: &str, cwd: Option<&str>) -> SpawnRequest {
    match kind {
        TerminalKind::ExternalPowerShell => SpawnRequest {
            program: "powershell.exe".to_string(),
            args: vec![
                "-NoExit".to_string(),
                "-Command".to_string(),
                format!("& {{ {command} }}"),
            ],
            cwd: cwd.map(PathBuf::from),
            verbatim: true,
        },
        _ => {
            let mut args: Vec<String> = ["/c", "start", "\"\"", "cmd.exe", "/k"]
                .iter()
                .map(|s| s.to_string())
                .collect();
            args.push(command.to_string());
            if let Some(dir) = cwd {
                args.splice(2..2, ["/d".to_string(), dir.to_string()]);
            }
            SpawnRequest {
                program: "cmd.exe".to_string(),
                args,
                cwd: None,
                verbatim: true,
            }
        }
    }
}

/// Replacement for backend dispatch
pub type CustomRunner = Box<dyn FnMut(&str, &TerminalConfig) -> Result<()>>;

pub struct Dispatcher<H: TerminalHost, S: ProcessSpawner> {
    host: H,
    spawner: S,
    terminals: BTreeMap<String, H::Terminal>,
    runner: Option<CustomRunner>,
    workspace_root: Option<PathBuf>,
}

impl<H: TerminalHost, S: ProcessSpawner> Dispatcher<H, S> {
    pub fn new(host: H, spawner: S) -> Self {
        Self {
            host,
            spawner,
            terminals: BTreeMap::new(),
            runner: None,
            workspace_root: None,
        }
    }

    /// Root used to resolve relative working directories for blocking runs
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Install or remove a runner that replaces backend dispatch entirely
    pub fn set_runner(&mut self, runner: Option<CustomRunner>) {
        self.runner = runner;
    }

    pub fn dispatch(&mut self, command: &str, config: &TerminalConfig) -> Result<()> {
        if let Some(runner) = self.runner.as_mut() {
            debug!("Dispatching through custom runner: {}", command);
            return runner(command, config);
        }

        let kind = config.kind()?;
        debug!("Dispatching to {} terminal: {}", kind, command);
        match kind {
            TerminalKind::ReuseCurrent => self.run_in_current(command, config),
            TerminalKind::Dedicated => self.run_in_dedicated(command, config),
            TerminalKind::ExternalCmd | TerminalKind::ExternalPowerShell => {
                let request = external_invocation(kind, command, config.working_dir());
                info!("Spawning {} {:?}", request.program, request.args);
                self.spawner.spawn_detached(&request)
            }
        }
    }

    /// Run `command` and wait for it, returning its exit code. A relative
    /// `cwd` is taken from the workspace root; no `cwd` means the root.
    pub fn dispatch_and_wait(&mut self, command: &str, config: &TerminalConfig) -> Result<i32> {
        let cwd = match (config.working_dir(), &self.workspace_root) {
            (Some(dir), Some(root)) if !Path::new(dir).is_absolute() => Some(root.join(dir)),
            (Some(dir), _) => Some(PathBuf::from(dir)),
            (None, root) => root.clone(),
        };
        info!("Running {} in {:?}", command, cwd);
        self.spawner.run_to_completion(command, cwd.as_deref())
    }

    fn run_in_current(&mut self, command: &str, config: &TerminalConfig) -> Result<()> {
        let terminal = match self.host.active_terminal() {
            Some(active) => {
                debug!("Reusing active terminal");
                if config.keep_open {
                    if let Some(name) = config.name.as_deref().filter(|n| !n.is_empty()) {
                        self.terminals.insert(name.to_string(), active.clone());
                    }
                }
                active
            }
            None => {
                let name = config.display_name().to_string();
                let terminal = self.create_managed_terminal(&name)?;
                self.terminals.insert(name, terminal.clone());
                self.host.show(&terminal)?;
                terminal
            }
        };
        self.send_command(&terminal, command, config)
    }

    fn run_in_dedicated(&mut self, command: &str, config: &TerminalConfig) -> Result<()> {
        let name = config.display_name().to_string();

        let cached = self.terminals.get(&name).cloned();
        let terminal = match cached {
            Some(terminal) if !self.host.is_closed(&terminal) => {
                debug!("Reusing dedicated terminal '{}'", name);
                terminal
            }
            stale => {
                if stale.is_some() {
                    debug!("Dedicated terminal '{}' was closed, recreating", name);
                }
                let terminal = self.create_managed_terminal(&name)?;
                self.terminals.insert(name, terminal.clone());
                terminal
            }
        };

        self.host.show(&terminal)?;
        self.send_command(&terminal, command, config)
    }

    fn send_command(
        &mut self,
        terminal: &H::Terminal,
        command: &str,
        config: &TerminalConfig,
    ) -> Result<()> {
        if config.clear_before_run {
            self.host.send_text(terminal, CLEAR_SCREEN)?;
        }
        if let Some(cwd) = config.working_dir() {
            self.host.send_text(terminal, &format!("cd \"{cwd}\""))?;
        }
        self.host.send_text(terminal, command)
    }

    /// Create a terminal whose name does not clash with one the host has open
    fn create_managed_terminal(&mut self, base_name: &str) -> Result<H::Terminal> {
        let existing = self.host.terminal_names();
        let mut candidate = base_name.to_string();
        let mut attempt = 1;
        while existing.iter().any(|n| *n == candidate) {
            candidate = format!("{base_name} #{attempt}");
            attempt += 1;
        }
        info!("Creating terminal '{}'", candidate);
        self.host.create_terminal(&candidate)
    }

    pub fn get(&self, name: &str) -> Option<&H::Terminal> {
        self.terminals.get(name)
    }

    pub fn show(&mut self, name: &str) -> Result<()> {
        match self.terminals.get(name) {
            Some(terminal) => self.host.show(terminal),
            None => Ok(()),
        }
    }

    /// Dispose the named terminal and drop it from the cache. Unknown names
    /// are ignored.
    pub fn dispose(&mut self, name: &str) {
        if let Some(terminal) = self.terminals.get(name) {
            self.host.dispose(terminal);
            self.terminals.remove(name);
        }
    }

    pub fn dispose_all(&mut self) {
        for terminal in self.terminals.values() {
            self.host.dispose(terminal);
        }
        self.terminals.clear();
    }

    pub fn names(&self) -> Vec<String> {
        self.terminals.keys().cloned().collect()
    }

    /// Forget cached terminals the host reports as closed
    pub fn prune_closed(&mut self) -> Vec<String> {
        let closed: Vec<String> = self
            .terminals
            .iter()
            .filter(|(_, t)| self.host.is_closed(t))
            .map(|(name, _)| name.clone())
            .collect();
        for name in &closed {
            self.terminals.remove(name);
        }
        closed
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{HostEvent, RecordingHost, RecordingSpawner};
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn dispatcher() -> Dispatcher<RecordingHost, RecordingSpawner> {
        Dispatcher::new(RecordingHost::default(), RecordingSpawner::default())
    }

    #[test]
    fn test_reuse_current_without_active_terminal() {
        let mut dispatcher = dispatcher();
        let config = TerminalConfig::new(TerminalKind::ReuseCurrent)
            .with_clear_before_run(true)
            .with_cwd("/srv/app");

        dispatcher.dispatch("make build", &config).unwrap();

        assert_eq!(
            dispatcher.host().events(),
            vec![
                HostEvent::Created("cmdhub".to_string()),
                HostEvent::Shown(0),
                HostEvent::Sent(0, CLEAR_SCREEN.to_string()),
                HostEvent::Sent(0, "cd \"/srv/app\"".to_string()),
                HostEvent::Sent(0, "make build".to_string()),
            ]
        );
    }

    #[test]
    fn test_reuse_current_uses_active_terminal() {
        let host = RecordingHost {
            active: Some(7),
            ..Default::default()
        };
        let mut dispatcher = Dispatcher::new(host, RecordingSpawner::default());
        let config = TerminalConfig::default().with_name("build").with_keep_open(true);

        dispatcher.dispatch("ls", &config).unwrap();

        assert_eq!(
            dispatcher.host().events(),
            vec![HostEvent::Sent(7, "ls".to_string())]
        );
        assert_eq!(dispatcher.get("build"), Some(&7));
    }

    #[test]
    fn test_dedicated_terminal_is_reused() {
        let mut dispatcher = dispatcher();
        let config = TerminalConfig::new(TerminalKind::Dedicated).with_name("tests");

        dispatcher.dispatch("npm test", &config).unwrap();
        dispatcher.dispatch("npm test", &config).unwrap();

        let created = dispatcher
            .host()
            .events()
            .into_iter()
            .filter(|e| matches!(e, HostEvent::Created(_)))
            .count();
        assert_eq!(created, 1);
        assert_eq!(dispatcher.names(), vec!["tests".to_string()]);
    }

    #[test]
    fn test_closed_dedicated_terminal_is_recreated() {
        let mut dispatcher = dispatcher();
        let config = TerminalConfig::new(TerminalKind::Dedicated).with_name("tests");

        dispatcher.dispatch("a", &config).unwrap();
        dispatcher.host.closed.push(0);
        dispatcher.dispatch("b", &config).unwrap();

        let events = dispatcher.host().events();
        assert!(events.contains(&HostEvent::Created("tests #1".to_string())));
        assert_eq!(dispatcher.get("tests"), Some(&1));
    }

    #[test]
    fn test_new_terminal_names_are_unique() {
        let host = RecordingHost {
            names: vec!["cmdhub".to_string(), "cmdhub #1".to_string()],
            ..Default::default()
        };
        let mut dispatcher = Dispatcher::new(host, RecordingSpawner::default());

        dispatcher
            .dispatch("x", &TerminalConfig::new(TerminalKind::Dedicated))
            .unwrap();

        assert_eq!(
            dispatcher.host().events()[0],
            HostEvent::Created("cmdhub #2".to_string())
        );
        assert!(dispatcher.get("cmdhub").is_some());
    }

    #[test]
    fn test_external_cmd_arguments() {
        let request = external_invocation(TerminalKind::ExternalCmd, "dir", Some("C:\\work"));
        assert_eq!(request.program, "cmd.exe");
        assert_eq!(
            request.args,
            vec!["/c", "start", "/d", "C:\\work", "\"\"", "cmd.exe", "/k", "dir"]
        );
        assert_eq!(request.cwd, None);

        let request = external_invocation(TerminalKind::ExternalCmd, "dir", None);
        assert_eq!(request.args, vec!["/c", "start", "\"\"", "cmd.exe", "/k", "dir"]);
    }

    #[test]
    fn test_external_powershell_arguments() {
        let request =
            external_invocation(TerminalKind::ExternalPowerShell, "Get-Date", Some("C:\\work"));
        assert_eq!(request.program, "powershell.exe");
        assert_eq!(request.args, vec!["-NoExit", "-Command", "& { Get-Date }"]);
        assert_eq!(request.cwd, Some(PathBuf::from("C:\\work")));
    }

    #[test]
    fn test_external_dispatch_spawns_without_terminals() {
        let mut dispatcher = dispatcher();
        dispatcher
            .dispatch("echo hi", &TerminalConfig::new(TerminalKind::ExternalCmd))
            .unwrap();

        assert_eq!(dispatcher.spawner().spawned.len(), 1);
        assert!(dispatcher.host().events().is_empty());
    }

    #[test]
    fn test_unknown_terminal_type_is_fatal() {
        let mut dispatcher = dispatcher();
        let config = TerminalConfig {
            terminal_type: "tmux".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            dispatcher.dispatch("ls", &config),
            Err(Error::UnknownTerminalType(t)) if t == "tmux"
        ));
    }

    #[test]
    fn test_custom_runner_replaces_backend() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut dispatcher = dispatcher();
        dispatcher.set_runner(Some(Box::new(move |command: &str, config: &TerminalConfig| {
            sink.borrow_mut()
                .push(format!("{}:{}", config.terminal_type, command));
            Ok(())
        })));

        dispatcher
            .dispatch("ls", &TerminalConfig::new(TerminalKind::Dedicated))
            .unwrap();

        assert_eq!(*seen.borrow(), vec!["dedicated:ls".to_string()]);
        assert!(dispatcher.host().events().is_empty());
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut dispatcher = dispatcher();
        let config = TerminalConfig::new(TerminalKind::Dedicated).with_name("a");
        dispatcher.dispatch("x", &config).unwrap();
        dispatcher
            .dispatch("y", &config.clone().with_name("b"))
            .unwrap();

        dispatcher.dispose("a");
        dispatcher.dispose("a");
        assert_eq!(dispatcher.names(), vec!["b".to_string()]);

        dispatcher.dispose_all();
        assert!(dispatcher.names().is_empty());
        let disposed = dispatcher
            .host()
            .events()
            .into_iter()
            .filter(|e| matches!(e, HostEvent::Disposed(_)))
            .count();
        assert_eq!(disposed, 2);
    }

    #[test]
    fn test_prune_closed() {
        let mut dispatcher = dispatcher();
        let config = TerminalConfig::new(TerminalKind::Dedicated).with_name("a");
        dispatcher.dispatch("x", &config).unwrap();
        dispatcher.host.closed.push(0);

        assert_eq!(dispatcher.prune_closed(), vec!["a".to_string()]);
        assert!(dispatcher.get("a").is_none());
    }

    #[test]
    fn test_dispatch_and_wait_resolves_cwd() {
        let mut dispatcher = Dispatcher::new(RecordingHost::default(), RecordingSpawner::default())
            .with_workspace_root("/ws");

        let config = TerminalConfig::default().with_cwd("web");
        assert_eq!(dispatcher.dispatch_and_wait("npm test", &config).unwrap(), 0);
        dispatcher
            .dispatch_and_wait("pytest", &TerminalConfig::default())
            .unwrap();

        assert_eq!(
            dispatcher.spawner().runs,
            vec![
                ("npm test".to_string(), Some(PathBuf::from("/ws").join("web"))),
                ("pytest".to_string(), Some(PathBuf::from("/ws")))
            ]
        );
    }
}
