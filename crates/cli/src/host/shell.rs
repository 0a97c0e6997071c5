use cmdhub_core::dispatch::TerminalHost;
use cmdhub_core::{Error, Result};
use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use tracing::{debug, warn};

#[cfg(windows)]
const SHELL: (&str, &[&str]) = ("cmd.exe", &["/Q"]);
#[cfg(not(windows))]
const SHELL: (&str, &[&str]) = ("sh", &[]);

struct ShellSession {
    name: String,
    child: RefCell<Child>,
    /// `None` once the session has been disposed
    stdin: Option<ChildStdin>,
}

/// Terminal host backed by long-lived shell processes.
///
/// Every terminal is a shell reading commands from a pipe, with output going
/// straight to this process's stdout and stderr. Sessions are closed and
/// waited for when the host is dropped, so queued commands run to completion.
pub struct ShellSessionHost {
    cwd: PathBuf,
    sessions: Vec<ShellSession>,
    active: Option<usize>,
}

impl ShellSessionHost {
    /// Shells start in `cwd`
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            sessions: Vec::new(),
            active: None,
        }
    }

    fn session(&self, terminal: usize) -> Result<&ShellSession> {
        self.sessions
            .get(terminal)
            .ok_or_else(|| Error::SpawnError(format!("no terminal with id {terminal}")))
    }

    fn close(session: &mut ShellSession) {
        if session.stdin.take().is_none() {
            return;
        }
        match session.child.get_mut().wait() {
            Ok(status) => debug!("Terminal '{}' exited with {}", session.name, status),
            Err(e) => warn!("Failed to wait for terminal '{}': {}", session.name, e),
        }
    }
}

impl TerminalHost for ShellSessionHost {
    type Terminal = usize;

    fn active_terminal(&self) -> Option<usize> {
        self.active.filter(|terminal| !self.is_closed(terminal))
    }

    fn terminal_names(&self) -> Vec<String> {
        self.sessions
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.is_closed(index))
            .map(|(_, session)| session.name.clone())
            .collect()
    }

    fn create_terminal(&mut self, name: &str) -> Result<usize> {
        let (program, args) = SHELL;
        let mut child = Command::new(program)
            .args(args)
            .current_dir(&self.cwd)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| Error::SpawnError(format!("{program}: {e}")))?;
        let stdin = child.stdin.take();
        debug!("Started {} for terminal '{}' (pid {})", program, name, child.id());

        self.sessions.push(ShellSession {
            name: name.to_string(),
            child: RefCell::new(child),
            stdin,
        });
        Ok(self.sessions.len() - 1)
    }

    fn send_text(&mut self, terminal: &usize, text: &str) -> Result<()> {
        let session = self
            .sessions
            .get_mut(*terminal)
            .ok_or_else(|| Error::SpawnError(format!("no terminal with id {terminal}")))?;
        let stdin = session
            .stdin
            .as_mut()
            .ok_or_else(|| Error::SpawnError(format!("terminal '{}' is closed", session.name)))?;
        writeln!(stdin, "{text}")?;
        stdin.flush()?;
        Ok(())
    }

    fn show(&mut self, terminal: &usize) -> Result<()> {
        let session = self.session(*terminal)?;
        eprintln!("── {} ──", session.name);
        self.active = Some(*terminal);
        Ok(())
    }

    fn dispose(&mut self, terminal: &usize) {
        if let Some(session) = self.sessions.get_mut(*terminal) {
            Self::close(session);
        }
        if self.active == Some(*terminal) {
            self.active = None;
        }
    }

    fn is_closed(&self, terminal: &usize) -> bool {
        let Some(session) = self.sessions.get(*terminal) else {
            return true;
        };
        if session.stdin.is_none() {
            return true;
        }
        matches!(session.child.borrow_mut().try_wait(), Ok(Some(_)))
    }
}

impl Drop for ShellSessionHost {
    fn drop(&mut self) {
        for session in &mut self.sessions {
            Self::close(session);
        }
    }
}
