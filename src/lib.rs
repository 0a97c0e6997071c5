//! Fixtures shared by the cross-crate integration tests in `tests/`

use cmdhub_core::dispatch::{ProcessSpawner, SpawnRequest, TerminalHost};
use cmdhub_core::{HubConfig, Result};
use std::path::{Path, PathBuf};

/// Terminal host that records every line sent, per terminal name
#[derive(Debug, Default)]
pub struct RecordingTerminals {
    pub terminals: Vec<(String, Vec<String>)>,
    pub shown: Vec<usize>,
}

impl RecordingTerminals {
    /// Lines sent to the terminal called `name`
    pub fn lines(&self, name: &str) -> Vec<String> {
        self.terminals
            .iter()
            .filter(|(n, _)| n == name)
            .flat_map(|(_, lines)| lines.clone())
            .collect()
    }
}

impl TerminalHost for RecordingTerminals {
    type Terminal = usize;

    fn active_terminal(&self) -> Option<usize> {
        self.shown.last().copied()
    }

    fn terminal_names(&self) -> Vec<String> {
        self.terminals.iter().map(|(name, _)| name.clone()).collect()
    }

    fn create_terminal(&mut self, name: &str) -> Result<usize> {
        self.terminals.push((name.to_string(), Vec::new()));
        Ok(self.terminals.len() - 1)
    }

    fn send_text(&mut self, terminal: &usize, text: &str) -> Result<()> {
        if let Some((_, lines)) = self.terminals.get_mut(*terminal) {
            lines.push(text.to_string());
        }
        Ok(())
    }

    fn show(&mut self, terminal: &usize) -> Result<()> {
        self.shown.push(*terminal);
        Ok(())
    }

    fn dispose(&mut self, _terminal: &usize) {}

    fn is_closed(&self, _terminal: &usize) -> bool {
        false
    }
}

/// Spawner that records requests instead of launching anything
#[derive(Debug, Default)]
pub struct RecordingSpawner {
    pub spawned: Vec<SpawnRequest>,
}

impl ProcessSpawner for RecordingSpawner {
    fn spawn_detached(&mut self, request: &SpawnRequest) -> Result<()> {
        self.spawned.push(request.clone());
        Ok(())
    }

    fn run_to_completion(&mut self, _command: &str, _cwd: Option<&Path>) -> Result<i32> {
        Ok(0)
    }
}

/// Write `config` as `.cmdhub.json` in `dir` and return the file path
pub fn write_config(dir: &Path, config: &HubConfig) -> std::io::Result<PathBuf> {
    let path = dir.join(".cmdhub.json");
    std::fs::write(&path, serde_json::to_string_pretty(config)?)?;
    Ok(path)
}
