//! Persisted state: remembered variable values and pinned command ids.
//!
//! The store is read once at startup and written after every mutation. A
//! store without a path lives in memory only.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const STATE_FILE_NAME: &str = ".cmdhub-state.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateData {
    #[serde(default)]
    remembered: BTreeMap<String, String>,
    #[serde(default)]
    pinned_commands: Vec<String>,
}

#[derive(Debug, Default)]
pub struct StateStore {
    data: StateData,
    path: Option<PathBuf>,
}

impl StateStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store at `path`, starting empty if the file does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents).map_err(|e| {
                Error::ConfigError(format!("Failed to parse state file {}: {e}", path.display()))
            })?
        } else {
            StateData::default()
        };
        debug!(
            "Loaded state from {:?}: {} remembered, {} pinned",
            path,
            data.remembered.len(),
            data.pinned_commands.len()
        );
        Ok(Self {
            data,
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn remembered(&self, key: &str) -> Option<&str> {
        self.data.remembered.get(key).map(String::as_str)
    }

    pub fn remembered_values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data
            .remembered
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn remember(&mut self, key: &str, value: &str) -> Result<()> {
        self.data
            .remembered
            .insert(key.to_string(), value.to_string());
        self.save()
    }

    /// Returns whether a value was removed
    pub fn forget(&mut self, key: &str) -> Result<bool> {
        let removed = self.data.remembered.remove(key).is_some();
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    pub fn clear_remembered(&mut self) -> Result<()> {
        self.data.remembered.clear();
        self.save()
    }

    pub fn pinned(&self) -> &[String] {
        &self.data.pinned_commands
    }

    pub fn is_pinned(&self, id: &str) -> bool {
        self.data.pinned_commands.iter().any(|p| p == id)
    }

    /// Returns false if the id was already pinned
    pub fn pin(&mut self, id: &str) -> Result<bool> {
        if self.is_pinned(id) {
            return Ok(false);
        }
        self.data.pinned_commands.push(id.to_string());
        self.save()?;
        Ok(true)
    }

    pub fn unpin(&mut self, id: &str) -> Result<bool> {
        let before = self.data.pinned_commands.len();
        self.data.pinned_commands.retain(|p| p != id);
        let removed = self.data.pinned_commands.len() != before;
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Drop pins whose command no longer exists; returns the dropped ids
    pub fn prune_pins<'a>(&mut self, valid_ids: impl IntoIterator<Item = &'a str>) -> Result<Vec<String>> {
        let valid: Vec<&str> = valid_ids.into_iter().collect();
        let (kept, dropped): (Vec<String>, Vec<String>) = self
            .data
            .pinned_commands
            .drain(..)
            .partition(|id| valid.contains(&id.as_str()));
        self.data.pinned_commands = kept;
        if !dropped.is_empty() {
            debug!("Pruned stale pins: {:?}", dropped);
            self.save()?;
        }
        Ok(dropped)
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.data)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
