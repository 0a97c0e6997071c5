use super::{HubConfig, default_config, validate};
use crate::error::{Error, Result};
use crate::state::STATE_FILE_NAME;
use crate::types::{Command, TestRunnerConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Names searched for, in order, in every directory on the way up
pub const CONFIG_FILE_NAMES: [&str; 3] = [".cmdhub.json", "cmdhub.json", ".cmdhub.toml"];

/// Environment variable naming a config file, bypassing discovery
pub const CONFIG_ENV_VAR: &str = "CMDHUB_CONFIG";

type ChangeListener = Box<dyn Fn(&HubConfig)>;

/// Owns the loaded config and the file it came from
pub struct ConfigManager {
    path: PathBuf,
    config: HubConfig,
    listeners: Vec<ChangeListener>,
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("path", &self.path)
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Walk up from `start_path` to the nearest directory holding a config file
pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
    let mut current = start_path;

    loop {
        for name in CONFIG_FILE_NAMES {
            let config_path = current.join(name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }

        current = current.parent()?;
    }
}

impl ConfigManager {
    /// Locate and load the config for `start`, honouring `CMDHUB_CONFIG`
    pub fn discover(start: &Path) -> Result<Self> {
        let env_override = std::env::var(CONFIG_ENV_VAR).ok();
        Self::discover_from(start, env_override.as_deref())
    }

    pub fn discover_from(start: &Path, env_override: Option<&str>) -> Result<Self> {
        if let Some(path) = env_override.filter(|p| !p.trim().is_empty()) {
            debug!("Using config from {}: {}", CONFIG_ENV_VAR, path);
            return Self::load(path);
        }

        let path = find_config_file(start).ok_or_else(|| {
            Error::ConfigError(format!(
                "No config file found in {} or any parent directory (looked for {})",
                start.display(),
                CONFIG_FILE_NAMES.join(", ")
            ))
        })?;
        Self::load(path)
    }

    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = read_config(&path)?;
        info!(
            "Loaded config {:?} (version {}, {} commands)",
            path,
            config.version,
            config.commands().len()
        );
        Ok(Self {
            path,
            config,
            listeners: Vec::new(),
        })
    }

    /// Manager for a config that has not been written yet
    pub fn with_config(path: impl Into<PathBuf>, config: HubConfig) -> Self {
        Self {
            path: path.into(),
            config,
            listeners: Vec::new(),
        }
    }

    /// Write the starter config to `path`, refusing to overwrite unless `force`
    pub fn write_default(path: impl Into<PathBuf>, force: bool) -> Result<Self> {
        let path = path.into();
        if path.exists() && !force {
            return Err(Error::ConfigError(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }
        let mut manager = Self::with_config(path, default_config());
        manager.save()?;
        Ok(manager)
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Mutable access; changes are kept in memory until [`save`](Self::save)
    pub fn config_mut(&mut self) -> &mut HubConfig {
        &mut self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The directory holding the config file
    pub fn workspace_root(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.workspace_root().join(STATE_FILE_NAME)
    }

    pub fn find_command(&self, id: &str) -> Option<&Command> {
        self.config.find_command(id)
    }

    pub fn commands(&self) -> Vec<(Vec<&str>, &Command)> {
        self.config.commands()
    }

    pub fn test_runner(&self, id: &str) -> Option<&TestRunnerConfig> {
        self.config.test_runner(id)
    }

    /// Register a listener fired after every reload and save
    pub fn on_change(&mut self, listener: impl Fn(&HubConfig) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Re-read the file from disk
    pub fn reload(&mut self) -> Result<()> {
        self.config = read_config(&self.path)?;
        debug!("Reloaded config {:?}", self.path);
        self.notify();
        Ok(())
    }

    /// Validate, stamp and write the config
    pub fn save(&mut self) -> Result<()> {
        let issues = validate(&self.config);
        if !issues.is_empty() {
            let summary: Vec<String> = issues.iter().map(ToString::to_string).collect();
            return Err(Error::ConfigError(format!(
                "Refusing to save invalid config:\n  {}",
                summary.join("\n  ")
            )));
        }

        self.config.version += 1;
        self.config.last_modified = Some(chrono::Utc::now().to_rfc3339());
        write_config(&self.path, &self.config)?;
        info!("Saved config {:?} (version {})", self.path, self.config.version);
        self.notify();
        Ok(())
    }

    /// Copy the current file to `<path>.backup.<millis>` and return the copy's path
    pub fn backup(&self) -> Result<PathBuf> {
        let millis = chrono::Utc::now().timestamp_millis();
        let backup = PathBuf::from(format!("{}.backup.{millis}", self.path.display()));
        std::fs::copy(&self.path, &backup)?;
        info!("Backed up config to {:?}", backup);
        Ok(backup)
    }

    /// Replace the config with a backup's contents and save it
    pub fn restore_from_backup(&mut self, backup: &Path) -> Result<()> {
        self.config = read_config(backup)?;
        self.save()
    }

    /// Replace the config with the contents of another config file and save it
    pub fn import(&mut self, source: &Path) -> Result<()> {
        let imported = read_config(source)?;
        info!(
            "Importing {} commands from {:?}",
            imported.commands().len(),
            source
        );
        self.config = imported;
        self.save()
    }

    /// Write the current config to `target`; the format follows its extension
    pub fn export(&self, target: &Path) -> Result<()> {
        write_config(target, &self.config)?;
        info!("Exported config to {:?}", target);
        Ok(())
    }

    fn notify(&self) {
        for listener in &self.listeners {
            listener(&self.config);
        }
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

fn read_config(path: &Path) -> Result<HubConfig> {
    let contents = std::fs::read_to_string(path)?;
    if is_toml(path) {
        toml::from_str(&contents).map_err(|e| {
            Error::ConfigError(format!("Failed to parse config {}: {e}", path.display()))
        })
    } else {
        serde_json::from_str(&contents).map_err(|e| {
            Error::ConfigError(format!("Failed to parse config {}: {e}", path.display()))
        })
    }
}

fn write_config(path: &Path, config: &HubConfig) -> Result<()> {
    let contents = if is_toml(path) {
        toml::to_string_pretty(config)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?
    } else {
        serde_json::to_string_pretty(config)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}
