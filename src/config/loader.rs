//! Configuration File Loading
//!
//! Reads and writes the TOML session config. A missing file is not an
//! error: the session starts from defaults and the file is only created by
//! an explicit save.

use super::SessionConfig;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file loader bound to one path
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, or defaults when the file does not exist
    pub fn load(&self) -> Result<SessionConfig> {
        if !self.path.exists() {
            debug!("No config at {}, using defaults", self.path.display());
            return Ok(SessionConfig::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| Error::ConfigLoadFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let config: SessionConfig =
            toml::from_str(&content).map_err(|e| Error::ConfigLoadFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        info!(
            "Loaded config from {} ({} aliases)",
            self.path.display(),
            config.aliases.len()
        );
        Ok(config)
    }

    /// Write `config`, creating parent directories as needed
    pub fn save(&self, config: &SessionConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::ConfigSaveFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| Error::ConfigSaveFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        fs::write(&self.path, content).map_err(|e| Error::ConfigSaveFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        info!("Config saved to {}", self.path.display());
        Ok(())
    }
}
