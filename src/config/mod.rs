//! Configuration management for serialterm
//!
//! Two kinds of configuration exist:
//!
//! - [`SessionConfig`]: the persisted config file (port, aliases, filter
//!   precedence). Keys this crate does not recognise are kept in a
//!   passthrough map so saving never drops them.
//! - [`SessionOptions`]: per-run options from the command line (session
//!   directory, config file name, port override, meta-command prefix).

pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::filter::Precedence;

pub use loader::ConfigLoader;

/// Port used when neither the command line nor the config file names one
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Config file name inside the session directory
pub const DEFAULT_CONFIG_FILE: &str = "serialterm.toml";

/// Session directory name under the user's home
pub const DEFAULT_SESSION_DIR_NAME: &str = ".serialterm";

/// History file name inside the session directory
pub const HISTORY_FILE: &str = "history";

/// Character introducing a meta-command
pub const DEFAULT_META_PREFIX: char = '/';

/// Persisted session configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// `[general]` section
    #[serde(default)]
    pub general: GeneralConfig,

    /// `[aliases]` section, trigger to expansion
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, String>,

    /// Unrecognised top-level sections, preserved verbatim
    #[serde(flatten)]
    pub passthrough: BTreeMap<String, toml::Value>,
}

/// `[general]` section of the config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Serial device path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,

    /// How ignore and filter lists combine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precedence: Option<Precedence>,

    /// Unrecognised keys, preserved verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, toml::Value>,
}

impl SessionConfig {
    /// Filter precedence, falling back to the default
    pub fn precedence(&self) -> Precedence {
        self.general.precedence.unwrap_or_default()
    }

    /// Every unrecognised key flattened to `section.key = value`
    pub fn passthrough_keys(&self) -> BTreeMap<String, String> {
        let mut keys = BTreeMap::new();

        for (key, value) in &self.general.extra {
            keys.insert(format!("general.{}", key), display_value(value));
        }

        for (section, value) in &self.passthrough {
            match value {
                toml::Value::Table(table) => {
                    for (key, value) in table {
                        keys.insert(format!("{}.{}", section, key), display_value(value));
                    }
                }
                other => {
                    keys.insert(section.clone(), display_value(other));
                }
            }
        }

        keys
    }
}

fn display_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Per-run options
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    /// Port given on the command line, overriding the config file
    pub port: Option<String>,
    /// Directory holding config, history and session logs
    pub session_dir: PathBuf,
    /// Config file name inside `session_dir`
    pub config_file: String,
    /// Character introducing a meta-command
    pub meta_prefix: char,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            port: None,
            session_dir: default_session_dir(),
            config_file: DEFAULT_CONFIG_FILE.to_string(),
            meta_prefix: DEFAULT_META_PREFIX,
        }
    }
}

impl SessionOptions {
    /// Options rooted at `session_dir` with everything else defaulted
    pub fn in_dir(session_dir: impl Into<PathBuf>) -> Self {
        Self {
            session_dir: session_dir.into(),
            ..Self::default()
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.session_dir.join(&self.config_file)
    }

    pub fn history_path(&self) -> PathBuf {
        self.session_dir.join(HISTORY_FILE)
    }

    /// Load the session config file.
    ///
    /// A missing file yields defaults; a file that exists but does not parse
    /// is an error and is never replaced by defaults.
    pub fn load_config(&self) -> Result<SessionConfig> {
        ConfigLoader::new(self.config_path()).load()
    }

    /// Port to open: command line first, then config file, then default
    pub fn resolve_port(&self, config: &SessionConfig) -> String {
        self.port
            .clone()
            .or_else(|| config.general.port.clone())
            .unwrap_or_else(|| DEFAULT_PORT.to_string())
    }

    /// Create the session directory if it does not exist yet
    pub fn ensure_session_dir(&self) -> Result<&Path> {
        std::fs::create_dir_all(&self.session_dir).map_err(|e| Error::SessionDirUnavailable {
            path: self.session_dir.clone(),
            reason: e.to_string(),
        })?;
        Ok(&self.session_dir)
    }
}

/// `~/.serialterm`, or `./.serialterm` when no home directory is known
pub fn default_session_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_SESSION_DIR_NAME)
}
