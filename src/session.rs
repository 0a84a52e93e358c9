//! Session state
//!
//! [`SharedState`] is the part of a session both threads touch: the alias
//! table and the ignore/filter lists. The reader holds a read lock for the
//! duration of one filter decision; the dispatcher takes the write lock to
//! edit. [`Session`] is everything else, owned by the foreground.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::alias::AliasTable;
use crate::config::{ConfigLoader, SessionConfig, SessionOptions};
use crate::error::Result;
use crate::filter::LineFilter;
use crate::history::HistoryManager;
use crate::serial::{ReaderStats, SerialDevice};

/// State shared between the dispatcher and the background reader
#[derive(Debug, Default)]
pub struct SharedState {
    aliases: RwLock<AliasTable>,
    filter: RwLock<LineFilter>,
    stats: ReaderStats,
}

impl SharedState {
    pub fn new(aliases: AliasTable, filter: LineFilter) -> Self {
        Self {
            aliases: RwLock::new(aliases),
            filter: RwLock::new(filter),
            stats: ReaderStats::default(),
        }
    }

    pub fn aliases(&self) -> RwLockReadGuard<'_, AliasTable> {
        self.aliases.read()
    }

    pub fn aliases_mut(&self) -> RwLockWriteGuard<'_, AliasTable> {
        self.aliases.write()
    }

    pub fn filter(&self) -> RwLockReadGuard<'_, LineFilter> {
        self.filter.read()
    }

    pub fn filter_mut(&self) -> RwLockWriteGuard<'_, LineFilter> {
        self.filter.write()
    }

    pub fn stats(&self) -> &ReaderStats {
        &self.stats
    }
}

/// A running terminal session
pub struct Session<D: SerialDevice> {
    options: SessionOptions,
    config: SessionConfig,
    port: String,
    device: D,
    state: Arc<SharedState>,
    history: HistoryManager,
    log_path: Option<PathBuf>,
}

impl<D: SerialDevice> Session<D> {
    /// Build a session around an opened device.
    ///
    /// Aliases and filter precedence are seeded from `config`.
    pub fn new(
        options: SessionOptions,
        config: SessionConfig,
        port: String,
        device: D,
        history: HistoryManager,
    ) -> Self {
        let aliases = AliasTable::from_entries(config.aliases.clone());
        let filter = LineFilter::with_precedence(config.precedence());

        Self {
            options,
            config,
            port,
            device,
            state: Arc::new(SharedState::new(aliases, filter)),
            history,
            log_path: None,
        }
    }

    /// Record where this session's log file lives
    pub fn with_log_path(mut self, path: PathBuf) -> Self {
        self.log_path = Some(path);
        self
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Handle to the state shared with the reader
    pub fn shared(&self) -> Arc<SharedState> {
        Arc::clone(&self.state)
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryManager {
        &mut self.history
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Persist the current port and aliases, keeping unrelated keys
    ///
    /// The in-memory config only changes once the file has been written.
    pub fn save_config(&mut self) -> Result<PathBuf> {
        let mut updated = self.config.clone();
        updated.general.port = Some(self.port.clone());
        updated.aliases = self.state.aliases().entries().clone();

        let path = self.options.config_path();
        ConfigLoader::new(&path).save(&updated)?;
        self.config = updated;
        Ok(path)
    }

    /// Write history to disk; failure is logged, not returned
    pub fn persist_history(&self) {
        match self.history.save() {
            Ok(()) => debug!(
                "History saved to {}",
                self.history.history_file().display()
            ),
            Err(e) => warn!(
                "Failed to save history to {}: {}",
                self.history.history_file().display(),
                e
            ),
        }
    }

    /// Diagnostic dump of the session, one `(name, value)` pair per entry
    pub fn describe(&self) -> Vec<(String, String)> {
        let mut entries = vec![
            ("port".to_string(), self.port.clone()),
            ("device".to_string(), self.device.name()),
            (
                "session_dir".to_string(),
                self.options.session_dir.display().to_string(),
            ),
            (
                "config_file".to_string(),
                self.options.config_path().display().to_string(),
            ),
            (
                "history_file".to_string(),
                self.history.history_file().display().to_string(),
            ),
            (
                "meta_prefix".to_string(),
                self.options.meta_prefix.to_string(),
            ),
        ];

        if let Some(path) = &self.log_path {
            entries.push(("log_file".to_string(), path.display().to_string()));
        }

        {
            let aliases = self.state.aliases();
            let rendered: Vec<String> = aliases
                .list()
                .map(|(trigger, expansion)| format!("{}={}", trigger, expansion))
                .collect();
            entries.push(("aliases".to_string(), format!("{{{}}}", rendered.join(", "))));
        }

        {
            let filter = self.state.filter();
            let ignores: Vec<&str> = filter.ignores().iter().map(|p| p.source()).collect();
            let filters: Vec<&str> = filter.filters().iter().map(|p| p.source()).collect();
            entries.push(("ignores".to_string(), format!("[{}]", ignores.join(", "))));
            entries.push(("filters".to_string(), format!("[{}]", filters.join(", "))));
            entries.push(("precedence".to_string(), filter.precedence().to_string()));
        }

        let stats = self.state.stats();
        entries.push((
            "lines_received".to_string(),
            stats.lines_received().to_string(),
        ));
        entries.push(("lines_logged".to_string(), stats.lines_logged().to_string()));

        for (key, value) in self.config.passthrough_keys() {
            entries.push((key, value));
        }

        entries
    }
}
