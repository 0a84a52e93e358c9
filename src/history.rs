//! Persistent input history
//!
//! Lines typed at the prompt are kept in memory during a session and written
//! back to the history file on exit, so the next session starts with them.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Maximum number of history entries to keep
const MAX_HISTORY_ENTRIES: usize = 1000;

/// Persistent input history
#[derive(Debug)]
pub struct HistoryManager {
    /// Path to the history file
    history_file: PathBuf,
    /// In-memory history, oldest first
    history: VecDeque<String>,
    /// Maximum history size
    max_size: usize,
}

impl HistoryManager {
    /// An empty history bound to `path`; nothing is read
    pub fn empty(path: PathBuf) -> Self {
        Self {
            history_file: path,
            history: VecDeque::new(),
            max_size: MAX_HISTORY_ENTRIES,
        }
    }

    /// Create a history bound to `path` and load any existing entries
    pub fn with_path(path: PathBuf) -> Result<Self> {
        let mut manager = Self::empty(path);
        manager.load()?;
        Ok(manager)
    }

    /// Load history from file; a missing file leaves the history empty
    pub fn load(&mut self) -> Result<()> {
        self.history.clear();
        if !self.history_file.exists() {
            return Ok(());
        }

        let reader = BufReader::new(File::open(&self.history_file)?);
        for line in reader.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                self.history.push_back(line);
            }
        }

        self.trim();
        Ok(())
    }

    /// Save history to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.history_file.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = File::create(&self.history_file)?;
        for entry in &self.history {
            writeln!(file, "{}", entry)?;
        }
        Ok(())
    }

    /// Add an input line to history
    pub fn add(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        // Consecutive repeats collapse into one entry
        if self.history.back().map(String::as_str) == Some(line) {
            return;
        }

        self.history.push_back(line.to_string());
        self.trim();
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &VecDeque<String> {
        &self.history
    }

    /// Get history file path
    pub fn history_file(&self) -> &Path {
        &self.history_file
    }

    fn trim(&mut self) {
        while self.history.len() > self.max_size {
            self.history.pop_front();
        }
    }
}
