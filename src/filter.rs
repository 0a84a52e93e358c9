//! Line filtering
//!
//! Decides whether an assembled device line is recorded in the session log.
//! Two ordered pattern lists are kept: an ignore list suppressing matching
//! lines and a filter list exclusively permitting matching lines. How the two
//! interact when both are populated is governed by [`Precedence`].

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A compiled pattern together with the text it was compiled from.
///
/// The source text is what gets displayed and what removal compares against.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern, rejecting empty or malformed expressions
    pub fn new(source: &str) -> Result<Self> {
        let source = source.trim();
        if source.is_empty() {
            return Err(Error::InvalidPattern {
                pattern: String::new(),
                reason: "pattern is empty".to_string(),
            });
        }

        let regex = Regex::new(source).map_err(|e| Error::InvalidPattern {
            pattern: source.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Original pattern text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// True when a match begins at the start of `line`.
    ///
    /// `find` yields the leftmost match, so if any match starts at offset 0
    /// it is the one returned.
    pub fn matches(&self, line: &str) -> bool {
        self.regex.find(line).is_some_and(|m| m.start() == 0)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Which list wins when both ignores and filters are configured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Precedence {
    /// A non-empty filter list decides alone; ignores are not consulted
    #[default]
    FilterFirst,
    /// A non-empty ignore list decides alone; filters are not consulted
    IgnoreFirst,
    /// Log if not ignored and (no filters or some filter matches)
    Combined,
}

impl std::fmt::Display for Precedence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Precedence::FilterFirst => "filter-first",
            Precedence::IgnoreFirst => "ignore-first",
            Precedence::Combined => "combined",
        };
        f.write_str(name)
    }
}

/// Ignore and filter lists plus the rule combining them
#[derive(Debug, Clone, Default)]
pub struct LineFilter {
    ignores: Vec<Pattern>,
    filters: Vec<Pattern>,
    precedence: Precedence,
}

impl LineFilter {
    /// Create an empty filter with default precedence
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty filter with the given precedence
    pub fn with_precedence(precedence: Precedence) -> Self {
        Self {
            precedence,
            ..Self::default()
        }
    }

    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    pub fn ignores(&self) -> &[Pattern] {
        &self.ignores
    }

    pub fn filters(&self) -> &[Pattern] {
        &self.filters
    }

    /// Decide whether `line` should be recorded
    pub fn should_log(&self, line: &str) -> bool {
        let ignored = || self.ignores.iter().any(|p| p.matches(line));
        let permitted = || self.filters.iter().any(|p| p.matches(line));

        match self.precedence {
            Precedence::FilterFirst => {
                if !self.filters.is_empty() {
                    permitted()
                } else {
                    !ignored()
                }
            }
            Precedence::IgnoreFirst => {
                if !self.ignores.is_empty() {
                    !ignored()
                } else {
                    self.filters.is_empty() || permitted()
                }
            }
            Precedence::Combined => !ignored() && (self.filters.is_empty() || permitted()),
        }
    }

    /// Add an ignore pattern; the list is unchanged if compilation fails
    pub fn add_ignore(&mut self, source: &str) -> Result<()> {
        let pattern = Pattern::new(source)?;
        debug!("Adding ignore pattern {}", pattern.source());
        self.ignores.push(pattern);
        Ok(())
    }

    /// Remove the first ignore pattern whose source text equals `source`
    pub fn remove_ignore(&mut self, source: &str) -> Result<Pattern> {
        remove_by_source(&mut self.ignores, source.trim()).ok_or_else(|| Error::PatternNotFound {
            kind: "Ignore",
            pattern: source.trim().to_string(),
        })
    }

    /// Add a filter pattern; the list is unchanged if compilation fails
    pub fn add_filter(&mut self, source: &str) -> Result<()> {
        let pattern = Pattern::new(source)?;
        debug!("Adding filter pattern {}", pattern.source());
        self.filters.push(pattern);
        Ok(())
    }

    /// Remove the first filter pattern whose source text equals `source`
    pub fn remove_filter(&mut self, source: &str) -> Result<Pattern> {
        remove_by_source(&mut self.filters, source.trim()).ok_or_else(|| Error::PatternNotFound {
            kind: "Filter",
            pattern: source.trim().to_string(),
        })
    }
}

fn remove_by_source(list: &mut Vec<Pattern>, source: &str) -> Option<Pattern> {
    let index = list.iter().position(|p| p.source() == source)?;
    Some(list.remove(index))
}
