//! Command aliases
//!
//! An alias rewrites the leading token of a typed device command. Only the
//! first whitespace-delimited token is considered; whatever follows it is
//! kept verbatim.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

const ALIAS_USAGE: &str = "alias <ALIAS> = <CMD>";

/// Trigger to expansion table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from persisted entries
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, trigger: &str) -> Option<&str> {
        self.entries.get(trigger).map(String::as_str)
    }

    /// Add or replace an alias
    pub fn add(&mut self, trigger: &str, expansion: &str) {
        self.entries
            .insert(trigger.to_string(), expansion.to_string());
    }

    /// Remove an alias, returning its expansion
    pub fn remove(&mut self, trigger: &str) -> Result<String> {
        self.entries
            .remove(trigger)
            .ok_or_else(|| Error::AliasNotFound {
                trigger: trigger.to_string(),
            })
    }

    /// All aliases ordered by trigger
    pub fn list(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    /// Rewrite the leading token of `segment` if it names an alias
    pub fn resolve(&self, segment: &str) -> String {
        let body = segment.trim_start();
        let token_end = body.find(char::is_whitespace).unwrap_or(body.len());
        let (token, remainder) = body.split_at(token_end);

        match self.entries.get(token) {
            Some(expansion) if !token.is_empty() => format!("{}{}", expansion, remainder),
            _ => segment.to_string(),
        }
    }
}

/// Parse `TRIGGER = EXPANSION`, splitting on the first `=`
pub fn parse_definition(args: &str) -> Result<(String, String)> {
    let (trigger, expansion) = args
        .split_once('=')
        .ok_or(Error::Usage { usage: ALIAS_USAGE })?;

    let trigger = trigger.trim();
    if trigger.is_empty() || trigger.contains(char::is_whitespace) {
        return Err(Error::Usage { usage: ALIAS_USAGE });
    }

    Ok((trigger.to_string(), expansion.trim().to_string()))
}

/// Split a typed line into the device commands it contains.
///
/// Segments are separated by `;`, trimmed, and empty segments dropped.
pub fn split_commands(line: &str) -> Vec<&str> {
    line.split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}
