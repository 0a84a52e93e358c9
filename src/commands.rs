//! Command parsing
//!
//! Splits typed lines into meta-commands (prefixed, handled locally) and
//! device commands (sent to the target). Parsing is purely lexical and never
//! touches session state, so a rejected line changes nothing.

use crate::alias;
use crate::error::{Error, Result};

/// A locally handled command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    /// Pulse DTR to reset the target
    Reset,
    /// Persist history and leave
    Exit,
    /// Write port and aliases to the config file
    Save,
    /// Print session state
    ShowConfig,
    /// Print all aliases
    ListAliases,
    /// Add or replace an alias
    Alias { trigger: String, expansion: String },
    /// Remove an alias
    Unalias(String),
    /// Add an ignore pattern
    Ignore(String),
    /// Remove an ignore pattern
    Unignore(String),
    /// Add a filter pattern
    Filter(String),
    /// Remove a filter pattern
    Unfilter(String),
    /// Ask the device for its help text
    Help,
}

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input<'a> {
    Meta(MetaCommand),
    /// Raw text for the device, possibly several `;`-separated commands
    Device(&'a str),
}

/// Lexical parser for typed lines
#[derive(Debug, Clone, Copy)]
pub struct CommandParser {
    prefix: char,
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_META_PREFIX)
    }
}

impl CommandParser {
    pub fn new(prefix: char) -> Self {
        Self { prefix }
    }

    /// Classify `line` and parse meta-command arguments
    pub fn parse<'a>(&self, line: &'a str) -> Result<Input<'a>> {
        let Some(body) = line.strip_prefix(self.prefix) else {
            if line.trim() == "help" {
                return Ok(Input::Meta(MetaCommand::Help));
            }
            return Ok(Input::Device(line));
        };

        let name_end = body
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(body.len());
        let (name, args) = body.split_at(name_end);
        let args = args.trim();

        let command = match name {
            "reset" => MetaCommand::Reset,
            "exit" => MetaCommand::Exit,
            "save" => MetaCommand::Save,
            "show_config" | "show" => MetaCommand::ShowConfig,
            "help" => MetaCommand::Help,
            "alias" => parse_alias(args)?,
            "unalias" | "rmalias" => {
                MetaCommand::Unalias(required(args, "unalias <ALIAS>")?.to_string())
            }
            "ignore" => MetaCommand::Ignore(required(args, "ignore <PATTERN>")?.to_string()),
            "unignore" => MetaCommand::Unignore(required(args, "unignore <PATTERN>")?.to_string()),
            "filter" => MetaCommand::Filter(required(args, "filter <PATTERN>")?.to_string()),
            "unfilter" => MetaCommand::Unfilter(required(args, "unfilter <PATTERN>")?.to_string()),
            _ => {
                return Err(Error::UnknownCommand {
                    name: body.split_whitespace().next().unwrap_or("").to_string(),
                })
            }
        };

        Ok(Input::Meta(command))
    }
}

fn parse_alias(args: &str) -> Result<MetaCommand> {
    if args == "list" {
        return Ok(MetaCommand::ListAliases);
    }

    let (trigger, expansion) = alias::parse_definition(args)?;
    Ok(MetaCommand::Alias { trigger, expansion })
}

fn required<'a>(args: &'a str, usage: &'static str) -> Result<&'a str> {
    if args.is_empty() {
        Err(Error::Usage { usage })
    } else {
        Ok(args)
    }
}
