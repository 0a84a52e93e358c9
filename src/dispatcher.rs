//! Command dispatch
//!
//! Routes each typed line either to a meta-command handler or, after alias
//! resolution, to the device. Informational output goes to the dispatcher's
//! writer (stdout in the binary); errors are returned to the caller.

use std::io::Write;

use crate::alias::split_commands;
use crate::commands::{CommandParser, Input, MetaCommand};
use crate::error::{Error, Result};
use crate::serial::SerialDevice;
use crate::session::Session;

/// What the interactive loop should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Interprets typed lines against a session
pub struct Dispatcher<D: SerialDevice, W: Write> {
    session: Session<D>,
    parser: CommandParser,
    out: W,
    last_line: Option<String>,
}

impl<D: SerialDevice> Dispatcher<D, std::io::Stdout> {
    /// Dispatcher printing to stdout
    pub fn new(session: Session<D>) -> Self {
        Self::with_output(session, std::io::stdout())
    }
}

impl<D: SerialDevice, W: Write> Dispatcher<D, W> {
    pub fn with_output(session: Session<D>, out: W) -> Self {
        let parser = CommandParser::new(session.options().meta_prefix);
        Self {
            session,
            parser,
            out,
            last_line: None,
        }
    }

    pub fn session(&self) -> &Session<D> {
        &self.session
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Handle one typed line.
    ///
    /// An empty line repeats the previous non-empty one.
    pub fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let line = line.trim_end_matches(['\r', '\n']);

        let line = if line.trim().is_empty() {
            match &self.last_line {
                Some(previous) => previous.clone(),
                None => return Ok(Flow::Continue),
            }
        } else {
            self.session.history_mut().add(line);
            self.last_line = Some(line.to_string());
            line.to_string()
        };

        match self.parser.parse(&line)? {
            Input::Meta(command) => self.run_meta(command),
            Input::Device(text) => {
                self.send_commands(text)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Resolve and transmit each `;`-separated command in order
    fn send_commands(&mut self, text: &str) -> Result<()> {
        let resolved: Vec<String> = {
            let aliases = self.session.state().aliases();
            split_commands(text)
                .into_iter()
                .map(|segment| aliases.resolve(segment).trim().to_string())
                .collect()
        };

        for command in resolved {
            debug!("Sending '{}'", command);
            self.session.device_mut().send_line(&command)?;
        }
        Ok(())
    }

    fn run_meta(&mut self, command: MetaCommand) -> Result<Flow> {
        match command {
            MetaCommand::Exit => return Ok(Flow::Exit),
            MetaCommand::Reset => {
                info!("Resetting target on {}", self.session.port());
                self.session.device_mut().reset()?;
            }
            MetaCommand::Help => {
                self.session.device_mut().send_line("help")?;
            }
            MetaCommand::Save => {
                let path = self.session.save_config()?;
                self.say(format_args!("Config saved to {}", path.display()))?;
            }
            MetaCommand::ShowConfig => {
                for (name, value) in self.session.describe() {
                    self.say(format_args!("{}: {}", name, value))?;
                }
            }
            MetaCommand::ListAliases => {
                let listing: Vec<String> = self
                    .session
                    .state()
                    .aliases()
                    .list()
                    .map(|(trigger, expansion)| format!("{} = {}", trigger, expansion))
                    .collect();
                for line in listing {
                    self.say(format_args!("{}", line))?;
                }
            }
            MetaCommand::Alias { trigger, expansion } => {
                debug!("Alias {} = {}", trigger, expansion);
                self.session.state().aliases_mut().add(&trigger, &expansion);
            }
            MetaCommand::Unalias(trigger) => {
                self.session.state().aliases_mut().remove(&trigger)?;
                self.say(format_args!("Removed alias {}", trigger))?;
            }
            MetaCommand::Ignore(pattern) => {
                self.session.state().filter_mut().add_ignore(&pattern)?;
            }
            MetaCommand::Unignore(pattern) => {
                let removed = self.session.state().filter_mut().remove_ignore(&pattern)?;
                self.say(format_args!("Remove ignore for {}", removed.source()))?;
            }
            MetaCommand::Filter(pattern) => {
                self.session.state().filter_mut().add_filter(&pattern)?;
            }
            MetaCommand::Unfilter(pattern) => {
                let removed = self.session.state().filter_mut().remove_filter(&pattern)?;
                self.say(format_args!("Remove filter for {}", removed.source()))?;
            }
        }
        Ok(Flow::Continue)
    }

    fn say(&mut self, message: std::fmt::Arguments<'_>) -> Result<()> {
        writeln!(self.out, "{}", message).map_err(Error::from)
    }
}
