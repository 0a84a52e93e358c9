//! serialterm - an interactive serial-port terminal
//!
//! serialterm opens a serial device, relays typed lines to it and captures
//! everything the device prints into a timestamped session log, optionally
//! narrowed by ignore and filter patterns.
//!
//! ## Module Organization
//!
//! - [`serial`] - Device boundary, background line reader
//! - [`filter`] - Ignore/filter pattern lists deciding what is logged
//! - [`alias`] - Leading-token command aliases
//! - [`commands`] - Lexical parsing of typed lines
//! - [`dispatcher`] - Routing of typed lines to handlers or the device
//! - [`session`] - State shared between the dispatcher and the reader
//! - [`config`] - Persisted config and per-run options
//! - [`history`] - Persistent input history
//! - [`logging`] - Session log file and stderr mirror
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Architecture
//!
//! Two threads of control run for the whole session:
//!
//! - **Foreground:** the interactive loop reading stdin and dispatching
//! - **Serial reader:** a dedicated thread assembling device output into
//!   lines and logging the ones that pass the filter
//!
//! The alias table and pattern lists live in [`session::SharedState`] behind
//! read/write locks. On shutdown the reader is cancelled and awaited with a
//! bounded timeout.
//!
//! ## Quick Start
//!
//! ```no_run
//! use serialterm::{Dispatcher, Flow, HistoryManager, Session, SessionConfig, SessionOptions};
//! use serialterm::serial::{SerialPortDevice, SerialSettings};
//!
//! # fn main() -> serialterm::Result<()> {
//! let options = SessionOptions::default();
//! let config = SessionConfig::default();
//! let port = options.resolve_port(&config);
//! let device = SerialPortDevice::open(&port, &SerialSettings::default())?;
//! let history = HistoryManager::empty(options.history_path());
//!
//! let mut dispatcher = Dispatcher::new(Session::new(options, config, port, device, history));
//! assert_eq!(dispatcher.handle_line("/alias p = ping")?, Flow::Continue);
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate tracing;

pub mod alias;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod filter;
pub mod history;
pub mod logging;
pub mod serial;
pub mod session;

// Re-exports for core functionality
pub use alias::AliasTable;
pub use commands::{CommandParser, Input, MetaCommand};
pub use config::{ConfigLoader, SessionConfig, SessionOptions};
pub use dispatcher::{Dispatcher, Flow};
pub use error::{Error, Result};
pub use filter::{LineFilter, Pattern, Precedence};
pub use history::HistoryManager;
pub use logging::{LineSink, MemorySink, TracingSink};
pub use session::{Session, SharedState};

/// The current version of serialterm from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The application name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");
