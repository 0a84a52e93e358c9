//! Error types and Result aliases for serialterm

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for serialterm operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for serialterm
#[derive(Debug, Error)]
pub enum Error {
    // === Device errors ===
    /// The serial device could not be opened
    #[error("Failed to open serial device '{port}': {reason}")]
    DeviceOpenFailed { port: String, reason: String },

    /// A modem control line could not be driven
    #[error("Failed to set {line} on '{port}': {reason}")]
    ControlLineFailed {
        port: String,
        line: &'static str,
        reason: String,
    },

    /// The device stream failed mid-session (disconnect, write failure)
    #[error("Serial stream fault: {reason}")]
    StreamFault { reason: String },

    // === User input errors ===
    /// Command was used with the wrong syntax
    #[error("Usage: {usage}")]
    Usage { usage: &'static str },

    /// Meta-command name not recognised
    #[error("Command '{name}' not found")]
    UnknownCommand { name: String },

    /// Pattern text failed to compile
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// No pattern with this source text is registered
    #[error("{kind} for {pattern} not found")]
    PatternNotFound { kind: &'static str, pattern: String },

    /// No alias with this trigger is registered
    #[error("Alias '{trigger}' not found")]
    AliasNotFound { trigger: String },

    // === Configuration errors ===
    /// Failed to load configuration file
    #[error("Failed to load config from '{}': {reason}", path.display())]
    ConfigLoadFailed { path: PathBuf, reason: String },

    /// Failed to save configuration file
    #[error("Failed to save config to '{}': {reason}", path.display())]
    ConfigSaveFailed { path: PathBuf, reason: String },

    /// Session directory could not be determined or created
    #[error("Session directory '{}' unavailable: {reason}", path.display())]
    SessionDirUnavailable { path: PathBuf, reason: String },

    /// Session log could not be set up
    #[error("Failed to initialise logging: {reason}")]
    LoggingInit { reason: String },

    // === I/O errors ===
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error stems from bad user input.
    ///
    /// User errors are reported and the interactive loop continues with no
    /// state changed; everything else is a session-level failure.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::Usage { .. }
                | Error::UnknownCommand { .. }
                | Error::InvalidPattern { .. }
                | Error::PatternNotFound { .. }
                | Error::AliasNotFound { .. }
        )
    }

    /// Whether the session cannot continue after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::StreamFault { .. }
                | Error::DeviceOpenFailed { .. }
                | Error::SessionDirUnavailable { .. }
                | Error::LoggingInit { .. }
        )
    }
}

impl From<serialport::Error> for Error {
    fn from(err: serialport::Error) -> Self {
        Error::StreamFault {
            reason: err.to_string(),
        }
    }
}
