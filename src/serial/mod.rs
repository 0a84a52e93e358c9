//! Serial device boundary
//!
//! The session talks to the target through the [`SerialDevice`] trait. The
//! production implementation wraps a `serialport` handle; [`MockSerialDevice`]
//! stands in for hardware in tests.
//!
//! The reading half of the device runs on its own thread (see [`reader`]),
//! so devices hand out an independent reader via
//! [`SerialDevice::try_clone_reader`] while the foreground keeps the writer.

pub mod mock;
pub mod port;
pub mod reader;

use std::io::{Read, Write};
use std::time::Duration;

use crate::error::{Error, Result};

pub use mock::MockSerialDevice;
pub use port::SerialPortDevice;
pub use reader::{
    run_reader, spawn_reader, CancelToken, LineAssembler, ReaderExit, ReaderHandle, ReaderStats,
};

/// Baud rate every session runs at
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Port read timeout; bounds how long the reader takes to notice cancellation
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Parameters used when opening a device
#[derive(Debug, Clone, PartialEq)]
pub struct SerialSettings {
    /// Line speed in baud
    pub baud_rate: u32,
    /// Blocking read timeout
    pub read_timeout: Duration,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// A byte-oriented device the session writes commands to
pub trait SerialDevice: Write + Send {
    /// Device path or a descriptive name
    fn name(&self) -> String;

    /// Drive the DTR control line
    fn set_dtr(&mut self, level: bool) -> Result<()>;

    /// Drive the RTS control line
    fn set_rts(&mut self, level: bool) -> Result<()>;

    /// An independent handle for the background reader
    fn try_clone_reader(&self) -> Result<Box<dyn Read + Send>>;

    /// Pulse DTR to reset the target
    fn reset(&mut self) -> Result<()> {
        debug!("Pulsing DTR on {}", self.name());
        self.set_dtr(true)?;
        self.set_dtr(false)
    }

    /// Write one command followed by a newline
    fn send_line(&mut self, line: &str) -> Result<()> {
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');

        self.write_all(&data)
            .and_then(|_| self.flush())
            .map_err(|e| Error::StreamFault {
                reason: format!("write to {} failed: {}", self.name(), e),
            })
    }
}
