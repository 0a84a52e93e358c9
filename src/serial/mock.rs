//! In-memory serial device for tests

use std::io::{self, Cursor, Read, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use super::SerialDevice;
use crate::error::Result;

#[derive(Debug, Default)]
struct MockState {
    written: Vec<u8>,
    incoming: Vec<u8>,
    dtr_history: Vec<bool>,
    rts_history: Vec<bool>,
    fail_writes: bool,
}

/// A fake device recording everything written to it.
///
/// Clones share state, so a test can keep one handle for inspection while
/// the session owns another.
#[derive(Debug, Clone, Default)]
pub struct MockSerialDevice {
    state: Arc<Mutex<MockState>>,
}

impl MockSerialDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// A device whose reader yields `bytes` and then reports end of stream
    pub fn with_incoming(bytes: &[u8]) -> Self {
        let device = Self::new();
        device.state.lock().incoming = bytes.to_vec();
        device
    }

    /// Make subsequent writes fail as if the device was unplugged
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Everything written so far
    pub fn written(&self) -> Vec<u8> {
        self.state.lock().written.clone()
    }

    /// Everything written so far, lossily decoded
    pub fn written_text(&self) -> String {
        String::from_utf8_lossy(&self.state.lock().written).into_owned()
    }

    /// Every DTR level set, in order
    pub fn dtr_history(&self) -> Vec<bool> {
        self.state.lock().dtr_history.clone()
    }

    /// Every RTS level set, in order
    pub fn rts_history(&self) -> Vec<bool> {
        self.state.lock().rts_history.clone()
    }
}

impl Write for MockSerialDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"));
        }
        state.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SerialDevice for MockSerialDevice {
    fn name(&self) -> String {
        "mock".to_string()
    }

    fn set_dtr(&mut self, level: bool) -> Result<()> {
        self.state.lock().dtr_history.push(level);
        Ok(())
    }

    fn set_rts(&mut self, level: bool) -> Result<()> {
        self.state.lock().rts_history.push(level);
        Ok(())
    }

    fn try_clone_reader(&self) -> Result<Box<dyn Read + Send>> {
        let incoming = self.state.lock().incoming.clone();
        Ok(Box::new(Cursor::new(incoming)))
    }
}
