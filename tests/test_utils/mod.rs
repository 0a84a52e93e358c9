//! Test Utilities
//!
//! Shared fixtures for the integration tests: a session wired to an
//! in-memory serial device inside a throwaway session directory.

#![allow(dead_code)]

use serialterm::serial::MockSerialDevice;
use serialterm::{
    Dispatcher, Flow, HistoryManager, Result, Session, SessionConfig, SessionOptions,
};
use tempfile::TempDir;

/// Port name recorded in fixture sessions
pub const TEST_PORT: &str = "/dev/ttyTEST0";

/// A dispatcher over a mock device, plus a handle onto that device
pub struct TestSession {
    pub dir: TempDir,
    pub device: MockSerialDevice,
    pub dispatcher: Dispatcher<MockSerialDevice, Vec<u8>>,
}

impl TestSession {
    pub fn new() -> Self {
        Self::with_device(MockSerialDevice::new(), SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self::with_device(MockSerialDevice::new(), config)
    }

    pub fn with_device(device: MockSerialDevice, config: SessionConfig) -> Self {
        let dir = TempDir::new().expect("create session dir");
        Self::in_dir(dir, device, config)
    }

    /// Build a session rooted at an existing directory, loading its history
    pub fn in_dir(dir: TempDir, device: MockSerialDevice, config: SessionConfig) -> Self {
        let options = SessionOptions::in_dir(dir.path());
        let history =
            HistoryManager::with_path(options.history_path()).expect("load history");
        let session = Session::new(options, config, TEST_PORT.to_string(), device.clone(), history);

        Self {
            dir,
            device,
            dispatcher: Dispatcher::with_output(session, Vec::new()),
        }
    }

    /// Feed one typed line
    pub fn type_line(&mut self, line: &str) -> Result<Flow> {
        self.dispatcher.handle_line(line)
    }

    /// Feed several typed lines, panicking on the first error
    pub fn type_lines(&mut self, lines: &[&str]) {
        for line in lines {
            self.type_line(line)
                .unwrap_or_else(|e| panic!("'{}' failed: {}", line, e));
        }
    }

    /// Everything printed to the user so far
    pub fn printed(&self) -> String {
        String::from_utf8_lossy(self.dispatcher.output()).into_owned()
    }

    /// Everything transmitted to the device so far
    pub fn transmitted(&self) -> String {
        self.device.written_text()
    }
}
