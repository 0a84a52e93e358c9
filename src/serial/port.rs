//! `serialport`-backed device

use std::io::{self, Read, Write};

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use super::{SerialDevice, SerialSettings};
use crate::error::{Error, Result};

/// A hardware serial port
pub struct SerialPortDevice {
    port: Box<dyn SerialPort>,
    path: String,
}

impl SerialPortDevice {
    /// Open `path` at 8N1 without flow control and deassert DTR and RTS.
    pub fn open(path: &str, settings: &SerialSettings) -> Result<Self> {
        let port = serialport::new(path, settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(settings.read_timeout)
            .open()
            .map_err(|e| Error::DeviceOpenFailed {
                port: path.to_string(),
                reason: e.to_string(),
            })?;

        let mut device = Self {
            port,
            path: path.to_string(),
        };
        device.set_dtr(false)?;
        device.set_rts(false)?;

        info!("Opened {} at {} baud", path, settings.baud_rate);
        Ok(device)
    }

    fn control_error(&self, line: &'static str, err: serialport::Error) -> Error {
        Error::ControlLineFailed {
            port: self.path.clone(),
            line,
            reason: err.to_string(),
        }
    }
}

impl Write for SerialPortDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl SerialDevice for SerialPortDevice {
    fn name(&self) -> String {
        self.path.clone()
    }

    fn set_dtr(&mut self, level: bool) -> Result<()> {
        self.port
            .write_data_terminal_ready(level)
            .map_err(|e| self.control_error("DTR", e))
    }

    fn set_rts(&mut self, level: bool) -> Result<()> {
        self.port
            .write_request_to_send(level)
            .map_err(|e| self.control_error("RTS", e))
    }

    fn try_clone_reader(&self) -> Result<Box<dyn Read + Send>> {
        let clone = self.port.try_clone()?;
        Ok(Box::new(PortReader(clone)))
    }
}

/// Read half of a cloned port handle
struct PortReader(Box<dyn SerialPort>);

impl Read for PortReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}
