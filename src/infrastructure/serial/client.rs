use crate::domain::config::DeviceConfig;
use crate::infrastructure::serial::port::Endpoint;
use serialport::{ClearBuffer, SerialPort};
use std::io::{self, Read, Write};
use std::time::Duration;
use tracing::{debug, info};

/// Byte-level operations a device session needs from an open serial handle.
///
/// The handle is released when the value is dropped.
pub trait SerialLink: Send {
    /// Discard bytes already received but not yet read
    fn clear_input(&mut self) -> io::Result<()>;

    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    /// Number of bytes that can be read without blocking
    fn bytes_available(&mut self) -> io::Result<usize>;

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Parameters for opening a link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSettings {
    pub baud_rate: u32,
    /// Applies to both reads and writes
    pub timeout: Duration,
}

impl From<&DeviceConfig> for LinkSettings {
    fn from(config: &DeviceConfig) -> Self {
        Self {
            baud_rate: config.baud_rate,
            timeout: config.timeout(),
        }
    }
}

/// Opens exclusive links to an endpoint
pub trait PortOpener {
    type Link: SerialLink;

    fn open(&self, endpoint: &Endpoint, settings: &LinkSettings) -> serialport::Result<Self::Link>;
}

/// [`SerialLink`] over a `serialport` handle
pub struct SerialPortLink {
    port: Box<dyn SerialPort>,
}

impl SerialPortLink {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl SerialLink for SerialPortLink {
    fn clear_input(&mut self) -> io::Result<()> {
        self.port.clear(ClearBuffer::Input).map_err(io::Error::from)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        self.port
            .bytes_to_read()
            .map(|n| n as usize)
            .map_err(io::Error::from)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.port.read(buf) {
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            other => other,
        }
    }
}

/// Opens real serial ports, exclusively where the platform supports it
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeOpener;

impl PortOpener for NativeOpener {
    type Link = SerialPortLink;

    fn open(&self, endpoint: &Endpoint, settings: &LinkSettings) -> serialport::Result<SerialPortLink> {
        let path = endpoint.path_str();
        debug!(
            "Opening {} at {} baud (timeout {:?})",
            path, settings.baud_rate, settings.timeout
        );

        let builder = serialport::new(path.as_ref(), settings.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None)
            .timeout(settings.timeout);

        #[cfg(unix)]
        let port: Box<dyn SerialPort> = {
            let mut port = builder.open_native()?;
            port.set_exclusive(true)?;
            Box::new(port)
        };

        #[cfg(not(unix))]
        let port = builder.open()?;

        info!("Serial port {} opened", path);
        Ok(SerialPortLink::new(port))
    }
}
