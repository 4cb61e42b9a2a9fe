use std::io::{self, Write};
use std::time::Duration;

use serialport::SerialPort;
use tracing::{debug, info};

pub const DEFAULT_BAUD_RATE: u32 = 115_200;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Serial port that is opened on first use instead of at construction.
pub struct LazySerialPort {
    path: String,
    baud_rate: u32,
    timeout: Duration,
    port: Option<Box<dyn SerialPort>>,
}

impl LazySerialPort {
    pub fn new(path: impl Into<String>, baud_rate: u32, timeout: Duration) -> Self {
        LazySerialPort {
            path: path.into(),
            baud_rate,
            timeout,
            port: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn open(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        if self.port.is_none() {
            debug!("Opening serial port {} at {} baud", self.path, self.baud_rate);
            let port = serialport::new(&self.path, self.baud_rate)
                .timeout(self.timeout)
                .open()?;
            info!("Opened serial port {}", self.path);
            self.port = Some(port);
        }

        self.port
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "Serial port is not open"))
    }

    /// Drops the current handle (if any) and opens the port again.
    pub fn reopen(&mut self) -> io::Result<()> {
        if self.port.take().is_some() {
            debug!("Closed serial port {}", self.path);
        }
        self.open().map(|_| ())
    }
}

impl Write for LazySerialPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.open()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.open()?.flush()
    }
}
