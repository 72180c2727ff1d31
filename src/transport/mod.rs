//! # Transport Module
//!
//! Frame transport between the glove and the host driver.
//!
//! The core is transport-agnostic: serial, Bluetooth and Wi-Fi backends all
//! speak the same newline-terminated frames and are interchangeable behind
//! the [`Transport`] trait. This module ships the USB-serial reference
//! backend on `tokio-serial`; the trait mirrors the firmware communication
//! contract (open / peek / bounded read / best-effort write).
//!
//! A read timeout is not an error: the tick simply proceeds without inbound
//! processing, so `recv_frame` reports it as `Ok(None)`.

use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::time::timeout;
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, info, warn};

use crate::error::{GloveLinkError, Result};

/// Default glove baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default device paths to try (in order of preference)
const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyUSB0", // USB-to-serial adapters (most common glove wiring)
    "/dev/ttyACM0", // USB CDC devices
];

/// Bidirectional frame transport.
#[async_trait]
pub trait Transport: Send {
    /// Whether the link is currently usable.
    fn is_open(&self) -> bool;

    /// Non-blocking peek: is a frame already waiting?
    fn has_data(&self) -> bool;

    /// Reads one frame, blocking up to the transport's timeout.
    ///
    /// `Ok(None)` means the timeout elapsed with nothing to read.
    async fn recv_frame(&mut self) -> io::Result<Option<String>>;

    /// Best-effort write of one frame.
    async fn send_frame(&mut self, frame: &str) -> io::Result<()>;
}

/// USB-serial transport to the host driver.
pub struct SerialTransport {
    /// Buffered port; reads go through the buffer, writes to the inner port.
    reader: BufReader<SerialStream>,
    /// Device path (e.g., /dev/ttyUSB0)
    device_path: String,
    /// Bound on one inbound read.
    read_timeout: Duration,
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("device_path", &self.device_path)
            .field("read_timeout", &self.read_timeout)
            .finish_non_exhaustive()
    }
}

impl SerialTransport {
    /// Opens the first usable default device path.
    ///
    /// # Errors
    ///
    /// Returns [`GloveLinkError::SerialPortNotFound`] if no device opens.
    pub fn open(baud_rate: u32, read_timeout: Duration) -> Result<Self> {
        Self::open_with_paths(DEFAULT_DEVICE_PATHS, baud_rate, read_timeout)
    }

    /// Opens the first usable path from `paths`.
    ///
    /// # Arguments
    ///
    /// * `paths` - Device paths to try (e.g., `&["/dev/ttyUSB0"]`)
    /// * `baud_rate` - Line rate shared with the host
    /// * `read_timeout` - Bound on one inbound read
    pub fn open_with_paths(paths: &[&str], baud_rate: u32, read_timeout: Duration) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(port) => {
                    info!("Successfully opened glove link at {}", path);
                    return Ok(Self {
                        reader: BufReader::new(port),
                        device_path: path.to_string(),
                        read_timeout,
                    });
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(GloveLinkError::SerialPortNotFound(paths.join(", ")))
    }

    /// Opens a specific serial port with 8N1 framing.
    fn open_port(path: &str, baud_rate: u32) -> Result<SerialStream> {
        tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| GloveLinkError::Transport(format!("Failed to open {}: {}", path, e)))
    }

    /// Device path this transport is bound to.
    #[must_use]
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

#[async_trait]
impl Transport for SerialTransport {
    fn is_open(&self) -> bool {
        true
    }

    fn has_data(&self) -> bool {
        !self.reader.buffer().is_empty()
    }

    async fn recv_frame(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        match timeout(self.read_timeout, self.reader.read_line(&mut line)).await {
            // Timeout: the tick proceeds without inbound processing.
            Err(_) => Ok(None),
            Ok(Ok(0)) => Ok(None),
            Ok(Ok(_)) => Ok(Some(line)),
            Ok(Err(e)) => Err(e),
        }
    }

    async fn send_frame(&mut self, frame: &str) -> io::Result<()> {
        let port = self.reader.get_mut();
        port.write_all(frame.as_bytes()).await?;
        port.flush().await
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;

    /// Mock transport with scripted inbound frames and captured outbound
    /// frames.
    #[derive(Debug, Default)]
    pub struct MockTransport {
        /// Frames the glove has sent.
        pub sent: Vec<String>,
        /// Frames waiting to be received.
        pub inbound: VecDeque<String>,
        /// Simulated link state.
        pub open: bool,
        /// Error to surface on the next read, if any.
        pub read_error: Option<io::ErrorKind>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                open: true,
                ..Self::default()
            }
        }

        /// Queues one inbound frame.
        pub fn push_inbound(&mut self, frame: &str) {
            self.inbound.push_back(frame.to_string());
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        fn is_open(&self) -> bool {
            self.open
        }

        fn has_data(&self) -> bool {
            !self.inbound.is_empty()
        }

        async fn recv_frame(&mut self) -> io::Result<Option<String>> {
            if let Some(kind) = self.read_error.take() {
                return Err(io::Error::new(kind, "mock read error"));
            }
            Ok(self.inbound.pop_front())
        }

        async fn send_frame(&mut self, frame: &str) -> io::Result<()> {
            self.sent.push(frame.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::MockTransport;
    use super::*;

    // ==================== Mock Contract Tests ====================

    #[tokio::test]
    async fn test_mock_round_trip() {
        let mut t = MockTransport::new();
        assert!(t.is_open());
        assert!(!t.has_data());

        t.push_inbound("A500\n");
        assert!(t.has_data());
        assert_eq!(t.recv_frame().await.unwrap().as_deref(), Some("A500\n"));

        // Drained: behaves like a timeout.
        assert_eq!(t.recv_frame().await.unwrap(), None);

        t.send_frame("B100\n").await.unwrap();
        assert_eq!(t.sent, vec!["B100\n".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_surfaces_read_errors_once() {
        let mut t = MockTransport::new();
        t.read_error = Some(io::ErrorKind::BrokenPipe);
        assert!(t.recv_frame().await.is_err());
        assert!(t.recv_frame().await.unwrap().is_none());
    }
}
