//! # Error Types
//!
//! Custom error types for Glove Link using `thiserror`.

use thiserror::Error;

/// Main error type for Glove Link
#[derive(Debug, Error)]
pub enum GloveLinkError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Transport errors (serial open/read/write)
    #[error("Transport error: {0}")]
    Transport(String),

    /// No usable serial device found at any candidate path
    #[error("Serial port not found, tried: {0}")]
    SerialPortNotFound(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Glove Link
pub type Result<T> = std::result::Result<T, GloveLinkError>;
