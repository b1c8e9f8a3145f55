//! Error types shared by both nodes.

use std::io;

use thiserror::Error;

/// Failure to claim, drive or sample a GPIO line.
#[derive(Debug, Error)]
pub enum HardwareError {
    /// The line is already held by another handle.
    #[error("line {0} is already claimed")]
    AlreadyClaimed(u32),

    /// The line does not exist on this board or backend.
    #[error("line {0} is not available")]
    Unavailable(u32),

    /// The backend refused access to the line.
    #[error("permission denied for line {0}")]
    PermissionDenied(u32),

    /// Any other driver level failure.
    #[error("line {line}: {reason}")]
    Driver { line: u32, reason: String },
}

impl HardwareError {
    /// Maps an I/O error raised while touching `line` onto the hardware taxonomy.
    pub fn from_io(line: u32, err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => HardwareError::Unavailable(line),
            io::ErrorKind::PermissionDenied => HardwareError::PermissionDenied(line),
            io::ErrorKind::ResourceBusy => HardwareError::AlreadyClaimed(line),
            _ => HardwareError::Driver {
                line,
                reason: err.to_string(),
            },
        }
    }
}

/// Bytes that are not one of the four wire commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCommand {
    #[error("expected 2 or 3 bytes, got {0}")]
    Length(usize),

    #[error("third byte must be a line terminator, got 0x{0:02X}")]
    Terminator(u8),

    #[error("byte 0x{byte:02X} at offset {offset} is not '0' or '1'")]
    Digit { offset: usize, byte: u8 },
}

/// Accept, connect, send or receive failure on the command channel.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("failed to accept peer: {0}")]
    Accept(#[source] io::Error),

    #[error("failed to connect to {addr}: {source}")]
    Connect { addr: String, source: io::Error },

    #[error("send failed: {0}")]
    Send(#[source] io::Error),

    #[error("receive failed: {0}")]
    Receive(#[source] io::Error),

    #[error("no active connection")]
    NotConnected,
}

/// Fatal errors that stop a node.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("hardware error: {0}")]
    Hardware(#[from] HardwareError),

    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// Board bring-up (peripherals, NVS, Wi-Fi) failed.
    #[cfg(target_os = "espidf")]
    #[error("platform start-up failed: {0}")]
    Platform(String),
}

pub type Result<T> = std::result::Result<T, RelayError>;
