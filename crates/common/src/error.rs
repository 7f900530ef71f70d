//! Common error types

use thiserror::Error;

/// Process exit code for a device that could not be found
pub const EXIT_DEVICE_NOT_FOUND: u8 = 1;

/// Process exit code for transport faults and endpoint setup failures
pub const EXIT_TRANSPORT: u8 = 2;

/// Process exit code for configuration and other setup failures
pub const EXIT_SETUP: u8 = 3;

#[derive(Debug, Error)]
pub enum Error {
    /// No device with the requested VID:PID is attached
    #[error("Device {vendor_id:04x}:{product_id:04x} not found")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    /// The USB stack reported a fault (timeout, stall, disconnect, ...)
    #[error("USB transport error: {0}")]
    Transport(#[from] rusb::Error),

    /// The outbound transfer accepted fewer or more bytes than the payload
    #[error("Sent {written} bytes, expected {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("Endpoint {address:#04x} not found on interface {interface}")]
    EndpointNotFound { address: u8, interface: u8 },

    #[error("Endpoint {address:#04x} reports a max packet size of 0")]
    ZeroPacketSize { address: u8 },

    /// Only bulk and interrupt endpoints can carry echo traffic
    #[error("Endpoint {address:#04x} has unsupported transfer type {transfer_type}")]
    UnsupportedEndpoint { address: u8, transfer_type: String },

    /// Endpoint points the wrong way for its role (e.g. IN configured as OUT)
    #[error("Endpoint {address:#04x} is not an {expected} endpoint")]
    EndpointDirection { address: u8, expected: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Exit status the CLI reports for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::DeviceNotFound { .. } => EXIT_DEVICE_NOT_FOUND,
            Error::Transport(_)
            | Error::ShortWrite { .. }
            | Error::EndpointNotFound { .. }
            | Error::ZeroPacketSize { .. }
            | Error::UnsupportedEndpoint { .. }
            | Error::EndpointDirection { .. } => EXIT_TRANSPORT,
            Error::Config(_) | Error::Io(_) => EXIT_SETUP,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
