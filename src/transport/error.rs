//! Transport-level error types covering link, framing and device failures.

use core::fmt;

use crate::protocol::{self, IoStatus};

/// Unified error type for OBP exchanges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The link reported a failed transfer.
    Io(IoStatus),
    /// The frame could not be built or did not validate.
    Frame(protocol::Error),
    /// The device flagged its response with NACK or exception.
    Device {
        /// Device error number from the response header.
        error_number: u16,
        /// Description of the error number.
        description: &'static str,
    },
    /// The response answers a different request.
    UnexpectedResponse {
        /// Message type of the request.
        expected: u32,
        /// Message type of the response.
        found: u32,
    },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(status) => write!(f, "transport failed: {status}"),
            Self::Frame(err) => write!(f, "frame error: {err}"),
            Self::Device {
                error_number,
                description,
            } => write!(f, "device error {error_number}: {description}"),
            Self::UnexpectedResponse { expected, found } => write!(
                f,
                "unexpected response: expected message type {expected:#010x}, got {found:#010x}"
            ),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Frame(err) => Some(err),
            _ => None,
        }
    }
}

impl From<protocol::Error> for TransportError {
    fn from(err: protocol::Error) -> Self {
        Self::Frame(err)
    }
}

impl From<IoStatus> for TransportError {
    fn from(status: IoStatus) -> Self {
        Self::Io(status)
    }
}
