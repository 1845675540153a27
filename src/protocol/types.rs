//! OBP header flags, checksum selector and I/O status

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Checksum selector stored at header byte 22
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChecksumType {
    /// No checksum; the checksum region is zero-filled
    #[default]
    None,
    /// MD5 digest over the header and payload
    Md5,
    /// Reserved selector values (2, 3, ...), treated as "no checksum"
    Reserved(u8),
}

impl ChecksumType {
    /// Convert from byte
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::None,
            1 => Self::Md5,
            other => Self::Reserved(other),
        }
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Md5 => 1,
            Self::Reserved(value) => value,
        }
    }
}

impl From<u8> for ChecksumType {
    fn from(value: u8) -> Self {
        Self::from_u8(value)
    }
}

impl fmt::Display for ChecksumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Md5 => write!(f, "MD5"),
            Self::Reserved(value) => write!(f, "reserved({value})"),
        }
    }
}

/// Message flags (16-bit bitmask at header offset 4)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Flags(u16);

impl Flags {
    /// Message is a response to a host request
    pub const RESPONSE: u16 = 1 << 0;
    /// Device acknowledges the request
    pub const ACK: u16 = 1 << 1;
    /// Host asks the device for an acknowledgment
    pub const ACK_REQUESTED: u16 = 1 << 2;
    /// Device rejects the request
    pub const NACK: u16 = 1 << 3;
    /// Device hit an exception while handling the request
    pub const EXCEPTION: u16 = 1 << 4;
    /// Request used a deprecated protocol version
    pub const DEPRECATED_PROTOCOL: u16 = 1 << 5;
    /// Request used a deprecated message type
    pub const DEPRECATED_MESSAGE: u16 = 1 << 6;

    /// Create empty flags
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Create from the raw bitmask. Unknown bits are preserved.
    #[must_use]
    pub const fn from_u16(value: u16) -> Self {
        Self(value)
    }

    /// Convert to the raw bitmask
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Set a flag
    #[must_use]
    pub const fn with(mut self, flag: u16) -> Self {
        self.0 |= flag;
        self
    }

    /// Clear a flag
    #[must_use]
    pub const fn without(mut self, flag: u16) -> Self {
        self.0 &= !flag;
        self
    }

    /// Check if flag is set
    #[must_use]
    pub const fn has(self, flag: u16) -> bool {
        (self.0 & flag) != 0
    }

    /// Check if the device answered with a NACK or an exception
    #[must_use]
    pub const fn is_error(self) -> bool {
        self.has(Self::NACK | Self::EXCEPTION)
    }

    /// Check if this is a device response
    #[must_use]
    pub const fn is_response(self) -> bool {
        self.has(Self::RESPONSE)
    }

    /// Check if the host requested an acknowledgment
    #[must_use]
    pub const fn ack_requested(self) -> bool {
        self.has(Self::ACK_REQUESTED)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(u16, &str); 7] = [
            (Flags::RESPONSE, "RESPONSE"),
            (Flags::ACK, "ACK"),
            (Flags::ACK_REQUESTED, "ACK_REQUESTED"),
            (Flags::NACK, "NACK"),
            (Flags::EXCEPTION, "EXCEPTION"),
            (Flags::DEPRECATED_PROTOCOL, "DEPRECATED_PROTOCOL"),
            (Flags::DEPRECATED_MESSAGE, "DEPRECATED_MESSAGE"),
        ];

        let parts: Vec<&str> = NAMES
            .iter()
            .filter(|(bit, _)| self.has(*bit))
            .map(|(_, name)| *name)
            .collect();
        if parts.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", parts.join(" | "))
        }
    }
}

/// Outcome of the last transport operation on a buffer.
///
/// The codec stores this value but never sets it; transports do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IoStatus {
    /// No transport operation has completed yet
    #[default]
    Pending,
    /// Transfer completed
    Success,
    /// The port or device reported an error
    PortError,
    /// The transfer did not complete in time
    Timeout,
    /// No buffer was supplied to the transport
    NullBuffer,
    /// The frame does not fit the buffer
    OutOfRange,
    /// Fewer bytes arrived than the frame requires
    InsufficientData,
    /// A USB pipe or socket stream broke
    PipeError,
    /// Any other failure
    Other,
}

impl IoStatus {
    /// Check if the transfer completed
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for IoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::PortError => "port error",
            Self::Timeout => "timeout",
            Self::NullBuffer => "null buffer",
            Self::OutOfRange => "out of range",
            Self::InsufficientData => "insufficient data",
            Self::PipeError => "pipe error",
            Self::Other => "other",
        };
        write!(f, "{name}")
    }
}
