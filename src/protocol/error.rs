//! OBP error types

use std::fmt;

use thiserror::Error;

/// Addressable data region of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// The 16-byte inline window at offsets 24..40
    ImmediateData,
    /// The variable-length window starting at offset 44
    Payload,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImmediateData => write!(f, "immediate data"),
            Self::Payload => write!(f, "payload"),
        }
    }
}

/// OBP codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Access outside an addressable region
    #[error("{region} access out of range: {len} bytes at offset {offset} (limit {limit})")]
    OutOfRange {
        /// Region that was addressed
        region: Region,
        /// Offset within the region
        offset: usize,
        /// Number of bytes requested
        len: usize,
        /// Number of addressable bytes in the region
        limit: usize,
    },

    /// Payload too large for the buffer capacity
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Requested payload size
        size: usize,
        /// Maximum payload the buffer can frame
        max: usize,
    },

    /// `BytesRemaining` describes a frame that does not fit the buffer
    #[error("frame of {size} bytes exceeds buffer capacity of {capacity}")]
    FrameExceedsCapacity {
        /// Total frame size implied by the header
        size: usize,
        /// Buffer capacity
        capacity: usize,
    },

    /// Buffer too small
    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Needed size
        needed: usize,
        /// Actual size
        got: usize,
    },

    /// Frame does not begin with the start markers
    #[error("invalid start bytes: expected [c1, c0], got {found:02x?}")]
    InvalidStartBytes {
        /// Bytes found at offsets 0 and 1
        found: [u8; 2],
    },

    /// Footer sentinel missing at the derived footer offset
    #[error("invalid footer: expected 0xc2c3c4c5, got {found:#010x}")]
    InvalidFooter {
        /// Value found at the footer offset
        found: u32,
    },

    /// Stored checksum does not match the frame contents
    #[error("checksum mismatch: expected {expected:02x?}, got {found:02x?}")]
    ChecksumMismatch {
        /// Digest computed over the frame
        expected: [u8; 16],
        /// Digest stored in the checksum region
        found: [u8; 16],
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
