//! OBP protocol core implementation
//!
//! This module provides the frame layout, the owned [`MessageBuffer`], its
//! typed accessors, and the checksum/footer codec.
//!
//! # Wire Format
//!
//! ```text
//! [HEADER (44 bytes)] [PAYLOAD (BR - 20)] [CHECKSUM (16 bytes)] [FOOTER (4 bytes)]
//! ```
//!
//! All multi-byte integers are little-endian. `BR` is the `BytesRemaining`
//! field at offset 40 and counts everything after the header.

mod buffer;
mod codec;
mod device_error;
mod error;
mod header;
mod immediate;
mod payload;
mod scalar;
mod types;

pub use buffer::{BufferConfig, MessageBuffer};
pub use codec::{decode, encode};
pub use device_error::error_description;
pub use error::{Error, Region, Result};
pub use header::MessageHeader;
pub use scalar::Scalar;
pub use types::{ChecksumType, Flags, IoStatus};

/// Start markers at offsets 0 and 1.
pub const START_BYTES: [u8; 2] = [0xC1, 0xC0];

/// Protocol version stamped by `init()` unless configured otherwise.
pub const PROTOCOL_VERSION: u16 = 0x1100;

/// Footer sentinel, stored little-endian right after the checksum.
pub const FOOTER: u32 = 0xC2C3_C4C5;

/// Header size in bytes.
pub const HEADER_SIZE: usize = 44;

/// Checksum region size in bytes (room for an MD5 digest).
pub const CHECKSUM_SIZE: usize = 16;

/// Footer size in bytes.
pub const FOOTER_SIZE: usize = 4;

/// Smallest legal `BytesRemaining`: an empty payload plus checksum and footer.
pub const MIN_BYTES_REMAINING: u32 = (CHECKSUM_SIZE + FOOTER_SIZE) as u32;

/// Smallest complete frame (header + checksum + footer).
pub const MIN_MESSAGE_SIZE: usize = HEADER_SIZE + CHECKSUM_SIZE + FOOTER_SIZE;

/// Size of the inline immediate-data window.
pub const IMMEDIATE_DATA_SIZE: usize = 16;

/// Default buffer capacity, enough for the largest expected frame.
pub const DEFAULT_CAPACITY: usize = 5120;

// Fixed header offsets.
pub(crate) const PROTOCOL_VERSION_OFFSET: usize = 2;
pub(crate) const FLAGS_OFFSET: usize = 4;
pub(crate) const ERROR_NUMBER_OFFSET: usize = 6;
pub(crate) const MESSAGE_TYPE_OFFSET: usize = 8;
pub(crate) const REGARDING_OFFSET: usize = 12;
pub(crate) const RESERVED_OFFSET: usize = 16;
pub(crate) const RESERVED_SIZE: usize = 6;
pub(crate) const CHECKSUM_TYPE_OFFSET: usize = 22;
pub(crate) const IMMEDIATE_LENGTH_OFFSET: usize = 23;
pub(crate) const IMMEDIATE_DATA_OFFSET: usize = 24;
pub(crate) const BYTES_REMAINING_OFFSET: usize = 40;
pub(crate) const PAYLOAD_OFFSET: usize = HEADER_SIZE;
