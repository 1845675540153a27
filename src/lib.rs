//! OBP (Ocean Binary Protocol) message buffer
//!
//! This library frames OBP request and response messages for spectrometers
//! reached over serial, TCP or USB links. It owns the byte-exact frame
//! layout, the typed accessors for the immediate-data and payload windows,
//! and the MD5 checksum and footer sentinel that guard each frame. It never
//! performs I/O itself; transports plug in through [`transport::Transport`].
//!
//! # Quick Start
//!
//! ```rust
//! use obp::{ChecksumType, MessageBuffer};
//!
//! // Build a request
//! let mut request = MessageBuffer::default();
//! request.init();
//! request.set_message_type(0x0011_0010);
//! request.set_checksum_type(ChecksumType::Md5);
//! request.set_immediate(0, 100_000u32);
//!
//! // Stamp footer and checksum, then hand the bytes to a transport
//! let frame = request.finalize()?.to_vec();
//! assert_eq!(frame.len(), 64);
//!
//! // Receive side
//! let mut response = obp::decode(&frame)?;
//! assert_eq!(response.immediate::<u32>(0)?, 100_000);
//! assert!(response.is_checksum_match());
//! # Ok::<(), obp::Error>(())
//! ```
//!
//! # Features
//!
//! - **Byte-exact layout** - 44-byte header, payload, checksum and footer
//!   positioned from the `BytesRemaining` field
//! - **Typed accessors** - one generic encode/decode per window over the
//!   [`Scalar`] kinds
//! - **MD5 checksums** - optional, selected per frame
//! - **Transport seam** - send/receive trait plus a loopback implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]

pub mod protocol;
pub mod transport;

pub use protocol::{
    BufferConfig, ChecksumType, DEFAULT_CAPACITY, Error, FOOTER, Flags, HEADER_SIZE, IoStatus,
    MessageBuffer, MessageHeader, PROTOCOL_VERSION, Region, Result, Scalar, decode, encode,
    error_description,
};
pub use transport::{LoopbackTransport, MessageBufferPool, Transport, TransportError};
