//! OBP message header
//!
//! The header is a fixed 44 bytes; everything after it is sized by
//! `BytesRemaining`.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::scalar::Scalar;
use super::{
    BYTES_REMAINING_OFFSET, CHECKSUM_TYPE_OFFSET, ChecksumType, ERROR_NUMBER_OFFSET,
    FLAGS_OFFSET, Flags, HEADER_SIZE, IMMEDIATE_DATA_OFFSET, IMMEDIATE_DATA_SIZE,
    IMMEDIATE_LENGTH_OFFSET, MESSAGE_TYPE_OFFSET, PROTOCOL_VERSION, PROTOCOL_VERSION_OFFSET,
    REGARDING_OFFSET, START_BYTES,
};

/// Snapshot of an OBP message header (44 bytes)
///
/// # Wire Format
///
/// ```text
///  0      2         4       6        8              12             16
/// +------+---------+-------+--------+--------------+--------------+
/// | C1C0 | version | flags | errno  | message type |  regarding   |
/// +------+---------+-------+--------+--------------+--------------+
///  16         22   23   24                          40            44
/// +----------+----+----+--------------------------+--------------+
/// | reserved | ck | il |   immediate data (16)    |  bytes rem.  |
/// +----------+----+----+--------------------------+--------------+
/// ```
///
/// The reserved bytes are always written as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MessageHeader {
    /// Protocol version
    pub protocol_version: u16,
    /// Flags bitmask
    pub flags: Flags,
    /// Device error number
    pub error_number: u16,
    /// Message type id
    pub message_type: u32,
    /// Correlation id
    pub regarding: u32,
    /// Checksum selector
    pub checksum_type: ChecksumType,
    /// Meaningful bytes in `immediate_data`
    pub immediate_data_length: u8,
    /// Inline argument window
    pub immediate_data: [u8; IMMEDIATE_DATA_SIZE],
    /// Length of payload + checksum + footer
    pub bytes_remaining: u32,
}

impl MessageHeader {
    /// Create a header for `message_type` with an empty payload
    #[must_use]
    pub fn new(message_type: u32) -> Self {
        Self {
            message_type,
            ..Self::default()
        }
    }

    /// Parse from bytes (little-endian)
    ///
    /// Rejects slices shorter than a header and headers without the start
    /// markers. No other field is validated.
    pub fn from_bytes(bytes: &[u8]) -> super::Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(super::Error::BufferTooSmall {
                needed: HEADER_SIZE,
                got: bytes.len(),
            });
        }

        let found = [bytes[0], bytes[1]];
        if found != START_BYTES {
            return Err(super::Error::InvalidStartBytes { found });
        }

        Ok(Self::parse(bytes))
    }

    /// Decode the header fields without validation. `bytes` must hold at
    /// least `HEADER_SIZE` bytes.
    pub(crate) fn parse(bytes: &[u8]) -> Self {
        let mut immediate_data = [0u8; IMMEDIATE_DATA_SIZE];
        immediate_data.copy_from_slice(
            &bytes[IMMEDIATE_DATA_OFFSET..IMMEDIATE_DATA_OFFSET + IMMEDIATE_DATA_SIZE],
        );

        Self {
            protocol_version: u16::decode_le(&bytes[PROTOCOL_VERSION_OFFSET..]),
            flags: Flags::from_u16(u16::decode_le(&bytes[FLAGS_OFFSET..])),
            error_number: u16::decode_le(&bytes[ERROR_NUMBER_OFFSET..]),
            message_type: u32::decode_le(&bytes[MESSAGE_TYPE_OFFSET..]),
            regarding: u32::decode_le(&bytes[REGARDING_OFFSET..]),
            checksum_type: ChecksumType::from_u8(bytes[CHECKSUM_TYPE_OFFSET]),
            immediate_data_length: bytes[IMMEDIATE_LENGTH_OFFSET],
            immediate_data,
            bytes_remaining: u32::decode_le(&bytes[BYTES_REMAINING_OFFSET..]),
        }
    }

    /// Convert to bytes (little-endian)
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];

        bytes[0..2].copy_from_slice(&START_BYTES);
        self.protocol_version
            .encode_le(&mut bytes[PROTOCOL_VERSION_OFFSET..]);
        self.flags.as_u16().encode_le(&mut bytes[FLAGS_OFFSET..]);
        self.error_number.encode_le(&mut bytes[ERROR_NUMBER_OFFSET..]);
        self.message_type.encode_le(&mut bytes[MESSAGE_TYPE_OFFSET..]);
        self.regarding.encode_le(&mut bytes[REGARDING_OFFSET..]);
        bytes[CHECKSUM_TYPE_OFFSET] = self.checksum_type.as_u8();
        bytes[IMMEDIATE_LENGTH_OFFSET] = self.immediate_data_length;
        bytes[IMMEDIATE_DATA_OFFSET..IMMEDIATE_DATA_OFFSET + IMMEDIATE_DATA_SIZE]
            .copy_from_slice(&self.immediate_data);
        self.bytes_remaining
            .encode_le(&mut bytes[BYTES_REMAINING_OFFSET..]);

        bytes
    }

    /// Check if the device flagged the message as an error
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.flags.is_error()
    }
}

impl Default for MessageHeader {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            flags: Flags::new(),
            error_number: 0,
            message_type: 0,
            regarding: 0,
            checksum_type: ChecksumType::None,
            immediate_data_length: 0,
            immediate_data: [0u8; IMMEDIATE_DATA_SIZE],
            bytes_remaining: super::MIN_BYTES_REMAINING,
        }
    }
}

impl fmt::Display for MessageHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type={:#010x} regarding={} version={:#06x} flags={} errno={} checksum={} immediate={} remaining={}",
            self.message_type,
            self.regarding,
            self.protocol_version,
            self.flags,
            self.error_number,
            self.checksum_type,
            self.immediate_data_length,
            self.bytes_remaining,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let header = MessageHeader {
            flags: Flags::new().with(Flags::ACK_REQUESTED),
            error_number: 7,
            regarding: 0xAABB_CCDD,
            checksum_type: ChecksumType::Md5,
            ..MessageHeader::new(0x0010_0100)
        };
        let bytes = header.to_bytes();

        assert_eq!(&bytes[0..2], &START_BYTES);
        assert_eq!(&bytes[2..4], &[0x00, 0x11]);
        assert_eq!(&bytes[4..6], &[0x04, 0x00]);
        assert_eq!(&bytes[6..8], &[0x07, 0x00]);
        assert_eq!(&bytes[8..12], &[0x00, 0x01, 0x10, 0x00]);
        assert_eq!(&bytes[12..16], &[0xDD, 0xCC, 0xBB, 0xAA]);
        assert_eq!(&bytes[16..22], &[0u8; 6]);
        assert_eq!(bytes[22], 1);
        assert_eq!(&bytes[40..44], &[20, 0, 0, 0]);
    }

    #[test]
    fn test_header_roundtrip() {
        let mut header = MessageHeader::new(0x0011_0010);
        header.immediate_data[..4].copy_from_slice(&1000u32.to_le_bytes());
        header.immediate_data_length = 4;

        let decoded = MessageHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_invalid_start_bytes() {
        let mut bytes = MessageHeader::default().to_bytes();
        bytes[0] = 0xFF;

        let result = MessageHeader::from_bytes(&bytes);
        assert!(matches!(
            result,
            Err(super::super::Error::InvalidStartBytes {
                found: [0xFF, 0xC0]
            })
        ));
    }

    #[test]
    fn test_short_header() {
        let result = MessageHeader::from_bytes(&[0xC1, 0xC0, 0x00]);
        assert!(matches!(
            result,
            Err(super::super::Error::BufferTooSmall { needed: 44, got: 3 })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        use crate::protocol::BufferConfig;

        let header = MessageHeader {
            flags: Flags::new().with(Flags::RESPONSE),
            regarding: 9,
            checksum_type: ChecksumType::Reserved(3),
            immediate_data_length: 2,
            immediate_data: [0x34, 0x12, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            ..MessageHeader::new(0x0011_0010)
        };
        let json = serde_json::to_string(&header).unwrap();
        assert_eq!(serde_json::from_str::<MessageHeader>(&json).unwrap(), header);

        let config = BufferConfig::default()
            .with_capacity(512)
            .with_checksum_type(ChecksumType::Md5);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<BufferConfig>(&json).unwrap(), config);

        // omitted fields fall back to defaults
        let partial: BufferConfig = serde_json::from_str(r#"{"capacity":256}"#).unwrap();
        assert_eq!(partial, BufferConfig::default().with_capacity(256));
    }
}
