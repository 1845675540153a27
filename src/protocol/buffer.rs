//! Owned OBP frame buffer and its frame layout.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::scalar::Scalar;
use super::{
    BYTES_REMAINING_OFFSET, CHECKSUM_SIZE, CHECKSUM_TYPE_OFFSET, ChecksumType,
    DEFAULT_CAPACITY, ERROR_NUMBER_OFFSET, Error, FLAGS_OFFSET, FOOTER_SIZE, Flags, HEADER_SIZE,
    IMMEDIATE_DATA_SIZE, IMMEDIATE_LENGTH_OFFSET, IoStatus, MESSAGE_TYPE_OFFSET,
    MIN_BYTES_REMAINING, MIN_MESSAGE_SIZE, MessageHeader, PAYLOAD_OFFSET, PROTOCOL_VERSION,
    PROTOCOL_VERSION_OFFSET, REGARDING_OFFSET, RESERVED_OFFSET, RESERVED_SIZE, Result,
    START_BYTES, device_error,
};

/// Buffer configuration options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BufferConfig {
    /// Size of the owned byte array. Raised to `MIN_MESSAGE_SIZE` if smaller.
    pub capacity: usize,
    /// Protocol version stamped by `init()`.
    pub protocol_version: u16,
    /// Checksum selector stamped by `init()`.
    pub checksum_type: ChecksumType,
}

impl BufferConfig {
    /// Override the capacity
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Override the protocol version
    #[must_use]
    pub const fn with_protocol_version(mut self, version: u16) -> Self {
        self.protocol_version = version;
        self
    }

    /// Override the checksum selector
    #[must_use]
    pub const fn with_checksum_type(mut self, checksum_type: ChecksumType) -> Self {
        self.checksum_type = checksum_type;
        self
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            protocol_version: PROTOCOL_VERSION,
            checksum_type: ChecksumType::None,
        }
    }
}

/// One OBP frame in memory, used for both requests and responses.
///
/// The buffer owns a fixed-capacity byte array. Header fields live at fixed
/// offsets; the payload, checksum and footer positions all derive from the
/// `BytesRemaining` field:
///
/// ```text
/// payload_length  = BR - 20
/// checksum_offset = 44 + payload_length = 24 + BR
/// footer_offset   = checksum_offset + 16 = 40 + BR
/// message_size    = 44 + BR
/// ```
///
/// A `BytesRemaining` below 20 is treated as 20. Methods that position the
/// checksum or footer also write the corrected value back into the header.
#[derive(Clone)]
pub struct MessageBuffer {
    data: Vec<u8>,
    io_status: IoStatus,
    config: BufferConfig,
}

impl MessageBuffer {
    /// Create a zero-filled buffer with the given capacity.
    ///
    /// The buffer is uninitialized until [`init`](Self::init) is called.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_config(BufferConfig::default().with_capacity(capacity))
    }

    /// Create a zero-filled buffer from a configuration.
    #[must_use]
    pub fn with_config(config: BufferConfig) -> Self {
        let capacity = config.capacity.max(MIN_MESSAGE_SIZE);
        Self {
            data: vec![0u8; capacity],
            io_status: IoStatus::Pending,
            config: BufferConfig { capacity, ..config },
        }
    }

    /// Create a default-capacity buffer holding a copy of received bytes.
    ///
    /// The capacity grows to fit `raw` if it is longer than the default.
    #[must_use]
    pub fn from_bytes(raw: &[u8]) -> Self {
        let mut buffer = Self::new(raw.len().max(DEFAULT_CAPACITY));
        buffer.data[..raw.len()].copy_from_slice(raw);
        buffer
    }

    /// Lay down header defaults and an empty payload.
    ///
    /// Zero-fills the whole array, stamps the start markers, the configured
    /// protocol version and checksum selector, sets `BytesRemaining` to 20,
    /// writes the footer sentinel and resets the I/O status to pending.
    pub fn init(&mut self) {
        self.data.fill(0);
        self.data[..2].copy_from_slice(&START_BYTES);
        self.set_protocol_version(self.config.protocol_version);
        self.set_checksum_type(self.config.checksum_type);
        self.set_bytes_remaining(MIN_BYTES_REMAINING);
        self.write_footer(super::FOOTER);
        self.io_status = IoStatus::Pending;
    }

    /// Zero-fill the buffer and reset the I/O status.
    pub fn clear(&mut self) {
        self.data.fill(0);
        self.io_status = IoStatus::Pending;
    }

    /// Replace the contents with received bytes, zero-filling the rest.
    pub fn load(&mut self, raw: &[u8]) -> Result<()> {
        if raw.len() > self.capacity() {
            return Err(Error::BufferTooSmall {
                needed: raw.len(),
                got: self.capacity(),
            });
        }
        self.data[..raw.len()].copy_from_slice(raw);
        self.data[raw.len()..].fill(0);
        Ok(())
    }

    /// Capacity of the owned byte array
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Configuration the buffer was created with
    #[must_use]
    pub const fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// The whole owned byte array
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The whole owned byte array, for transports to fill
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Status of the last transport operation
    #[must_use]
    pub const fn io_status(&self) -> IoStatus {
        self.io_status
    }

    /// Record the status of a transport operation
    pub fn set_io_status(&mut self, status: IoStatus) {
        self.io_status = status;
    }

    // --- Header fields ---

    /// Bytes at offsets 0 and 1
    #[must_use]
    pub fn start_bytes(&self) -> [u8; 2] {
        [self.data[0], self.data[1]]
    }

    /// Check the start markers
    #[must_use]
    pub fn has_start_bytes(&self) -> bool {
        self.start_bytes() == START_BYTES
    }

    /// Protocol version
    #[must_use]
    pub fn protocol_version(&self) -> u16 {
        self.read(PROTOCOL_VERSION_OFFSET)
    }

    /// Set protocol version
    pub fn set_protocol_version(&mut self, version: u16) {
        self.write(PROTOCOL_VERSION_OFFSET, version);
    }

    /// Flags bitmask
    #[must_use]
    pub fn flags(&self) -> Flags {
        Flags::from_u16(self.read(FLAGS_OFFSET))
    }

    /// Set flags bitmask
    pub fn set_flags(&mut self, flags: Flags) {
        self.write(FLAGS_OFFSET, flags.as_u16());
    }

    /// Check if the device answered with a NACK or an exception
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.flags().is_error()
    }

    /// Device error number
    #[must_use]
    pub fn error_number(&self) -> u16 {
        self.read(ERROR_NUMBER_OFFSET)
    }

    /// Set device error number
    pub fn set_error_number(&mut self, code: u16) {
        self.write(ERROR_NUMBER_OFFSET, code);
    }

    /// Describe the stored device error number
    #[must_use]
    pub fn error_description(&self) -> &'static str {
        device_error::error_description(self.error_number())
    }

    /// Message type id
    #[must_use]
    pub fn message_type(&self) -> u32 {
        self.read(MESSAGE_TYPE_OFFSET)
    }

    /// Set message type id
    pub fn set_message_type(&mut self, message_type: u32) {
        self.write(MESSAGE_TYPE_OFFSET, message_type);
    }

    /// Correlation id
    #[must_use]
    pub fn regarding(&self) -> u32 {
        self.read(REGARDING_OFFSET)
    }

    /// Set correlation id
    pub fn set_regarding(&mut self, regarding: u32) {
        self.write(REGARDING_OFFSET, regarding);
    }

    /// Reserved header bytes
    #[must_use]
    pub fn reserved(&self) -> &[u8] {
        &self.data[RESERVED_OFFSET..RESERVED_OFFSET + RESERVED_SIZE]
    }

    /// Checksum selector
    #[must_use]
    pub fn checksum_type(&self) -> ChecksumType {
        ChecksumType::from_u8(self.data[CHECKSUM_TYPE_OFFSET])
    }

    /// Set checksum selector
    pub fn set_checksum_type(&mut self, checksum_type: ChecksumType) {
        self.data[CHECKSUM_TYPE_OFFSET] = checksum_type.as_u8();
    }

    /// Number of meaningful immediate-data bytes (at most 16)
    #[must_use]
    pub fn immediate_data_length(&self) -> usize {
        usize::from(self.data[IMMEDIATE_LENGTH_OFFSET]).min(IMMEDIATE_DATA_SIZE)
    }

    /// Set the immediate-data length, clamped to the 16-byte window
    pub fn set_immediate_data_length(&mut self, len: usize) {
        self.data[IMMEDIATE_LENGTH_OFFSET] = len.min(IMMEDIATE_DATA_SIZE) as u8;
    }

    /// Snapshot of the header fields
    #[must_use]
    pub fn header(&self) -> MessageHeader {
        MessageHeader::parse(&self.data)
    }

    // --- Frame layout ---

    /// Raw `BytesRemaining` field, unclamped
    #[must_use]
    pub fn bytes_remaining(&self) -> u32 {
        self.read(BYTES_REMAINING_OFFSET)
    }

    /// Write the `BytesRemaining` field as given.
    ///
    /// Values below 20 are stored unchanged and corrected by the accessors
    /// that derive offsets from them. The footer is not moved.
    pub fn set_bytes_remaining(&mut self, value: u32) {
        self.write(BYTES_REMAINING_OFFSET, value);
    }

    /// `BytesRemaining` with the minimum of 20 applied
    pub(crate) fn clamped_bytes_remaining(&self) -> usize {
        self.bytes_remaining().max(MIN_BYTES_REMAINING) as usize
    }

    /// Rewrite `BytesRemaining` to 20 if it is below the minimum
    pub(crate) fn correct_bytes_remaining(&mut self) -> usize {
        let raw = self.bytes_remaining();
        if raw < MIN_BYTES_REMAINING {
            debug!(
                bytes_remaining = raw,
                "bytes remaining below minimum; correcting to {MIN_BYTES_REMAINING}"
            );
            self.set_bytes_remaining(MIN_BYTES_REMAINING);
        }
        self.clamped_bytes_remaining()
    }

    /// Payload length, `max(0, BR - 20)`
    #[must_use]
    pub fn payload_length(&self) -> usize {
        self.clamped_bytes_remaining() - MIN_BYTES_REMAINING as usize
    }

    /// Resize the payload and move the footer to its new position.
    ///
    /// Growing zeroes the bytes between the old payload end and the new
    /// checksum, so the old trailer does not leak into the payload. Fails if
    /// the resulting frame would not fit the buffer.
    pub fn set_payload_length(&mut self, len: usize) -> Result<()> {
        self.check_payload_length(len)?;
        self.clear_vacated(len);
        self.stamp_payload_length(len);
        Ok(())
    }

    pub(crate) fn check_payload_length(&self, len: usize) -> Result<()> {
        let max = self.max_payload_length();
        if len > max {
            return Err(Error::PayloadTooLarge { size: len, max });
        }
        Ok(())
    }

    /// Zero `[payload end, new checksum end)` when the payload grows to `len`
    pub(crate) fn clear_vacated(&mut self, len: usize) {
        let current = self.payload_length();
        if len <= current {
            return;
        }
        let capacity = self.capacity();
        let start = PAYLOAD_OFFSET.saturating_add(current).min(capacity);
        let end = (PAYLOAD_OFFSET + len + CHECKSUM_SIZE).min(capacity);
        self.data[start..end].fill(0);
    }

    /// Set `BytesRemaining` for a checked payload length and restamp the footer
    pub(crate) fn stamp_payload_length(&mut self, len: usize) {
        self.set_bytes_remaining((len + MIN_BYTES_REMAINING as usize) as u32);
        self.write_footer(super::FOOTER);
    }

    /// Largest payload a frame in this buffer can carry (`capacity - 64`)
    #[must_use]
    pub fn max_payload_length(&self) -> usize {
        self.capacity() - MIN_MESSAGE_SIZE
    }

    /// Total frame size, `44 + BR`
    #[must_use]
    pub fn message_size(&self) -> usize {
        HEADER_SIZE.saturating_add(self.clamped_bytes_remaining())
    }

    /// Offset of the checksum region, `24 + BR`.
    ///
    /// Corrects a `BytesRemaining` below 20 in the header.
    pub fn checksum_offset(&mut self) -> usize {
        let bytes_remaining = self.correct_bytes_remaining();
        (PAYLOAD_OFFSET - MIN_BYTES_REMAINING as usize).saturating_add(bytes_remaining)
    }

    /// Offset of the footer, `40 + BR`.
    ///
    /// Corrects a `BytesRemaining` below 20 in the header.
    pub fn footer_offset(&mut self) -> usize {
        self.checksum_offset().saturating_add(CHECKSUM_SIZE)
    }

    /// Fail if the frame described by the header does not fit the buffer
    pub(crate) fn ensure_frame_fits(&self) -> Result<()> {
        let size = self.message_size();
        if size > self.capacity() {
            return Err(Error::FrameExceedsCapacity {
                size,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    /// The `message_size` bytes to hand to a transport
    pub fn frame(&self) -> Result<&[u8]> {
        self.ensure_frame_fits()?;
        Ok(&self.data[..self.message_size()])
    }

    // --- Raw access helpers ---

    /// Read a value at a fixed, in-bounds offset
    pub(crate) fn read<T: Scalar>(&self, offset: usize) -> T {
        T::decode_le(&self.data[offset..offset + T::SIZE])
    }

    /// Write a value at a fixed, in-bounds offset
    pub(crate) fn write<T: Scalar>(&mut self, offset: usize, value: T) {
        value.encode_le(&mut self.data[offset..offset + T::SIZE]);
    }

    /// Write the footer value at the derived offset if it fits
    pub(crate) fn write_footer(&mut self, value: u32) -> bool {
        let offset = self.footer_offset();
        if offset.saturating_add(FOOTER_SIZE) > self.capacity() {
            return false;
        }
        self.write(offset, value);
        true
    }

    pub(crate) fn bytes(&self, start: usize, len: usize) -> &[u8] {
        &self.data[start..start + len]
    }

    pub(crate) fn bytes_mut(&mut self, start: usize, len: usize) -> &mut [u8] {
        &mut self.data[start..start + len]
    }
}

impl Default for MessageBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl fmt::Debug for MessageBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBuffer")
            .field("capacity", &self.capacity())
            .field("io_status", &self.io_status)
            .field("header", &self.header())
            .finish_non_exhaustive()
    }
}
