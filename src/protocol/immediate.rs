//! Accessors for the 16-byte immediate-data window (offsets 24..40).
//!
//! Writes that overflow the window are truncated, never rejected, and the
//! immediate-data length always becomes `offset + bytes_written`. Reads are
//! bounds-checked against the window.

use tracing::debug;

use super::scalar::{self, MAX_SCALAR_SIZE, Scalar};
use super::{Error, IMMEDIATE_DATA_OFFSET, IMMEDIATE_DATA_SIZE, MessageBuffer, Region, Result};

impl MessageBuffer {
    /// Encode `value` at `offset` within the immediate-data window.
    ///
    /// Returns the number of bytes actually written.
    pub fn set_immediate<T: Scalar>(&mut self, offset: usize, value: T) -> usize {
        let mut scratch = [0u8; MAX_SCALAR_SIZE];
        value.encode_le(&mut scratch);
        self.set_immediate_bytes(offset, &scratch[..T::SIZE])
    }

    /// Copy `src` into the immediate-data window starting at `offset`.
    ///
    /// Bytes past the end of the window are dropped. Returns the number of
    /// bytes actually written.
    pub fn set_immediate_bytes(&mut self, offset: usize, src: &[u8]) -> usize {
        let start = offset.min(IMMEDIATE_DATA_SIZE);
        let written = src.len().min(IMMEDIATE_DATA_SIZE - start);
        if written < src.len() {
            debug!(
                offset,
                requested = src.len(),
                written,
                "immediate data truncated to window"
            );
        }

        self.bytes_mut(IMMEDIATE_DATA_OFFSET + start, written)
            .copy_from_slice(&src[..written]);
        self.set_immediate_data_length(start + written);
        written
    }

    /// Replace the immediate data with a text argument (ASCII, truncated)
    pub fn set_immediate_text(&mut self, text: &str) -> usize {
        self.set_immediate_bytes(0, text.as_bytes())
    }

    /// Decode a `T` at `offset` within the immediate-data window
    pub fn immediate<T: Scalar>(&self, offset: usize) -> Result<T> {
        self.immediate_bytes(offset, T::SIZE).map(T::decode_le)
    }

    /// Borrow `len` bytes at `offset` within the immediate-data window
    pub fn immediate_bytes(&self, offset: usize, len: usize) -> Result<&[u8]> {
        match offset.checked_add(len) {
            Some(end) if end <= IMMEDIATE_DATA_SIZE => {
                Ok(self.bytes(IMMEDIATE_DATA_OFFSET + offset, len))
            }
            _ => Err(Error::OutOfRange {
                region: Region::ImmediateData,
                offset,
                len,
                limit: IMMEDIATE_DATA_SIZE,
            }),
        }
    }

    /// The meaningful immediate-data bytes
    #[must_use]
    pub fn immediate_data(&self) -> &[u8] {
        self.bytes(IMMEDIATE_DATA_OFFSET, self.immediate_data_length())
    }

    /// Decode the meaningful immediate data as an array of `T`.
    ///
    /// The element count is `immediate_data_length / T::SIZE`.
    #[must_use]
    pub fn immediate_array<T: Scalar>(&self) -> Vec<T> {
        scalar::decode_all::<T>(self.immediate_data())
    }

    /// Decode the meaningful immediate data as text, stopping at the first NUL
    #[must_use]
    pub fn immediate_text(&self) -> String {
        super::payload::text_until_nul(self.immediate_data())
    }
}
