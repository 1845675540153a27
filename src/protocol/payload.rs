//! Accessors for the variable-length payload window starting at offset 44.
//!
//! Every write that changes the payload length also moves the footer. A write
//! that grows the payload first zeroes the gap left behind, so bytes the
//! caller never wrote read back as zero.

use super::scalar::{self, MAX_SCALAR_SIZE, Scalar};
use super::{Error, MessageBuffer, PAYLOAD_OFFSET, Region, Result};

impl MessageBuffer {
    /// Replace the payload with `src`.
    ///
    /// Sets `BytesRemaining` to `src.len() + 20` and stamps the footer at its
    /// new position. Fails if `src` exceeds `capacity - 64` bytes.
    pub fn set_payload(&mut self, src: &[u8]) -> Result<()> {
        let max = self.max_payload_length();
        if src.len() > max {
            return Err(Error::PayloadTooLarge {
                size: src.len(),
                max,
            });
        }

        self.clear_vacated(src.len());
        self.bytes_mut(PAYLOAD_OFFSET, src.len()).copy_from_slice(src);
        self.stamp_payload_length(src.len());
        Ok(())
    }

    /// Encode `value` at `offset` within the payload.
    ///
    /// The payload length becomes `offset + T::SIZE`.
    pub fn set_payload_at<T: Scalar>(&mut self, offset: usize, value: T) -> Result<()> {
        let mut scratch = [0u8; MAX_SCALAR_SIZE];
        value.encode_le(&mut scratch);
        self.write_payload(offset, &scratch[..T::SIZE])
    }

    /// Copy `src` into the payload starting at `offset`.
    ///
    /// The payload length becomes `offset + src.len()`. Fails if the write
    /// would run past `capacity - 64` bytes of payload.
    pub fn write_payload(&mut self, offset: usize, src: &[u8]) -> Result<()> {
        let limit = self.max_payload_length();
        let end = match offset.checked_add(src.len()) {
            Some(end) if end <= limit => end,
            _ => {
                return Err(Error::OutOfRange {
                    region: Region::Payload,
                    offset,
                    len: src.len(),
                    limit,
                });
            }
        };

        self.clear_vacated(end);
        self.bytes_mut(PAYLOAD_OFFSET + offset, src.len())
            .copy_from_slice(src);
        self.stamp_payload_length(end);
        Ok(())
    }

    /// The whole payload.
    ///
    /// Fails if the header describes a payload longer than the buffer can hold.
    pub fn payload(&self) -> Result<&[u8]> {
        self.payload_range(0, self.payload_length())
    }

    /// Borrow `len` payload bytes at `offset`
    pub fn payload_range(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let limit = self.payload_length().min(self.max_payload_length());
        match offset.checked_add(len) {
            Some(end) if end <= limit => Ok(self.bytes(PAYLOAD_OFFSET + offset, len)),
            _ => Err(Error::OutOfRange {
                region: Region::Payload,
                offset,
                len,
                limit,
            }),
        }
    }

    /// Decode a `T` at `offset` within the payload
    pub fn payload_at<T: Scalar>(&self, offset: usize) -> Result<T> {
        self.payload_range(offset, T::SIZE).map(T::decode_le)
    }

    /// Decode the payload as an array of `T`.
    ///
    /// The element count is `payload_length / T::SIZE`.
    pub fn payload_array<T: Scalar>(&self) -> Result<Vec<T>> {
        self.payload().map(scalar::decode_all::<T>)
    }

    /// Decode the payload as text, stopping at the first NUL
    pub fn payload_text(&self) -> Result<String> {
        self.payload().map(text_until_nul)
    }
}

pub(crate) fn text_until_nul(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{DEFAULT_CAPACITY, FOOTER};

    fn buffer() -> MessageBuffer {
        let mut buffer = MessageBuffer::default();
        buffer.init();
        buffer
    }

    #[test]
    fn test_set_payload_layout() {
        let mut buffer = buffer();
        buffer.set_payload(&[0x01, 0x02, 0x03]).unwrap();

        assert_eq!(buffer.bytes_remaining(), 23);
        assert_eq!(buffer.payload_length(), 3);
        assert_eq!(buffer.checksum_offset(), 47);
        assert_eq!(buffer.footer_offset(), 63);
        assert_eq!(buffer.message_size(), 67);
        assert_eq!(buffer.payload().unwrap(), &[0x01, 0x02, 0x03]);
        assert_eq!(&buffer.as_bytes()[63..67], &FOOTER.to_le_bytes());
    }

    #[test]
    fn test_set_payload_capacity_limit() {
        let mut buffer = buffer();
        let max = DEFAULT_CAPACITY - 64;

        assert!(buffer.set_payload(&vec![0xAB; max]).is_ok());
        assert_eq!(buffer.message_size(), DEFAULT_CAPACITY);
        assert!(matches!(
            buffer.set_payload(&vec![0xAB; max + 1]),
            Err(Error::PayloadTooLarge { size, max: m }) if size == max + 1 && m == max
        ));
    }

    #[test]
    fn test_scalar_writes_extend_payload_and_footer() {
        let mut buffer = buffer();
        buffer.set_payload_at(0, 0x0102u16).unwrap();
        buffer.set_payload_at(2, 2.5f32).unwrap();

        assert_eq!(buffer.payload_length(), 6);
        assert_eq!(buffer.payload_at::<u16>(0).unwrap(), 0x0102);
        assert_eq!(buffer.payload_at::<f32>(2).unwrap(), 2.5);
        assert_eq!(buffer.footer().unwrap(), FOOTER);
    }

    #[test]
    fn test_sparse_writes_leave_zero_gap() {
        let mut buffer = buffer();
        buffer.set_payload_at(0, 1u8).unwrap();
        buffer.set_payload_at(40, 2u8).unwrap();

        let payload = buffer.payload().unwrap();
        assert_eq!(payload.len(), 41);
        assert_eq!(payload[0], 1);
        assert!(payload[1..40].iter().all(|&b| b == 0), "gap: {payload:02x?}");
        assert_eq!(payload[40], 2);
        assert_eq!(buffer.footer().unwrap(), FOOTER);
    }

    #[test]
    fn test_small_growth_clears_old_trailer() {
        let mut buffer = buffer();
        buffer.set_payload_at(0, 0xAAu8).unwrap();
        buffer.set_payload_at(1, 0xBBu8).unwrap();
        buffer.set_payload_at(2, 0xCCu8).unwrap();

        assert_eq!(buffer.payload().unwrap(), &[0xAA, 0xBB, 0xCC]);
        // checksum region holds no footer leftovers before compute_checksum
        assert_eq!(&buffer.as_bytes()[47..63], &[0u8; 16]);
        assert_eq!(buffer.footer().unwrap(), FOOTER);
    }

    #[test]
    fn test_lower_offset_write_shrinks_payload() {
        let mut buffer = buffer();
        buffer.write_payload(0, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        buffer.set_payload_at(2, 0xFFu8).unwrap();

        assert_eq!(buffer.payload_length(), 3);
        assert_eq!(buffer.payload().unwrap(), &[1, 2, 0xFF]);
        assert_eq!(buffer.footer_offset(), 63);
        assert_eq!(buffer.footer().unwrap(), FOOTER);
    }

    #[test]
    fn test_out_of_order_writes_regrow_with_zeroes() {
        let mut buffer = buffer();
        buffer.write_payload(8, &[9; 4]).unwrap();
        buffer.write_payload(0, &[1; 4]).unwrap();
        assert_eq!(buffer.payload().unwrap(), &[1; 4]);

        buffer.set_payload_at(11, 7u8).unwrap();
        let payload = buffer.payload().unwrap();
        assert_eq!(&payload[..4], &[1; 4]);
        assert!(payload[4..11].iter().all(|&b| b == 0), "gap: {payload:02x?}");
        assert_eq!(payload[11], 7);

        buffer.set_payload_length(2).unwrap();
        buffer.set_payload_length(12).unwrap();
        assert_eq!(&buffer.payload().unwrap()[..2], &[1; 2]);
        assert!(buffer.payload().unwrap()[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_write_payload_out_of_range() {
        let mut buffer = MessageBuffer::new(100);
        buffer.init();

        assert!(buffer.write_payload(30, &[1, 2, 3, 4, 5, 6]).is_ok());
        assert!(matches!(
            buffer.write_payload(33, &[1, 2, 3, 4]),
            Err(Error::OutOfRange {
                region: Region::Payload,
                limit: 36,
                ..
            })
        ));
        assert!(buffer.set_payload_at(usize::MAX, 1u8).is_err());
    }

    #[test]
    fn test_ranged_reads() {
        let mut buffer = buffer();
        buffer.set_payload(b"spectrum").unwrap();

        assert_eq!(buffer.payload_range(2, 3).unwrap(), b"ect");
        assert!(buffer.payload_range(6, 3).is_err());
        assert!(buffer.payload_at::<u64>(1).is_err());
        assert!(buffer.payload_at::<u64>(0).is_ok());
    }

    #[test]
    fn test_arrays_and_text() {
        let mut buffer = buffer();
        let pixels: Vec<u8> = [100u16, 200, 300]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        buffer.set_payload(&pixels).unwrap();

        assert_eq!(buffer.payload_array::<u16>().unwrap(), vec![100, 200, 300]);
        assert_eq!(buffer.payload_array::<u32>().unwrap().len(), 1);

        buffer.set_payload(b"FLMS12345\0\0\0").unwrap();
        assert_eq!(buffer.payload_text().unwrap(), "FLMS12345");
    }

    #[test]
    fn test_received_payload_beyond_capacity() {
        let mut buffer = MessageBuffer::new(128);
        buffer.init();
        buffer.set_bytes_remaining(500);

        assert!(matches!(
            buffer.payload(),
            Err(Error::OutOfRange {
                region: Region::Payload,
                limit: 64,
                ..
            })
        ));
    }
}
