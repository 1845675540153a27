//! OBP frame codec: checksum, footer and frame validation
//!
//! # Format
//!
//! ```text
//! [HEADER (44 bytes)] [PAYLOAD (BR - 20)] [CHECKSUM (16 bytes)] [FOOTER (4 bytes)]
//! ```
//!
//! With checksum type MD5 the checksum region holds the digest of every byte
//! before it. Any other checksum type zero-fills the region and always
//! verifies.

use bytes::Bytes;
use md5::{Digest, Md5};
use tracing::{debug, trace};

use super::{
    CHECKSUM_SIZE, ChecksumType, Error, FOOTER, FOOTER_SIZE, HEADER_SIZE, MessageBuffer, Result,
};

impl MessageBuffer {
    /// Fill the checksum region.
    ///
    /// For MD5 the digest covers bytes `[0, checksum_offset)`; for any other
    /// checksum type the region is zeroed. Corrects a `BytesRemaining` below
    /// 20 before locating the region.
    pub fn compute_checksum(&mut self) -> Result<()> {
        let offset = self.checksum_offset();
        self.ensure_frame_fits()?;

        let checksum = match self.checksum_type() {
            ChecksumType::Md5 => self.digest(offset),
            _ => [0u8; CHECKSUM_SIZE],
        };
        self.bytes_mut(offset, CHECKSUM_SIZE)
            .copy_from_slice(&checksum);
        trace!(offset, checksum_type = %self.checksum_type(), "checksum computed");
        Ok(())
    }

    /// Check the stored checksum against the frame contents.
    ///
    /// Always true unless the checksum type is MD5: an unchecked frame is
    /// defined as matching. Callers that require a checksum must inspect
    /// [`checksum_type`](Self::checksum_type) themselves. An MD5 frame that
    /// does not fit the buffer never matches.
    pub fn is_checksum_match(&mut self) -> bool {
        if self.checksum_type() != ChecksumType::Md5 {
            return true;
        }
        match self.checksum_pair() {
            Ok((expected, found)) => expected == found,
            Err(err) => {
                debug!(error = %err, "checksum region not addressable");
                false
            }
        }
    }

    /// The 16 bytes stored in the checksum region
    pub fn stored_checksum(&mut self) -> Result<[u8; CHECKSUM_SIZE]> {
        let offset = self.checksum_offset();
        self.ensure_frame_fits()?;

        let mut checksum = [0u8; CHECKSUM_SIZE];
        checksum.copy_from_slice(self.bytes(offset, CHECKSUM_SIZE));
        Ok(checksum)
    }

    /// Write the footer sentinel at the derived footer offset
    pub fn set_footer(&mut self) -> Result<()> {
        self.set_footer_value(FOOTER)
    }

    /// Write an arbitrary 32-bit value at the derived footer offset
    pub fn set_footer_value(&mut self, value: u32) -> Result<()> {
        self.footer_offset();
        self.ensure_frame_fits()?;
        self.write_footer(value);
        Ok(())
    }

    /// Read the 32-bit value at the derived footer offset
    pub fn footer(&mut self) -> Result<u32> {
        let offset = self.footer_offset();
        self.ensure_frame_fits()?;
        Ok(self.read(offset))
    }

    /// Check that the footer sentinel sits where `BytesRemaining` says it should
    pub fn has_valid_footer(&mut self) -> bool {
        self.footer().is_ok_and(|footer| footer == FOOTER)
    }

    /// Stamp footer and checksum; return the frame ready for a transport.
    pub fn finalize(&mut self) -> Result<&[u8]> {
        self.set_footer()?;
        self.compute_checksum()?;
        self.frame()
    }

    /// Validate a received frame.
    ///
    /// Checks, in order: start markers, that the frame fits the buffer, the
    /// footer sentinel, and the checksum (MD5 frames only).
    pub fn validate(&mut self) -> Result<()> {
        let found = self.start_bytes();
        if !self.has_start_bytes() {
            return Err(Error::InvalidStartBytes { found });
        }

        let footer = self.footer()?;
        if footer != FOOTER {
            return Err(Error::InvalidFooter { found: footer });
        }

        if self.checksum_type() == ChecksumType::Md5 {
            let (expected, found) = self.checksum_pair()?;
            if expected != found {
                debug!(
                    message_type = self.message_type(),
                    regarding = self.regarding(),
                    "checksum mismatch"
                );
                return Err(Error::ChecksumMismatch { expected, found });
            }
        }

        Ok(())
    }

    fn checksum_pair(&mut self) -> Result<([u8; CHECKSUM_SIZE], [u8; CHECKSUM_SIZE])> {
        let found = self.stored_checksum()?;
        let offset = self.checksum_offset();
        Ok((self.digest(offset), found))
    }

    fn digest(&self, len: usize) -> [u8; CHECKSUM_SIZE] {
        let mut checksum = [0u8; CHECKSUM_SIZE];
        checksum.copy_from_slice(&Md5::digest(self.bytes(0, len)));
        checksum
    }
}

/// Finalize a buffer and copy its frame out for a transport
pub fn encode(buffer: &mut MessageBuffer) -> Result<Bytes> {
    let frame = buffer.finalize()?;
    Ok(Bytes::copy_from_slice(frame))
}

/// Decode and validate a received frame
///
/// # Errors
///
/// Returns an error if:
/// - Fewer than 64 bytes are supplied
/// - The start markers are missing
/// - `BytesRemaining` points past the supplied bytes
/// - The footer sentinel is missing
/// - The MD5 checksum doesn't match
pub fn decode(bytes: &[u8]) -> Result<MessageBuffer> {
    let needed = HEADER_SIZE + CHECKSUM_SIZE + FOOTER_SIZE;
    if bytes.len() < needed {
        return Err(Error::BufferTooSmall {
            needed,
            got: bytes.len(),
        });
    }

    let mut buffer = MessageBuffer::from_bytes(bytes);
    let size = buffer.message_size();
    if size > bytes.len() {
        return Err(Error::BufferTooSmall {
            needed: size,
            got: bytes.len(),
        });
    }

    buffer.validate()?;
    Ok(buffer)
}
