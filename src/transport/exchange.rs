//! Whole-frame send/receive over a [`Transport`].
//!
//! Each call handles exactly one frame and never retries; the outcome of the
//! last transfer is stored in the buffer's I/O status.

use tracing::{debug, instrument, trace};

use super::{Transport, TransportError};
use crate::protocol::{HEADER_SIZE, IoStatus, MessageBuffer, MessageHeader};

/// Send the frame currently held by `buffer`.
///
/// The caller finalizes the frame (footer and checksum) beforehand.
#[instrument(level = "trace", skip(transport, buffer), fields(message_type = buffer.message_type()))]
pub fn send_message<T: Transport + ?Sized>(
    transport: &mut T,
    buffer: &mut MessageBuffer,
) -> Result<(), TransportError> {
    let frame = buffer.frame()?;
    let len = frame.len();
    let status = transport.send(frame);
    buffer.set_io_status(status);

    if !status.is_success() {
        debug!(%status, len, "send failed");
        return Err(TransportError::Io(status));
    }
    trace!(len, "frame sent");
    Ok(())
}

/// Receive one frame into `buffer`.
///
/// Reads the 44-byte header first, then the `BytesRemaining` bytes it
/// announces. A frame larger than the buffer is refused with
/// `IoStatus::OutOfRange` before its body is read.
#[instrument(level = "trace", skip(transport, buffer))]
pub fn receive_message<T: Transport + ?Sized>(
    transport: &mut T,
    buffer: &mut MessageBuffer,
) -> Result<(), TransportError> {
    buffer.clear();

    let status = transport.receive(&mut buffer.as_bytes_mut()[..HEADER_SIZE]);
    buffer.set_io_status(status);
    if !status.is_success() {
        debug!(%status, "header receive failed");
        return Err(TransportError::Io(status));
    }

    let header = MessageHeader::from_bytes(buffer.as_bytes())?;
    let size = buffer.message_size();
    if size > buffer.capacity() {
        debug!(
            size,
            capacity = buffer.capacity(),
            bytes_remaining = header.bytes_remaining,
            "frame exceeds buffer"
        );
        buffer.set_io_status(IoStatus::OutOfRange);
        return Err(TransportError::Io(IoStatus::OutOfRange));
    }

    let status = transport.receive(&mut buffer.as_bytes_mut()[HEADER_SIZE..size]);
    buffer.set_io_status(status);
    if !status.is_success() {
        debug!(%status, size, "body receive failed");
        return Err(TransportError::Io(status));
    }

    trace!(%header, "frame received");
    Ok(())
}

/// Perform one request/response exchange.
///
/// Finalizes and sends `request`, receives into `response`, validates it,
/// and checks that the device neither flagged an error nor answered a
/// different message type.
#[instrument(level = "debug", skip_all, fields(message_type = request.message_type()))]
pub fn query<T: Transport + ?Sized>(
    transport: &mut T,
    request: &mut MessageBuffer,
    response: &mut MessageBuffer,
) -> Result<(), TransportError> {
    request.finalize()?;
    send_message(transport, request)?;
    receive_message(transport, response)?;
    response.validate()?;

    if response.is_error() {
        return Err(TransportError::Device {
            error_number: response.error_number(),
            description: response.error_description(),
        });
    }

    if response.message_type() != request.message_type() {
        return Err(TransportError::UnexpectedResponse {
            expected: request.message_type(),
            found: response.message_type(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ChecksumType, Error, Flags, encode};
    use crate::transport::LoopbackTransport;

    fn request(message_type: u32) -> MessageBuffer {
        let mut buffer = MessageBuffer::default();
        buffer.init();
        buffer.set_message_type(message_type);
        buffer.set_checksum_type(ChecksumType::Md5);
        buffer
    }

    fn reply(message_type: u32, flags: Flags, payload: &[u8]) -> Vec<u8> {
        let mut buffer = request(message_type);
        buffer.set_flags(flags.with(Flags::RESPONSE));
        buffer.set_payload(payload).unwrap();
        encode(&mut buffer).unwrap().to_vec()
    }

    #[test]
    fn test_send_records_frame() {
        let mut transport = LoopbackTransport::new();
        let mut buffer = request(0x100);
        buffer.finalize().unwrap();

        send_message(&mut transport, &mut buffer).unwrap();
        assert_eq!(buffer.io_status(), IoStatus::Success);
        assert_eq!(transport.sent().len(), 1);
        assert_eq!(transport.sent()[0].len(), 64);
    }

    #[test]
    fn test_send_failure_sets_status() {
        let mut transport = LoopbackTransport::new();
        transport.fail_next_send(IoStatus::PortError);
        let mut buffer = request(0x100);

        let result = send_message(&mut transport, &mut buffer);
        assert_eq!(result, Err(TransportError::Io(IoStatus::PortError)));
        assert_eq!(buffer.io_status(), IoStatus::PortError);
    }

    #[test]
    fn test_receive_reads_header_then_body() {
        let mut transport = LoopbackTransport::new();
        transport.push_inbound(&reply(0x100, Flags::new(), b"FLMS01234"));
        let mut buffer = MessageBuffer::default();

        receive_message(&mut transport, &mut buffer).unwrap();
        assert_eq!(buffer.io_status(), IoStatus::Success);
        assert_eq!(buffer.payload_text().unwrap(), "FLMS01234");
        assert_eq!(transport.pending_inbound(), 0);
    }

    #[test]
    fn test_receive_short_body() {
        let mut transport = LoopbackTransport::new();
        let frame = reply(0x100, Flags::new(), &[1; 10]);
        transport.push_inbound(&frame[..frame.len() - 5]);
        let mut buffer = MessageBuffer::default();

        let result = receive_message(&mut transport, &mut buffer);
        assert_eq!(result, Err(TransportError::Io(IoStatus::InsufficientData)));
        assert_eq!(buffer.io_status(), IoStatus::InsufficientData);
    }

    #[test]
    fn test_receive_oversized_frame() {
        let mut transport = LoopbackTransport::new();
        transport.push_inbound(&reply(0x100, Flags::new(), &[0; 200]));
        let mut buffer = MessageBuffer::new(128);

        let result = receive_message(&mut transport, &mut buffer);
        assert_eq!(result, Err(TransportError::Io(IoStatus::OutOfRange)));
        assert_eq!(buffer.io_status(), IoStatus::OutOfRange);
    }

    #[test]
    fn test_receive_garbage_header() {
        let mut transport = LoopbackTransport::new();
        transport.push_inbound(&[0u8; 64]);
        let mut buffer = MessageBuffer::default();

        let result = receive_message(&mut transport, &mut buffer);
        assert!(matches!(
            result,
            Err(TransportError::Frame(Error::InvalidStartBytes { .. }))
        ));
    }

    #[test]
    fn test_query_roundtrip() {
        let mut transport = LoopbackTransport::new();
        transport.push_inbound(&reply(0x0000_0100, Flags::new(), b"serial"));
        let mut req = request(0x0000_0100);
        let mut resp = MessageBuffer::default();

        query(&mut transport, &mut req, &mut resp).unwrap();
        assert!(resp.flags().is_response());
        assert_eq!(resp.payload().unwrap(), b"serial");
    }

    #[test]
    fn test_query_device_nack() {
        let mut transport = LoopbackTransport::new();
        let mut nack = request(0x100);
        nack.set_flags(Flags::new().with(Flags::RESPONSE).with(Flags::NACK));
        nack.set_error_number(2);
        transport.push_inbound(&encode(&mut nack).unwrap());

        let mut req = request(0x100);
        let mut resp = MessageBuffer::default();
        let result = query(&mut transport, &mut req, &mut resp);
        assert_eq!(
            result,
            Err(TransportError::Device {
                error_number: 2,
                description: "Unknown message type",
            })
        );
    }

    #[test]
    fn test_query_unexpected_response() {
        let mut transport = LoopbackTransport::new();
        transport.push_inbound(&reply(0x200, Flags::new(), &[]));

        let mut req = request(0x100);
        let mut resp = MessageBuffer::default();
        let result = query(&mut transport, &mut req, &mut resp);
        assert_eq!(
            result,
            Err(TransportError::UnexpectedResponse {
                expected: 0x100,
                found: 0x200
            })
        );
    }
}
