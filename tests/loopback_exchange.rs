use obp::transport::{query, receive_message, send_message};
use obp::{
    BufferConfig, ChecksumType, Flags, IoStatus, LoopbackTransport, MessageBuffer,
    MessageBufferPool, TransportError, decode, encode,
};

const GET_SERIAL_NUMBER: u32 = 0x0000_0100;
const SET_INTEGRATION_TIME: u32 = 0x0011_0010;

/// Device stand-in: echoes the message type and regarding id, answers with a
/// serial number, and NACKs anything it does not know.
fn device(frame: &[u8]) -> Option<Vec<u8>> {
    let mut request = decode(frame).ok()?;
    let mut reply = MessageBuffer::default();
    reply.init();
    reply.set_checksum_type(ChecksumType::Md5);
    reply.set_message_type(request.message_type());
    reply.set_regarding(request.regarding());

    let integration_time_us = request.immediate::<u32>(0).unwrap_or(0);
    let mut flags = Flags::new().with(Flags::RESPONSE);
    match request.message_type() {
        GET_SERIAL_NUMBER => reply.set_payload(b"FLMS00042\0").ok()?,
        SET_INTEGRATION_TIME if integration_time_us >= 10 => {
            flags = flags.with(Flags::ACK);
        }
        _ => {
            flags = flags.with(Flags::NACK);
            reply.set_error_number(6);
        }
    }
    reply.set_flags(flags);
    assert!(request.is_checksum_match());
    Some(encode(&mut reply).ok()?.to_vec())
}

fn request(message_type: u32) -> MessageBuffer {
    let mut buffer = MessageBuffer::with_config(
        BufferConfig::default().with_checksum_type(ChecksumType::Md5),
    );
    buffer.init();
    buffer.set_message_type(message_type);
    buffer
}

#[test]
fn serial_number_query() {
    let mut transport = LoopbackTransport::with_responder(device);
    let mut req = request(GET_SERIAL_NUMBER);
    req.set_regarding(77);
    let mut resp = MessageBuffer::default();

    query(&mut transport, &mut req, &mut resp).unwrap();

    assert_eq!(resp.io_status(), IoStatus::Success);
    assert_eq!(resp.regarding(), 77);
    assert_eq!(resp.payload_text().unwrap(), "FLMS00042");
    assert_eq!(transport.sent().len(), 1);
}

#[test]
fn integration_time_nack_surfaces_device_error() {
    let mut transport = LoopbackTransport::with_responder(device);
    let mut resp = MessageBuffer::default();

    let mut accepted = request(SET_INTEGRATION_TIME);
    accepted.set_immediate(0, 100_000u32);
    query(&mut transport, &mut accepted, &mut resp).unwrap();
    assert!(resp.flags().has(Flags::ACK));

    let mut rejected = request(SET_INTEGRATION_TIME);
    rejected.set_immediate(0, 1u32);
    let result = query(&mut transport, &mut rejected, &mut resp);
    assert_eq!(
        result,
        Err(TransportError::Device {
            error_number: 6,
            description: "Payload data invalid",
        })
    );
}

#[test]
fn pooled_buffers_serve_consecutive_exchanges() {
    let pool = MessageBufferPool::new(BufferConfig::default(), 2);
    let mut transport = LoopbackTransport::with_responder(device);

    for regarding in 0..4u32 {
        let mut req = pool.acquire();
        req.init();
        req.set_message_type(GET_SERIAL_NUMBER);
        req.set_regarding(regarding);
        let mut resp = pool.acquire();

        query(&mut transport, &mut req, &mut resp).unwrap();
        assert_eq!(resp.regarding(), regarding);
    }
    assert_eq!(pool.available(), 2);
}

#[test]
fn manual_send_and_receive() {
    let mut transport = LoopbackTransport::new();
    let mut req = request(GET_SERIAL_NUMBER);
    req.set_payload(&[1, 2, 3]).unwrap();
    req.finalize().unwrap();
    send_message(&mut transport, &mut req).unwrap();

    // feed the sent frame back as if the device echoed it
    let echoed = transport.sent()[0].clone();
    transport.push_inbound(&echoed);

    let mut resp = MessageBuffer::default();
    receive_message(&mut transport, &mut resp).unwrap();
    resp.validate().unwrap();
    assert_eq!(resp.payload().unwrap(), &[1, 2, 3]);
    assert_eq!(resp.message_size(), 67);
}
