//! Query a simulated spectrometer over the loopback transport

use obp::transport::query;
use obp::{BufferConfig, ChecksumType, Flags, LoopbackTransport, MessageBuffer, decode, encode};
use tracing_subscriber::EnvFilter;

const GET_SERIAL_NUMBER: u32 = 0x0000_0100;

fn simulated_device(frame: &[u8]) -> Option<Vec<u8>> {
    let request = decode(frame).ok()?;
    let mut reply = MessageBuffer::default();
    reply.init();
    reply.set_checksum_type(ChecksumType::Md5);
    reply.set_message_type(request.message_type());
    reply.set_regarding(request.regarding());
    reply.set_flags(Flags::new().with(Flags::RESPONSE));
    reply.set_payload(b"FLMS00042\0").ok()?;
    Some(encode(&mut reply).ok()?.to_vec())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("OBP Loopback Query");
    println!("==================\n");

    let config = BufferConfig::default().with_checksum_type(ChecksumType::Md5);
    let mut request = MessageBuffer::with_config(config);
    request.init();
    request.set_message_type(GET_SERIAL_NUMBER);
    request.set_regarding(1);

    let mut response = MessageBuffer::with_config(config);
    let mut transport = LoopbackTransport::with_responder(simulated_device);
    query(&mut transport, &mut request, &mut response)?;

    println!("Request:  {}", request.header());
    println!("Response: {}", response.header());
    println!("Serial number: {}", response.payload_text()?);
    println!("Frame size: {} bytes", response.message_size());

    Ok(())
}
