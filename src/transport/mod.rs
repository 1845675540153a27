//! Transport seam for moving OBP frames over serial, TCP or USB links
//!
//! The codec never performs I/O. Drivers implement [`Transport`]; the
//! exchange helpers move whole frames through it and record the outcome in
//! the buffer's [`IoStatus`].

mod error;
mod exchange;
mod loopback;
mod pool;

pub use error::TransportError;
pub use exchange::{query, receive_message, send_message};
pub use loopback::LoopbackTransport;
pub use pool::{MessageBufferPool, PooledBuffer};

use crate::protocol::IoStatus;

/// Byte-level link to a device.
pub trait Transport {
    /// Write every byte of `bytes` to the device.
    fn send(&mut self, bytes: &[u8]) -> IoStatus;

    /// Fill all of `bytes` from the device.
    ///
    /// Returns `IoStatus::InsufficientData` or `IoStatus::Timeout` when the
    /// device delivers fewer bytes.
    fn receive(&mut self, bytes: &mut [u8]) -> IoStatus;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, bytes: &[u8]) -> IoStatus {
        (**self).send(bytes)
    }

    fn receive(&mut self, bytes: &mut [u8]) -> IoStatus {
        (**self).receive(bytes)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, bytes: &[u8]) -> IoStatus {
        (**self).send(bytes)
    }

    fn receive(&mut self, bytes: &mut [u8]) -> IoStatus {
        (**self).receive(bytes)
    }
}
