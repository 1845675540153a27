//! In-memory transport for tests and demos.

use std::fmt;

use bytes::{Buf, Bytes, BytesMut};
use tracing::trace;

use super::Transport;
use crate::protocol::IoStatus;

type Responder = Box<dyn FnMut(&[u8]) -> Option<Vec<u8>> + Send>;

/// Transport backed by an inbound byte queue and a log of sent frames.
///
/// An optional responder plays the device: it sees every sent frame and may
/// queue a reply.
#[derive(Default)]
pub struct LoopbackTransport {
    inbound: BytesMut,
    sent: Vec<Bytes>,
    fail_send: Option<IoStatus>,
    responder: Option<Responder>,
}

impl LoopbackTransport {
    /// Create an empty loopback link.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a link whose device side answers sent frames with `responder`.
    #[must_use]
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: FnMut(&[u8]) -> Option<Vec<u8>> + Send + 'static,
    {
        Self {
            responder: Some(Box::new(responder)),
            ..Self::default()
        }
    }

    /// Queue bytes for the host to receive.
    pub fn push_inbound(&mut self, bytes: &[u8]) {
        self.inbound.extend_from_slice(bytes);
    }

    /// Number of queued bytes not yet received.
    #[must_use]
    pub fn pending_inbound(&self) -> usize {
        self.inbound.len()
    }

    /// Frames sent so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> &[Bytes] {
        &self.sent
    }

    /// Make the next `send` fail with `status`.
    pub fn fail_next_send(&mut self, status: IoStatus) {
        self.fail_send = Some(status);
    }
}

impl Transport for LoopbackTransport {
    fn send(&mut self, bytes: &[u8]) -> IoStatus {
        if let Some(status) = self.fail_send.take() {
            return status;
        }

        self.sent.push(Bytes::copy_from_slice(bytes));
        if let Some(reply) = self.responder.as_mut().and_then(|respond| respond(bytes)) {
            trace!(len = reply.len(), "loopback device queued reply");
            self.inbound.extend_from_slice(&reply);
        }
        IoStatus::Success
    }

    fn receive(&mut self, bytes: &mut [u8]) -> IoStatus {
        if self.inbound.len() < bytes.len() {
            trace!(
                wanted = bytes.len(),
                available = self.inbound.len(),
                "loopback underrun"
            );
            self.inbound.clear();
            return IoStatus::InsufficientData;
        }

        self.inbound.copy_to_slice(bytes);
        IoStatus::Success
    }
}

impl fmt::Debug for LoopbackTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopbackTransport")
            .field("pending_inbound", &self.inbound.len())
            .field("sent", &self.sent.len())
            .finish_non_exhaustive()
    }
}
