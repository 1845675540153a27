//! Reusable pool of message buffers, one per in-flight exchange.

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, PoisonError};

use crate::protocol::{BufferConfig, MessageBuffer};

/// Shared pool of reusable message buffers.
#[derive(Clone, Debug)]
pub struct MessageBufferPool {
    inner: Arc<PoolInner>,
}

#[derive(Debug)]
struct PoolInner {
    buffers: Mutex<VecDeque<MessageBuffer>>,
    config: BufferConfig,
    max_buffers: usize,
}

impl MessageBufferPool {
    /// Create a pool holding `max_buffers` buffers built from `config`.
    #[must_use]
    pub fn new(config: BufferConfig, max_buffers: usize) -> Self {
        assert!(max_buffers > 0, "max_buffers must be positive");

        let deque = (0..max_buffers)
            .map(|_| MessageBuffer::with_config(config))
            .collect();

        Self {
            inner: Arc::new(PoolInner {
                buffers: Mutex::new(deque),
                config,
                max_buffers,
            }),
        }
    }

    /// Lease a cleared buffer; a fresh one is allocated if the pool is empty.
    #[must_use]
    pub fn acquire(&self) -> PooledBuffer {
        let buffer = self
            .inner
            .buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| MessageBuffer::with_config(self.inner.config));

        PooledBuffer {
            buffer: Some(buffer),
            pool: Arc::clone(&self.inner),
        }
    }

    /// Buffers currently idle in the pool.
    #[must_use]
    pub fn available(&self) -> usize {
        self.inner
            .buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Configuration applied to every buffer.
    #[must_use]
    pub fn config(&self) -> &BufferConfig {
        &self.inner.config
    }

    /// Maximum number of buffers managed by the pool.
    #[must_use]
    pub fn max_buffers(&self) -> usize {
        self.inner.max_buffers
    }
}

/// Buffer leased from the pool; cleared and returned on drop.
#[derive(Debug)]
pub struct PooledBuffer {
    buffer: Option<MessageBuffer>,
    pool: Arc<PoolInner>,
}

impl Deref for PooledBuffer {
    type Target = MessageBuffer;

    fn deref(&self) -> &MessageBuffer {
        self.buffer.as_ref().expect("buffer already returned to pool")
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut MessageBuffer {
        self.buffer.as_mut().expect("buffer already returned to pool")
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        if let Some(mut buffer) = self.buffer.take() {
            buffer.clear();
            let mut guard = self
                .pool
                .buffers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if guard.len() < self.pool.max_buffers {
                guard.push_back(buffer);
            }
        }
    }
}
