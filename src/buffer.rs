//! Bounded byte intake queue.
//!
//! Holds raw serial bytes until the synchronizer consumes them. The queue
//! never grows past its capacity: overflow is resolved by discarding bytes
//! according to the configured [`OverflowPolicy`].

use crate::error::ConfigError;
use crate::frame::FRAME_LEN;

/// Default intake capacity in bytes.
pub const DEFAULT_CAPACITY: usize = 128;

/// Which bytes to discard when intake would exceed capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OverflowPolicy {
    /// Drop the oldest buffered bytes so the newest input always fits.
    #[default]
    DropOldest,
    /// Keep what is buffered and drop the tail of the new input.
    DropNewest,
}

/// Capacity-bounded FIFO of raw bytes.
#[derive(Debug, Clone)]
pub struct IntakeBuffer {
    buf: Vec<u8>,
    capacity: usize,
    policy: OverflowPolicy,
}

impl IntakeBuffer {
    /// Create a buffer of [`DEFAULT_CAPACITY`] that drops the oldest bytes.
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
            capacity: DEFAULT_CAPACITY,
            policy: OverflowPolicy::DropOldest,
        }
    }

    /// Create a buffer with an explicit capacity and overflow policy.
    ///
    /// The capacity must hold at least one full frame.
    pub fn with_capacity(capacity: usize, policy: OverflowPolicy) -> Result<Self, ConfigError> {
        if capacity < FRAME_LEN {
            return Err(ConfigError::BufferTooSmall {
                capacity,
                frame_len: FRAME_LEN,
            });
        }
        Ok(Self {
            buf: Vec::with_capacity(capacity),
            capacity,
            policy,
        })
    }

    /// Append newly received bytes.
    ///
    /// Returns how many bytes (buffered or incoming) were discarded to keep
    /// the length within capacity.
    pub fn append(&mut self, data: &[u8]) -> usize {
        match self.policy {
            OverflowPolicy::DropOldest => {
                if data.len() >= self.capacity {
                    let dropped = self.buf.len() + data.len() - self.capacity;
                    self.buf.clear();
                    self.buf
                        .extend_from_slice(&data[data.len() - self.capacity..]);
                    return dropped;
                }
                let overflow = (self.buf.len() + data.len()).saturating_sub(self.capacity);
                if overflow > 0 {
                    self.buf.drain(..overflow);
                }
                self.buf.extend_from_slice(data);
                overflow
            }
            OverflowPolicy::DropNewest => {
                let room = self.capacity - self.buf.len();
                let take = room.min(data.len());
                self.buf.extend_from_slice(&data[..take]);
                data.len() - take
            }
        }
    }

    /// Up to `n` leading bytes, without copying.
    pub fn peek_window(&self, n: usize) -> &[u8] {
        &self.buf[..n.min(self.buf.len())]
    }

    /// Remove up to `k` bytes from the front.
    pub fn consume_prefix(&mut self, k: usize) {
        let k = k.min(self.buf.len());
        self.buf.drain(..k);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free space before the next append starts discarding.
    pub fn remaining(&self) -> usize {
        self.capacity - self.buf.len()
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Default for IntakeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
