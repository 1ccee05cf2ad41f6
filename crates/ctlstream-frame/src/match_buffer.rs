use bytes::{Buf, BufMut, BytesMut};

use crate::codec::HEADER_LEN;
use crate::error::{FrameError, Result};

/// Bounded, ordered holding area for bytes that may belong to a magic header.
///
/// Capacity is exactly one header. Pushing past capacity is an error rather than a
/// silent overwrite.
#[derive(Debug, Clone)]
pub struct MatchBuffer {
    bytes: BytesMut,
}

impl MatchBuffer {
    /// Maximum number of bytes held at once.
    pub const CAPACITY: usize = HEADER_LEN;

    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            bytes: BytesMut::with_capacity(Self::CAPACITY),
        }
    }

    /// Append one byte at the back.
    pub fn push(&mut self, byte: u8) -> Result<()> {
        if self.is_full() {
            return Err(FrameError::MatchBufferFull {
                capacity: Self::CAPACITY,
            });
        }
        self.bytes.put_u8(byte);
        Ok(())
    }

    /// Remove and return the oldest byte.
    pub fn pop_front(&mut self) -> Option<u8> {
        if self.bytes.is_empty() {
            return None;
        }
        let byte = self.bytes[0];
        self.bytes.advance(1);
        Some(byte)
    }

    /// Byte at `index`, counted from the oldest.
    pub fn get(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    /// Drop every held byte.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Number of held bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when no bytes are held.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when another push would exceed [`Self::CAPACITY`].
    pub fn is_full(&self) -> bool {
        self.bytes.len() >= Self::CAPACITY
    }

    /// Held bytes in arrival order.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for MatchBuffer {
    fn default() -> Self {
        Self::new()
    }
}
