use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use crate::error::{Result, SourceError};

/// Outcome of pulling a single byte from a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    /// The next byte of the stream.
    Byte(u8),
    /// Nothing is available right now (polling readers only).
    Pending,
    /// The stream reached end-of-file.
    Closed,
}

/// A reader that yields one byte per call.
///
/// Blocking readers never return [`Pull::Pending`]; polling readers return it instead of
/// waiting.
pub trait ReadByte {
    /// Pull the next byte, or report why none is available.
    fn read_byte(&mut self) -> Result<Pull>;
}

impl<T: ReadByte + ?Sized> ReadByte for &mut T {
    fn read_byte(&mut self) -> Result<Pull> {
        (**self).read_byte()
    }
}

/// Blocking single-byte reader over any `Read` stream.
///
/// `Ok(0)` from the inner stream is end-of-file. Interrupted reads are retried.
#[derive(Debug)]
pub struct Blocking<R> {
    inner: R,
}

impl<R: Read> Blocking<R> {
    /// Wrap a stream for blocking byte reads.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ReadByte for Blocking<R> {
    fn read_byte(&mut self) -> Result<Pull> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(Pull::Closed),
                Ok(_) => return Ok(Pull::Byte(byte[0])),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(SourceError::Io(err)),
            }
        }
    }
}

/// Reader that replays a fixed sequence of pulls, then reports [`Pull::Closed`].
///
/// Useful for driving a scanner through exact pending/closed interleavings.
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    steps: VecDeque<Pull>,
}

impl Scripted {
    /// Create a script from explicit steps.
    pub fn new(steps: impl IntoIterator<Item = Pull>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    /// Create a script that yields `bytes` in order.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(bytes.iter().copied().map(Pull::Byte))
    }

    /// Append bytes to the end of the script.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.steps.extend(bytes.iter().copied().map(Pull::Byte));
    }

    /// Append a single "nothing ready" step.
    pub fn push_pending(&mut self) {
        self.steps.push_back(Pull::Pending);
    }

    /// Number of steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl ReadByte for Scripted {
    fn read_byte(&mut self) -> Result<Pull> {
        Ok(self.steps.pop_front().unwrap_or(Pull::Closed))
    }
}
