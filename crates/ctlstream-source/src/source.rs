use std::collections::VecDeque;

use tracing::trace;

use crate::error::Result;
use crate::pull::{Blocking, Pull, ReadByte};

/// A byte source with a prepend queue in front of the underlying reader.
///
/// Prepended bytes are yielded before anything from the reader and are otherwise
/// indistinguishable from it. Once the reader reports [`Pull::Closed`] the source stays
/// closed; it never pulls from the reader again.
#[derive(Debug)]
pub struct ByteSource<R> {
    inner: R,
    prepended: VecDeque<u8>,
    reader_closed: bool,
}

impl<R: ReadByte> ByteSource<R> {
    /// Create a source over any single-byte reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            prepended: VecDeque::new(),
            reader_closed: false,
        }
    }

    /// Pull the next byte: prepended bytes first, then the reader.
    pub fn pull(&mut self) -> Result<Pull> {
        if let Some(byte) = self.prepended.pop_front() {
            return Ok(Pull::Byte(byte));
        }
        if self.reader_closed {
            return Ok(Pull::Closed);
        }

        let pulled = self.inner.read_byte()?;
        if pulled == Pull::Closed {
            trace!("byte source reached end of stream");
            self.reader_closed = true;
        }
        Ok(pulled)
    }

    /// Place `bytes` ahead of everything not yet pulled, keeping their order.
    pub fn prepend(&mut self, bytes: &[u8]) {
        for &byte in bytes.iter().rev() {
            self.prepended.push_front(byte);
        }
    }

    /// Drop all prepended bytes that have not been pulled yet.
    pub fn clear_prepended(&mut self) {
        self.prepended.clear();
    }

    /// Number of prepended bytes still waiting.
    pub fn prepended_len(&self) -> usize {
        self.prepended.len()
    }

    /// True once the reader hit end-of-stream and no prepended bytes remain.
    pub fn is_closed(&self) -> bool {
        self.reader_closed && self.prepended.is_empty()
    }

    /// Borrow the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the source and return the inner reader. Prepended bytes are dropped.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<T: std::io::Read> ByteSource<Blocking<T>> {
    /// Create a blocking source over a `Read` stream.
    pub fn blocking(inner: T) -> Self {
        Self::new(Blocking::new(inner))
    }
}

#[cfg(unix)]
impl<F: std::os::fd::AsRawFd> ByteSource<crate::poll::Polling<F>> {
    /// Create a zero-timeout polling source over a unix descriptor.
    pub fn polling(inner: F) -> Self {
        Self::new(crate::poll::Polling::new(inner))
    }
}
