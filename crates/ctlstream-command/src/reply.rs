use std::io::{ErrorKind, Write};

use bytes::{BufMut, BytesMut};

/// Line-oriented reply sink shared by every command handler.
///
/// Each reply is assembled in full, written, and flushed before returning, so a host tool
/// watching the stream never sees a partial reply.
#[derive(Debug)]
pub struct ReplyChannel<W> {
    inner: W,
    buf: BytesMut,
}

impl<W: Write> ReplyChannel<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(64),
        }
    }

    /// Write `text` followed by a newline, then flush.
    pub fn reply_line(&mut self, text: &str) -> std::io::Result<()> {
        self.buf.clear();
        self.buf.reserve(text.len() + 1);
        self.buf.put_slice(text.as_bytes());
        self.buf.put_u8(b'\n');

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(std::io::Error::from(ErrorKind::WriteZero)),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }

        self.flush()
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> std::io::Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    /// Consume the channel and return the inner sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}
