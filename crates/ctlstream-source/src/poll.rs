use std::io::ErrorKind;
use std::os::fd::{AsRawFd, RawFd};

use tracing::trace;

use crate::error::{Result, SourceError};
use crate::pull::{Pull, ReadByte};

/// Zero-timeout polling reader over a unix file descriptor.
///
/// Each call checks readiness with `poll(2)` and a zero timeout. When nothing is ready the
/// reader returns [`Pull::Pending`] instead of waiting. Bytes are read straight from the
/// descriptor, one at a time, so no data is ever held in a userspace buffer that readiness
/// polling cannot see.
#[derive(Debug)]
pub struct Polling<F> {
    inner: F,
}

impl<F: AsRawFd> Polling<F> {
    /// Wrap a descriptor-backed handle for polling byte reads.
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    /// Borrow the underlying handle.
    pub fn get_ref(&self) -> &F {
        &self.inner
    }

    /// Consume the reader and return the inner handle.
    pub fn into_inner(self) -> F {
        self.inner
    }

    fn ready(&self, fd: RawFd) -> Result<bool> {
        let mut pfd = libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        };

        // SAFETY: `pfd` is a valid, writable pollfd and the count passed is exactly one.
        let rc = unsafe { libc::poll(&mut pfd, 1, 0) };
        if rc < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(SourceError::Poll { fd, source: err });
        }
        if pfd.revents & libc::POLLNVAL != 0 {
            return Err(SourceError::Poll {
                fd,
                source: std::io::Error::from_raw_os_error(libc::EBADF),
            });
        }

        Ok(rc > 0 && pfd.revents & (libc::POLLIN | libc::POLLHUP | libc::POLLERR) != 0)
    }
}

impl<F: AsRawFd> ReadByte for Polling<F> {
    fn read_byte(&mut self) -> Result<Pull> {
        let fd = self.inner.as_raw_fd();
        if !self.ready(fd)? {
            return Ok(Pull::Pending);
        }

        let mut byte = 0u8;
        // SAFETY: `byte` is a valid writable location of exactly one byte, and `fd` is an
        // open descriptor owned by `self.inner` for the duration of this call.
        let n = unsafe { libc::read(fd, (&mut byte as *mut u8).cast::<libc::c_void>(), 1) };

        match n {
            0 => Ok(Pull::Closed),
            1 => Ok(Pull::Byte(byte)),
            _ => {
                let err = std::io::Error::last_os_error();
                match err.kind() {
                    ErrorKind::WouldBlock | ErrorKind::Interrupted => {
                        trace!(fd, "descriptor reported ready but read would block");
                        Ok(Pull::Pending)
                    }
                    _ => Err(SourceError::Io(err)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::os::unix::net::UnixStream;

    use super::*;

    #[test]
    fn pending_when_nothing_written() {
        let (_left, right) = UnixStream::pair().unwrap();
        let mut reader = Polling::new(right);
        assert_eq!(reader.read_byte().unwrap(), Pull::Pending);
        assert_eq!(reader.read_byte().unwrap(), Pull::Pending);
    }

    #[test]
    fn reads_bytes_once_available() {
        let (mut left, right) = UnixStream::pair().unwrap();
        let mut reader = Polling::new(right);

        assert_eq!(reader.read_byte().unwrap(), Pull::Pending);
        left.write_all(b"hi").unwrap();

        assert_eq!(reader.read_byte().unwrap(), Pull::Byte(b'h'));
        assert_eq!(reader.read_byte().unwrap(), Pull::Byte(b'i'));
        assert_eq!(reader.read_byte().unwrap(), Pull::Pending);
    }

    #[test]
    fn closed_after_peer_hangs_up() {
        let (mut left, right) = UnixStream::pair().unwrap();
        let mut reader = Polling::new(right);

        left.write_all(b"q").unwrap();
        drop(left);

        assert_eq!(reader.read_byte().unwrap(), Pull::Byte(b'q'));
        assert_eq!(reader.read_byte().unwrap(), Pull::Closed);
    }

    #[test]
    fn accessors_and_into_inner() {
        let (_left, right) = UnixStream::pair().unwrap();
        let reader = Polling::new(right);
        let _ = reader.get_ref();
        let _inner = reader.into_inner();
    }
}
