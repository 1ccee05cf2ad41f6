use ctlstream_source::{ByteSource, Pull, ReadByte};
use tracing::{debug, trace};

use crate::codec::{ABORT_BYTE, HEADER_LEN, MAGIC_HEADER};
use crate::error::{FrameError, Result};
use crate::handler::{CommandHandler, Dispatch};
use crate::match_buffer::MatchBuffer;
use crate::opcode::Opcode;

/// One step of scanner output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputUnit {
    /// Deliver this byte to the application exactly as received.
    Data(u8),
    /// A header + opcode was consumed and its handler already ran.
    CommandHandled(Opcode),
    /// Abort requested; stop reading this stream.
    Abort,
    /// Nothing available: end of stream, or nothing ready on a polling source.
    SourceExhausted,
}

/// Observable scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// No bytes held.
    Idle,
    /// `k` held bytes match the header prefix; waiting on the source.
    Matching(usize),
    /// A match attempt failed; held bytes are being re-scanned from index `i`.
    ReplayingFrom(usize),
    /// Header confirmed; the next source byte is the opcode.
    CommandReady,
}

/// Pull-based magic-header scanner.
///
/// Each call to [`next_unit`](Self::next_unit) pulls as many bytes as it needs and returns
/// one [`OutputUnit`]. Partial-match state survives between calls, so the caller can ask
/// for one byte at a time and a polling source can come up empty mid-header.
///
/// Bytes that failed a match are never dropped: the oldest is handed to the application
/// and the rest are re-scanned, so a header that starts inside a failed attempt is still
/// recognized.
pub struct FrameScanner<H> {
    handler: H,
    window: MatchBuffer,
    matched: usize,
    command_ready: bool,
}

impl<H: CommandHandler> FrameScanner<H> {
    /// Create a scanner that dispatches confirmed commands to `handler`.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            window: MatchBuffer::new(),
            matched: 0,
            command_ready: false,
        }
    }

    /// Produce the next application-visible unit.
    ///
    /// `Err` is returned only when the source or a handler's reply channel fails.
    pub fn next_unit<R: ReadByte>(&mut self, source: &mut ByteSource<R>) -> Result<OutputUnit> {
        loop {
            if self.command_ready {
                return self.read_opcode(source);
            }

            let byte = if let Some(held) = self.window.get(self.matched) {
                held
            } else {
                match source.pull()? {
                    Pull::Byte(ABORT_BYTE) => return Ok(self.abort(source)),
                    Pull::Byte(byte) if self.window.is_empty() && byte != MAGIC_HEADER[0] => {
                        return Ok(OutputUnit::Data(byte));
                    }
                    Pull::Byte(byte) => {
                        self.window.push(byte)?;
                        byte
                    }
                    Pull::Pending => return Ok(OutputUnit::SourceExhausted),
                    Pull::Closed => return Ok(self.flush_on_close()),
                }
            };

            if byte == MAGIC_HEADER[self.matched] {
                self.matched += 1;
                if self.matched == HEADER_LEN {
                    trace!("control header confirmed");
                    self.window.clear();
                    self.matched = 0;
                    self.command_ready = true;
                }
                continue;
            }

            // The oldest held byte cannot start a header.
            self.matched = 0;
            if let Some(front) = self.window.pop_front() {
                trace!(
                    byte = front,
                    held = self.window.len(),
                    "header mismatch, replaying"
                );
                return Ok(OutputUnit::Data(front));
            }
        }
    }

    /// Current state of the match machinery.
    pub fn state(&self) -> ScanState {
        if self.command_ready {
            ScanState::CommandReady
        } else if self.window.is_empty() {
            ScanState::Idle
        } else if self.matched < self.window.len() {
            ScanState::ReplayingFrom(self.matched)
        } else {
            ScanState::Matching(self.matched)
        }
    }

    /// Bytes currently held for a possible header match.
    pub fn held(&self) -> &[u8] {
        self.window.as_slice()
    }

    /// Discard all partial-match, replay, and pending-command state.
    pub fn reset(&mut self) {
        self.window.clear();
        self.matched = 0;
        self.command_ready = false;
    }

    /// Borrow the command handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Mutably borrow the command handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consume the scanner and return the command handler.
    pub fn into_handler(self) -> H {
        self.handler
    }

    fn read_opcode<R: ReadByte>(&mut self, source: &mut ByteSource<R>) -> Result<OutputUnit> {
        let byte = match source.pull()? {
            Pull::Byte(ABORT_BYTE) => return Ok(self.abort(source)),
            Pull::Byte(byte) => byte,
            Pull::Pending => return Ok(OutputUnit::SourceExhausted),
            Pull::Closed => {
                debug!("stream closed before opcode, discarding control header");
                self.command_ready = false;
                return Ok(OutputUnit::SourceExhausted);
            }
        };
        self.command_ready = false;

        let opcode = Opcode::from_byte(byte);
        let dispatch = self
            .handler
            .handle(opcode)
            .map_err(|err| FrameError::Reply {
                opcode: opcode.name(),
                source: err,
            })?;

        match dispatch {
            Dispatch::Handled => {}
            Dispatch::Inject(bytes) => {
                trace!(%opcode, len = bytes.len(), "injecting command bytes");
                source.prepend(&bytes);
            }
            Dispatch::Halt => {
                debug!(%opcode, "command requested halt");
                return Ok(self.abort(source));
            }
        }

        debug!(%opcode, code = byte, "handled control command");
        Ok(OutputUnit::CommandHandled(opcode))
    }

    fn flush_on_close(&mut self) -> OutputUnit {
        self.matched = 0;
        match self.window.pop_front() {
            Some(front) => OutputUnit::Data(front),
            None => OutputUnit::SourceExhausted,
        }
    }

    fn abort<R: ReadByte>(&mut self, source: &mut ByteSource<R>) -> OutputUnit {
        debug!(
            held = self.window.len(),
            injected = source.prepended_len(),
            "abort requested"
        );
        self.reset();
        source.clear_prepended();
        OutputUnit::Abort
    }
}

impl<H> std::fmt::Debug for FrameScanner<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScanner")
            .field("held", &self.window.as_slice())
            .field("matched", &self.matched)
            .field("command_ready", &self.command_ready)
            .finish()
    }
}
