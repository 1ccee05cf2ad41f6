use std::io::Write;

use bytes::Bytes;
use ctlstream_frame::{CommandHandler, Dispatch, Opcode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::identity::DeviceIdentity;
use crate::reply::ReplyChannel;

/// Acknowledgement for commands that were accepted.
pub const ACK_OK: &str = "OK";

/// Acknowledgement for a command-level abort under [`AbortPolicy::Report`].
pub const ACK_FAIL: &str = "FAIL";

/// How the `abort` opcode (not the raw abort byte) is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbortPolicy {
    /// Reply `FAIL` and keep scanning.
    #[default]
    Report,
    /// Reply nothing and stop the stream like the raw abort byte.
    Halt,
}

/// Dispatcher behavior knobs.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Treatment of the `abort` opcode. Default: report.
    pub abort_policy: AbortPolicy,
    /// Bytes injected by `reset`. Default: `reset()\n`.
    pub reset_text: Bytes,
    /// Bytes injected by `run-main`. Default: `run()\n`.
    pub run_text: Bytes,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            abort_policy: AbortPolicy::Report,
            reset_text: Bytes::from_static(b"reset()\n"),
            run_text: Bytes::from_static(b"run()\n"),
        }
    }
}

/// Opcode table: runs each control command against one reply channel.
pub struct Dispatcher<W> {
    identity: DeviceIdentity,
    config: DispatcherConfig,
    reply: ReplyChannel<W>,
    executing: bool,
}

impl<W: Write> Dispatcher<W> {
    /// Create a dispatcher with default configuration.
    pub fn new(identity: DeviceIdentity, reply: W) -> Self {
        Self::with_config(identity, DispatcherConfig::default(), reply)
    }

    /// Create a dispatcher with explicit configuration.
    pub fn with_config(identity: DeviceIdentity, config: DispatcherConfig, reply: W) -> Self {
        Self {
            identity,
            config,
            reply: ReplyChannel::new(reply),
            executing: false,
        }
    }

    /// Run one command. Replies are complete and flushed before this returns.
    pub fn dispatch(&mut self, opcode: Opcode) -> std::io::Result<Dispatch> {
        match opcode {
            Opcode::Version => self.reply.reply_line(&self.identity.version)?,
            Opcode::Platform => self.reply.reply_line(&self.identity.platform)?,
            Opcode::Board => self.reply.reply_line(&self.identity.board)?,
            Opcode::Alias => self.reply.reply_line(&self.identity.alias)?,
            Opcode::SerialNumber => match &self.identity.serial {
                Some(serial) => self.reply.reply_line(serial)?,
                None => debug!("no hardware serial available, not replying"),
            },
            Opcode::IsExecuting => {
                let flag = if self.executing { "T" } else { "F" };
                self.reply.reply_line(flag)?;
            }
            Opcode::Reset => {
                self.reply.reply_line(ACK_OK)?;
                return Ok(Dispatch::Inject(self.config.reset_text.clone()));
            }
            Opcode::RunMain => {
                self.reply.reply_line(ACK_OK)?;
                return Ok(Dispatch::Inject(self.config.run_text.clone()));
            }
            Opcode::Abort => match self.config.abort_policy {
                AbortPolicy::Report => self.reply.reply_line(ACK_FAIL)?,
                AbortPolicy::Halt => return Ok(Dispatch::Halt),
            },
            Opcode::Unknown(byte) => debug!(code = byte, "ignoring unknown opcode"),
        }
        Ok(Dispatch::Handled)
    }

    /// Record whether the application is running a program.
    pub fn set_executing(&mut self, executing: bool) {
        self.executing = executing;
    }

    /// Whether `is-executing` currently reports `T`.
    pub fn is_executing(&self) -> bool {
        self.executing
    }

    /// Strings reported by the query commands.
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Active dispatcher configuration.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Consume the dispatcher and return the reply sink.
    pub fn into_reply(self) -> W {
        self.reply.into_inner()
    }
}

impl<W: Write> CommandHandler for Dispatcher<W> {
    fn handle(&mut self, opcode: Opcode) -> std::io::Result<Dispatch> {
        self.dispatch(opcode)
    }
}

impl<W> std::fmt::Debug for Dispatcher<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("identity", &self.identity)
            .field("config", &self.config)
            .field("executing", &self.executing)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, ErrorKind};

    use ctlstream_frame::{command_bytes, FrameScanner, OutputUnit};
    use ctlstream_source::ByteSource;

    use super::*;

    fn dispatcher() -> Dispatcher<Vec<u8>> {
        let identity = DeviceIdentity {
            platform: "rp2040".to_string(),
            board: "pico".to_string(),
            ..DeviceIdentity::default()
        };
        Dispatcher::new(identity, Vec::new())
    }

    fn reply_for(opcode: Opcode) -> (Dispatch, String) {
        let mut d = dispatcher();
        let result = d.dispatch(opcode).unwrap();
        (result, String::from_utf8(d.into_reply()).unwrap())
    }

    #[test]
    fn query_commands_reply_one_line() {
        assert_eq!(
            reply_for(Opcode::Version),
            (Dispatch::Handled, "0.0.0\n".to_string())
        );
        assert_eq!(
            reply_for(Opcode::Platform),
            (Dispatch::Handled, "rp2040\n".to_string())
        );
        assert_eq!(
            reply_for(Opcode::Board),
            (Dispatch::Handled, "pico\n".to_string())
        );
        assert_eq!(
            reply_for(Opcode::Alias),
            (Dispatch::Handled, "MyPico\n".to_string())
        );
        assert_eq!(
            reply_for(Opcode::IsExecuting),
            (Dispatch::Handled, "F\n".to_string())
        );
    }

    #[test]
    fn is_executing_tracks_flag() {
        let mut d = dispatcher();
        d.set_executing(true);
        assert!(d.is_executing());
        d.dispatch(Opcode::IsExecuting).unwrap();
        d.set_executing(false);
        d.dispatch(Opcode::IsExecuting).unwrap();
        assert_eq!(d.into_reply(), b"T\nF\n");
    }

    #[test]
    fn serial_is_silent_without_identifier() {
        assert_eq!(
            reply_for(Opcode::SerialNumber),
            (Dispatch::Handled, String::new())
        );

        let identity = DeviceIdentity {
            serial: Some("E6614C311B7A5B2F".to_string()),
            ..DeviceIdentity::default()
        };
        let mut d = Dispatcher::new(identity, Vec::new());
        assert_eq!(d.identity().serial.as_deref(), Some("E6614C311B7A5B2F"));
        d.dispatch(Opcode::SerialNumber).unwrap();
        assert_eq!(d.into_reply(), b"E6614C311B7A5B2F\n");
    }

    #[test]
    fn reset_and_run_main_acknowledge_and_inject() {
        assert_eq!(
            reply_for(Opcode::Reset),
            (
                Dispatch::Inject(Bytes::from_static(b"reset()\n")),
                "OK\n".to_string()
            )
        );
        assert_eq!(
            reply_for(Opcode::RunMain),
            (
                Dispatch::Inject(Bytes::from_static(b"run()\n")),
                "OK\n".to_string()
            )
        );
    }

    #[test]
    fn custom_injection_text() {
        let config = DispatcherConfig {
            reset_text: Bytes::from_static(b"machine.reset()\r\n"),
            ..DispatcherConfig::default()
        };
        let mut d = Dispatcher::with_config(DeviceIdentity::default(), config, Vec::new());
        assert_eq!(
            d.dispatch(Opcode::Reset).unwrap(),
            Dispatch::Inject(Bytes::from_static(b"machine.reset()\r\n"))
        );
    }

    #[test]
    fn abort_opcode_reports_failure_by_default() {
        assert_eq!(
            reply_for(Opcode::Abort),
            (Dispatch::Handled, "FAIL\n".to_string())
        );
    }

    #[test]
    fn abort_opcode_halts_under_halt_policy() {
        let config = DispatcherConfig {
            abort_policy: AbortPolicy::Halt,
            ..DispatcherConfig::default()
        };
        let mut d = Dispatcher::with_config(DeviceIdentity::default(), config, Vec::new());
        assert_eq!(d.config().abort_policy, AbortPolicy::Halt);
        assert_eq!(d.dispatch(Opcode::Abort).unwrap(), Dispatch::Halt);
        assert!(d.into_reply().is_empty());
    }

    #[test]
    fn unknown_opcode_is_ignored() {
        assert_eq!(
            reply_for(Opcode::Unknown(0xEE)),
            (Dispatch::Handled, String::new())
        );
    }

    #[test]
    fn write_failure_propagates() {
        let mut d = Dispatcher::new(DeviceIdentity::default(), FailingWriter);
        let err = d.dispatch(Opcode::Version).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BrokenPipe);
    }

    #[test]
    fn abort_policy_serde_names() {
        assert_eq!(
            serde_json::to_string(&AbortPolicy::Halt).unwrap(),
            "\"halt\""
        );
        let policy: AbortPolicy = serde_json::from_str("\"report\"").unwrap();
        assert_eq!(policy, AbortPolicy::Report);
    }

    #[test]
    fn drives_scanner_end_to_end() {
        let mut wire = b"1+1\n".to_vec();
        wire.extend_from_slice(&command_bytes(Opcode::Version));
        wire.extend_from_slice(&command_bytes(Opcode::Reset));

        let mut scanner = FrameScanner::new(dispatcher());
        let mut source = ByteSource::blocking(Cursor::new(wire));

        let mut app = Vec::new();
        loop {
            match scanner.next_unit(&mut source).unwrap() {
                OutputUnit::Data(byte) => app.push(byte),
                OutputUnit::CommandHandled(_) => {}
                OutputUnit::Abort => panic!("unexpected abort"),
                OutputUnit::SourceExhausted => break,
            }
        }

        assert_eq!(app, b"1+1\nreset()\n");
        assert_eq!(scanner.into_handler().into_reply(), b"0.0.0\nOK\n");
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
