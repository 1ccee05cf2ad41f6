//! In-band control command recognition for ordinary byte streams.
//!
//! This is the core value-add layer of ctlstream. A host tool injects a command by sending:
//! - An 8-byte magic header (`F4 F5 F4 F5 F4 F5 00 00`)
//! - A 1-byte opcode
//!
//! Every other byte, including a header prefix that never completes, reaches the
//! application unchanged and in order. A raw `0x03` byte aborts the current read.

pub mod codec;
pub mod error;
pub mod handler;
pub mod match_buffer;
pub mod opcode;
pub mod scanner;

pub use codec::{command_bytes, encode_command, ABORT_BYTE, COMMAND_SIZE, HEADER_LEN, MAGIC_HEADER};
pub use error::{FrameError, Result};
pub use handler::{CommandHandler, Dispatch};
pub use match_buffer::MatchBuffer;
pub use opcode::Opcode;
pub use scanner::{FrameScanner, OutputUnit, ScanState};
