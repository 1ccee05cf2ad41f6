//! In-band control commands embedded in ordinary console byte streams.
//!
//! A host tool sends a magic header and a one-byte opcode inside the same stream that
//! carries application input; ctlstream recognizes the command, runs it, and passes every
//! other byte through to the application in order.
//!
//! # Crate Structure
//!
//! - [`source`]: Blocking and polling byte sources with a prepend queue
//! - [`frame`]: Magic header codec, opcodes, and the frame scanner
//! - [`command`]: Command dispatcher, device identity, reply channel
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//!
//! use ctlstream::command::{DeviceIdentity, Dispatcher};
//! use ctlstream::frame::{command_bytes, FrameScanner, Opcode, OutputUnit};
//! use ctlstream::source::ByteSource;
//!
//! let mut wire = b"x".to_vec();
//! wire.extend_from_slice(&command_bytes(Opcode::Version));
//!
//! let mut scanner = FrameScanner::new(Dispatcher::new(DeviceIdentity::default(), Vec::new()));
//! let mut source = ByteSource::blocking(Cursor::new(wire));
//!
//! assert_eq!(scanner.next_unit(&mut source).unwrap(), OutputUnit::Data(b'x'));
//! assert_eq!(
//!     scanner.next_unit(&mut source).unwrap(),
//!     OutputUnit::CommandHandled(Opcode::Version)
//! );
//! assert_eq!(scanner.into_handler().into_reply(), b"0.0.0\n");
//! ```

/// Re-export source types.
pub mod source {
    pub use ctlstream_source::*;
}

/// Re-export frame types.
pub mod frame {
    pub use ctlstream_frame::*;
}

/// Re-export command types.
pub mod command {
    pub use ctlstream_command::*;
}
