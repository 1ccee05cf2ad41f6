//! Command dispatch for in-band control streams.
//!
//! Maps opcodes recognized by [`ctlstream_frame::FrameScanner`] to their handlers. Query
//! commands write a reply line; `reset` and `run-main` also inject a textual command back
//! into the data stream.

pub mod dispatcher;
pub mod error;
pub mod identity;
pub mod reply;

pub use dispatcher::{AbortPolicy, Dispatcher, DispatcherConfig, ACK_FAIL, ACK_OK};
pub use error::{CommandError, Result};
pub use identity::DeviceIdentity;
pub use reply::ReplyChannel;
