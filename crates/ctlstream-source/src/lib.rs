//! Byte sources for in-band control scanning.
//!
//! Provides a single-byte pull interface over two kinds of readers:
//! - Blocking readers that wait for the next byte (any `std::io::Read`)
//! - Polling readers that report "nothing ready" instead of waiting (unix file descriptors)
//!
//! This is the lowest layer of ctlstream. The frame scanner is written once against
//! [`ByteSource`], which adds the prepend queue used for injected bytes.

pub mod error;
pub mod pull;
pub mod source;

#[cfg(unix)]
pub mod poll;

pub use error::{Result, SourceError};
pub use pull::{Blocking, Pull, ReadByte, Scripted};
pub use source::ByteSource;

#[cfg(unix)]
pub use poll::Polling;
