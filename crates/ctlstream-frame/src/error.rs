use ctlstream_source::SourceError;

/// Errors that can occur while scanning a byte stream.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The byte source failed.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// A command handler failed to write its reply.
    #[error("reply channel error while handling {opcode}: {source}")]
    Reply {
        opcode: &'static str,
        source: std::io::Error,
    },

    /// A push would exceed the match buffer capacity.
    #[error("match buffer full (capacity {capacity})")]
    MatchBufferFull { capacity: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
