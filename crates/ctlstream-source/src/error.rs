/// Errors that can occur while pulling bytes from a source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// An I/O error occurred while reading from the underlying stream.
    #[error("source I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Readiness polling on the underlying descriptor failed.
    #[error("failed to poll source descriptor {fd}: {source}")]
    Poll { fd: i32, source: std::io::Error },
}

pub type Result<T> = std::result::Result<T, SourceError>;
