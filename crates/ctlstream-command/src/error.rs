use std::path::PathBuf;

/// Errors that can occur while setting up command dispatch.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The identity file could not be read.
    #[error("failed to read identity file {path}: {source}")]
    ReadIdentity {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The identity file is not valid JSON for a device identity.
    #[error("invalid identity file {path}: {source}")]
    ParseIdentity {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, CommandError>;
