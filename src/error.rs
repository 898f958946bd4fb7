use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Failure reported by the remote document collaborator.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("edit {index} rejected: {reason}")]
    Rejected { index: usize, reason: String },

    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("remote document error: {0}")]
    Remote(#[from] RemoteError),
}
