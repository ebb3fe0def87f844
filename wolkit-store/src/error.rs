//! Store errors

use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] wolkit_types::Error),

    #[error("Device not found: {0}")]
    NotFound(String),

    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to decode device file {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode device collection: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Storage operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Stored device data is invalid: {0}")]
    Corrupt(String),

    #[error("Device storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Check if this is a storage read/write failure
    pub fn is_persistence(&self) -> bool {
        !matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}
