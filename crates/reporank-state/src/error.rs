//! Error types for reporank-state

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the history persistence layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem error while reading or appending a log
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// A log line that is not a valid stored run
    #[error("Corrupt entry in {path} at line {line}: {detail}")]
    CorruptEntry {
        path: PathBuf,
        line: usize,
        detail: String,
    },

    /// Mode label must not be empty
    #[error("mode label must not be empty")]
    EmptyMode,

    /// Internal lock was poisoned by a panicking writer
    #[error("history lock poisoned")]
    LockPoisoned,
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
