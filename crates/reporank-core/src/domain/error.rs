//! Domain-level error taxonomy for RepoRank.
//!
//! Scoring itself never fails. The errors here cover the input boundary,
//! configuration, and the I/O around a ranking cycle.

use reporank_state::StorageError;

/// A classification record rejected at construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("repo_url is missing or empty")]
    MissingRepoUrl,

    #[error("confidence {value} is outside [0, 1]")]
    ConfidenceOutOfRange { value: f64 },

    #[error("confidence is not a finite number")]
    ConfidenceNotFinite,

    #[error("malformed record: {0}")]
    Malformed(String),
}

/// Invalid configuration supplied by the operator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown mode: {label}")]
    UnknownMode { label: String },

    #[error("invalid GitHub repo URL(s): {}", urls.join(", "))]
    InvalidRepoUrls { urls: Vec<String> },

    #[error("weight {component} for mode {mode} must be a finite, non-negative number")]
    InvalidWeight { mode: String, component: &'static str },

    #[error("invalid weight table: {0}")]
    InvalidWeightTable(String),

    #[error("min_shift must be at least 1")]
    ZeroMinShift,

    #[error("at least one mode must be configured")]
    NoModes,
}

/// RepoRank errors.
#[derive(Debug, thiserror::Error)]
pub enum RankError {
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("ranking task failed for mode {mode}: {detail}")]
    Task { mode: String, detail: String },

    #[error("mode {mode} failed: {source}")]
    Mode {
        mode: String,
        #[source]
        source: Box<RankError>,
    },
}

/// Result type for RepoRank operations.
pub type Result<T> = std::result::Result<T, RankError>;
