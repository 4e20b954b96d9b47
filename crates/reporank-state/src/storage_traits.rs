//! Storage trait definitions for RepoRank
//!
//! `RunHistory` is the only storage abstraction the engine depends on:
//! append a run for a mode, and read back the most recent run(s) for a mode.
//!
//! The trait is async and backend-agnostic. An in-memory fake is provided
//! in the `fakes` module and a file-backed implementation in `jsonl`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// One persisted comparison run.
///
/// The payload is opaque to this layer; the engine owns its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRun {
    /// Unique id assigned at append time
    pub run_id: Uuid,
    /// Mode label the run was computed for (e.g. "executive")
    pub mode: String,
    /// Append timestamp
    pub recorded_at: DateTime<Utc>,
    /// SHA-256 hex of the canonical JSON payload
    pub digest: String,
    /// The comparison run itself
    pub payload: serde_json::Value,
}

impl StoredRun {
    /// Stamp a payload with a fresh id, the current time, and its digest.
    pub fn new(mode: &str, payload: serde_json::Value) -> StorageResult<Self> {
        if mode.trim().is_empty() {
            return Err(StorageError::EmptyMode);
        }
        let digest = canonical_digest(&payload)?;
        Ok(Self {
            run_id: Uuid::new_v4(),
            mode: mode.to_string(),
            recorded_at: Utc::now(),
            digest,
            payload,
        })
    }

    /// Short form of the digest (first 12 hex chars).
    pub fn short_digest(&self) -> &str {
        &self.digest[..12.min(self.digest.len())]
    }
}

/// SHA-256 hex digest of a JSON value with object keys sorted.
///
/// Two payloads that differ only in key order hash identically.
pub fn canonical_digest(value: &serde_json::Value) -> StorageResult<String> {
    let encoded = serde_json::to_vec(&canonicalize(value.clone()))?;
    let mut hasher = Sha256::new();
    hasher.update(&encoded);
    Ok(hex::encode(hasher.finalize()))
}

fn canonicalize(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<(String, serde_json::Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(canonicalize).collect())
        }
        other => other,
    }
}

/// Append-only history of comparison runs.
///
/// Guarantees:
/// - Runs are never updated or deleted once appended.
/// - `latest(mode)` returns the most recently appended run for `mode`,
///   ignoring runs of every other mode.
/// - `list(mode, limit)` returns newest first.
#[async_trait]
pub trait RunHistory: Send + Sync {
    /// Persist a run payload for `mode`, returning the stored record.
    async fn append(&self, mode: &str, payload: serde_json::Value) -> StorageResult<StoredRun>;

    /// Most recent run for `mode`, or `None` if the mode has never run.
    async fn latest(&self, mode: &str) -> StorageResult<Option<StoredRun>>;

    /// Up to `limit` runs for `mode`, newest first.
    async fn list(&self, mode: &str, limit: usize) -> StorageResult<Vec<StoredRun>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn digest_ignores_key_order() {
        let a = json!({"mode": "executive", "results": [{"rank": 1, "repo_url": "a"}]});
        let b = json!({"results": [{"repo_url": "a", "rank": 1}], "mode": "executive"});
        assert_eq!(canonical_digest(&a).unwrap(), canonical_digest(&b).unwrap());
    }

    #[test]
    fn digest_changes_with_content() {
        let a = json!({"mode": "executive"});
        let b = json!({"mode": "security"});
        assert_ne!(canonical_digest(&a).unwrap(), canonical_digest(&b).unwrap());
    }

    #[test]
    fn stored_run_rejects_empty_mode() {
        let err = StoredRun::new("  ", json!({})).unwrap_err();
        assert!(matches!(err, StorageError::EmptyMode));
    }

    #[test]
    fn stored_run_short_digest_is_prefix() {
        let run = StoredRun::new("technical", json!({"results": []})).unwrap();
        assert_eq!(run.digest.len(), 64);
        assert_eq!(run.short_digest().len(), 12);
        assert!(run.digest.starts_with(run.short_digest()));
    }
}
