//! In-memory fake for the history trait
//!
//! `MemoryRunHistory` satisfies the `RunHistory` contract without touching
//! the filesystem. The CLI also uses it for dry runs, seeded from disk.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::storage_traits::*;

/// In-memory run history backed by a `Vec<StoredRun>` in append order.
#[derive(Debug, Default)]
pub struct MemoryRunHistory {
    runs: Mutex<Vec<StoredRun>>,
}

impl MemoryRunHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing set of runs, oldest first.
    pub fn seeded(runs: Vec<StoredRun>) -> Self {
        Self {
            runs: Mutex::new(runs),
        }
    }

    /// Number of runs across all modes.
    pub fn len(&self) -> usize {
        self.runs.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RunHistory for MemoryRunHistory {
    async fn append(&self, mode: &str, payload: serde_json::Value) -> StorageResult<StoredRun> {
        let stored = StoredRun::new(mode, payload)?;
        let mut runs = self.runs.lock().map_err(|_| StorageError::LockPoisoned)?;
        runs.push(stored.clone());
        Ok(stored)
    }

    async fn latest(&self, mode: &str) -> StorageResult<Option<StoredRun>> {
        let runs = self.runs.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(runs.iter().rev().find(|r| r.mode == mode).cloned())
    }

    async fn list(&self, mode: &str, limit: usize) -> StorageResult<Vec<StoredRun>> {
        let runs = self.runs.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(runs
            .iter()
            .rev()
            .filter(|r| r.mode == mode)
            .take(limit)
            .cloned()
            .collect())
    }
}
