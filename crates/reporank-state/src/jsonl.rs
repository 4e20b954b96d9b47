//! Line-delimited JSON history on the local filesystem.
//!
//! Layout under the data directory:
//! - `comparison_runs.jsonl`: one `StoredRun` per line, append order
//! - `notifications.jsonl`: one dispatched notification per line
//!
//! Writes go through a single async mutex so concurrent appends from
//! different modes never interleave within a line.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::error::StorageError;
use crate::storage_traits::*;

const RUNS_LOG: &str = "comparison_runs";
const NOTIFICATIONS_LOG: &str = "notifications";

/// File-backed [`RunHistory`].
pub struct JsonlRunHistory {
    base_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlRunHistory {
    /// Open (and create if needed) a history rooted at `base_dir`.
    pub async fn open(base_dir: impl AsRef<Path>) -> StorageResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|source| StorageError::Io {
                path: base_dir.clone(),
                source,
            })?;
        Ok(Self {
            base_dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Open a history for reading only. Nothing is created on disk; a
    /// missing directory reads as an empty history.
    pub fn open_read_only(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn log_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{name}.jsonl"))
    }

    /// Append one dispatched notification to the notification log.
    pub async fn append_notification(&self, notification: &serde_json::Value) -> StorageResult<()> {
        self.append_line(NOTIFICATIONS_LOG, notification).await
    }

    /// Every run in the log, oldest first, across all modes.
    pub async fn read_all(&self) -> StorageResult<Vec<StoredRun>> {
        let path = self.log_path(RUNS_LOG);
        let rows = self.read_lines(&path).await?;
        rows.into_iter()
            .map(|(line, value)| {
                serde_json::from_value::<StoredRun>(value).map_err(|e| {
                    StorageError::CorruptEntry {
                        path: path.clone(),
                        line,
                        detail: e.to_string(),
                    }
                })
            })
            .collect()
    }

    /// Every notification in the log, oldest first.
    pub async fn read_notifications(&self) -> StorageResult<Vec<serde_json::Value>> {
        let path = self.log_path(NOTIFICATIONS_LOG);
        Ok(self
            .read_lines(&path)
            .await?
            .into_iter()
            .map(|(_, value)| value)
            .collect())
    }

    async fn append_line(&self, name: &str, row: &serde_json::Value) -> StorageResult<()> {
        let path = self.log_path(name);
        let mut line = serde_json::to_string(row)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let io_err = |source| StorageError::Io {
            path: path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(io_err)?;
        file.write_all(line.as_bytes()).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;
        Ok(())
    }

    /// Parse non-blank lines as JSON, tagging each with its 1-based line number.
    async fn read_lines(&self, path: &Path) -> StorageResult<Vec<(usize, serde_json::Value)>> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut rows = Vec::new();
        for (idx, raw) in content.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let value = serde_json::from_str(trimmed).map_err(|e| StorageError::CorruptEntry {
                path: path.to_path_buf(),
                line: idx + 1,
                detail: e.to_string(),
            })?;
            rows.push((idx + 1, value));
        }
        Ok(rows)
    }
}

#[async_trait]
impl RunHistory for JsonlRunHistory {
    #[instrument(skip(self, payload), fields(dir = %self.base_dir.display()))]
    async fn append(&self, mode: &str, payload: serde_json::Value) -> StorageResult<StoredRun> {
        let stored = StoredRun::new(mode, payload)?;
        let row = serde_json::to_value(&stored)?;
        self.append_line(RUNS_LOG, &row).await?;
        debug!(run_id = %stored.run_id, digest = %stored.short_digest(), "run appended");
        Ok(stored)
    }

    async fn latest(&self, mode: &str) -> StorageResult<Option<StoredRun>> {
        Ok(self.read_all().await?.into_iter().rev().find(|r| r.mode == mode))
    }

    async fn list(&self, mode: &str, limit: usize) -> StorageResult<Vec<StoredRun>> {
        Ok(self
            .read_all()
            .await?
            .into_iter()
            .rev()
            .filter(|r| r.mode == mode)
            .take(limit)
            .collect())
    }
}
