//! RepoRank State: append-only history of comparison runs
//!
//! This crate is the persistence layer beneath the ranking engine. It stores
//! each comparison run as an opaque JSON payload tagged with its mode, and
//! answers the one question the engine needs on every cycle: "what was the
//! latest run for this mode?"
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: append-only durability and recency lookup per mode.
//!
//! ## Key Components
//!
//! - `RunHistory`: the read/append contract
//! - `StoredRun`: one persisted run with its id, timestamp, and content digest
//! - `JsonlRunHistory`: line-delimited JSON files under a data directory
//! - `MemoryRunHistory`: in-memory fake for tests and dry runs

mod error;
pub mod fakes;
pub mod jsonl;
pub mod storage_traits;

pub use error::StorageError;
pub use fakes::MemoryRunHistory;
pub use jsonl::JsonlRunHistory;
pub use storage_traits::{canonical_digest, RunHistory, StorageResult, StoredRun};

/// Result type for reporank-state operations
pub type Result<T> = std::result::Result<T, StorageError>;
