//! Domain models for RepoRank.
//!
//! Canonical definitions for the core entities:
//! - `ClassificationRecord`: one classified change to one repository (input)
//! - `Mode`: the weighting profile a comparison is computed under
//! - `ScoredRepository` / `ComparisonRun`: one ranked snapshot per mode
//! - `RankShift` / `Notification`: movement between consecutive runs

pub mod error;
pub mod mode;
pub mod record;
pub mod run;

pub use error::{ConfigError, RankError, RecordError, Result};
pub use mode::Mode;
pub use record::{
    ChangeType, ClassificationBatch, ClassificationRecord, Confidence, ImpactLevel,
    RawClassification, RejectedRecord,
};
pub use run::{
    ComparisonRun, Direction, Notification, NotificationKind, RankShift, ScoredRepository,
    Severity,
};
