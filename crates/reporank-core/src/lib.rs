//! RepoRank Core Library
//!
//! Scores classified repository changes, ranks repositories per mode, and
//! detects rank movement between consecutive runs of the same mode.
//!
//! ## Pipeline
//!
//! ```text
//! ClassificationBatch ─▶ ComparisonRunBuilder (ScoreCalculator per repo)
//!                     ─▶ RankShiftDetector (vs. previous run of the mode)
//!                     ─▶ NotificationBuilder
//!                     ─▶ ComparisonRun (with shifts + notifications)
//! ```
//!
//! Everything up to the finished `ComparisonRun` is pure; [`RankingCycle`]
//! adds the read/append against a [`reporank_state::RunHistory`].

pub mod comparison;
pub mod config;
pub mod cycle;
pub mod domain;
pub mod engine;
pub mod metrics;
pub mod notification;
pub mod obs;
pub mod rank_shift;
pub mod scoring;
pub mod telemetry;
pub mod weights;

pub use comparison::{partition_by_repo, ComparisonRunBuilder};
pub use config::{
    parse_modes, parse_monitored_repos, parse_owner_repo, repo_key, EngineConfig,
};
pub use cycle::{CycleReport, CycleRun, RankingCycle};
pub use domain::{
    ChangeType, ClassificationBatch, ClassificationRecord, ComparisonRun, Confidence, ConfigError,
    Direction, ImpactLevel, Mode, Notification, NotificationKind, RankError, RankShift,
    RawClassification, RecordError, RejectedRecord, Result, ScoredRepository, Severity,
};
pub use engine::ComparisonEngine;
pub use notification::{NotificationBuilder, HIGH_SEVERITY_DELTA};
pub use rank_shift::RankShiftDetector;
pub use scoring::{calibrate_confidence, round3, RepoScore, ScoreCalculator, FULL_SAMPLE_SIZE};
pub use weights::{CriteriaWeights, WeightTable};

pub use metrics::METRICS;
pub use obs::{
    cycle_span, emit_comparison_built, emit_cycle_started, emit_history_append_failed,
    emit_mode_failed, emit_previous_run_unreadable, emit_rank_shift, emit_record_rejected,
    CycleSpan,
};
pub use telemetry::init_tracing;

/// RepoRank version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
