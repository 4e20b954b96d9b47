//! Structured observability hooks for the ranking cycle.
//!
//! This module provides:
//! - Cycle-scoped tracing spans via `CycleSpan` RAII guard
//! - Emission functions for key events: cycle start, record rejection,
//!   comparison built, rank shift, history failures
//!
//! Events carry an `event` field so they can be filtered in JSON log output.

use tracing::{info, warn};

use crate::domain::{Mode, RankShift};

/// RAII guard that enters a cycle-scoped tracing span.
///
/// # Example
///
/// ```ignore
/// let _span = CycleSpan::enter("6f1c...");
/// // every event below is tagged with cycle_id
/// ```
pub struct CycleSpan {
    _span: tracing::span::EnteredSpan,
}

impl CycleSpan {
    pub fn enter(cycle_id: &str) -> Self {
        Self {
            _span: cycle_span(cycle_id).entered(),
        }
    }
}

/// The cycle span itself, for instrumenting futures.
///
/// An entered span must not be held across `.await`; async code attaches
/// this with `tracing::Instrument` instead of using [`CycleSpan`].
pub fn cycle_span(cycle_id: &str) -> tracing::Span {
    tracing::info_span!("reporank.cycle", cycle_id = %cycle_id)
}

pub fn emit_cycle_started(cycle_id: &str, records: usize, modes: &[Mode]) {
    let modes: Vec<&str> = modes.iter().map(Mode::as_str).collect();
    info!(
        event = "cycle.started",
        cycle_id = %cycle_id,
        records = records,
        modes = %modes.join(","),
    );
}

/// Emit event: a record was rejected at the input boundary (warning level).
pub fn emit_record_rejected(index: usize, repo_url: Option<&str>, reason: &str) {
    warn!(
        event = "record.rejected",
        index = index,
        repo_url = repo_url.unwrap_or("<missing>"),
        reason = %reason,
    );
}

pub fn emit_comparison_built(mode: Mode, repos: usize, shifts: usize, notifications: usize) {
    info!(
        event = "comparison.built",
        mode = %mode,
        repos = repos,
        shifts = shifts,
        notifications = notifications,
    );
}

pub fn emit_rank_shift(mode: Mode, shift: &RankShift) {
    info!(
        event = "rank.shift",
        mode = %mode,
        repo_url = %shift.repo_url,
        from = shift.previous_rank,
        to = shift.current_rank,
        delta = shift.delta,
    );
}

/// Emit event: the stored previous run could not be decoded (warning level).
pub fn emit_previous_run_unreadable(mode: Mode, error: &dyn std::fmt::Display) {
    warn!(event = "history.previous_unreadable", mode = %mode, error = %error);
}

/// Emit event: appending a run to history failed (warning level).
pub fn emit_history_append_failed(mode: Mode, error: &dyn std::fmt::Display) {
    warn!(event = "history.append_failed", mode = %mode, error = %error);
}

/// Emit event: one mode of a cycle failed (warning level).
pub fn emit_mode_failed(error: &dyn std::fmt::Display) {
    warn!(event = "cycle.mode_failed", error = %error);
}
