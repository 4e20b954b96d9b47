//! One ranking cycle across every configured mode.
//!
//! [`RankingCycle`] resolves each mode's previous run from a [`RunHistory`],
//! runs the engine, and appends the new run. Modes share no mutable state,
//! so they run concurrently; the report lists them in configured order.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reporank_state::{RunHistory, StoredRun};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::{
    ClassificationBatch, ComparisonRun, Mode, Notification, RankError, Result, Severity,
};
use crate::engine::ComparisonEngine;
use crate::obs;

/// A comparison run together with its persisted identity.
#[derive(Debug, Clone, Serialize)]
pub struct CycleRun {
    pub run_id: Uuid,
    pub digest: String,
    pub run: ComparisonRun,
}

/// Outcome of one ranking cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Number of records in the batch.
    pub records: usize,
    /// One entry per configured mode; empty when the batch was empty.
    pub runs: Vec<CycleRun>,
}

impl CycleReport {
    /// `true` when the cycle was skipped for lack of records.
    pub fn is_skipped(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn total_shifts(&self) -> usize {
        self.runs.iter().map(|r| r.run.rank_shifts.len()).sum()
    }

    pub fn total_notifications(&self) -> usize {
        self.runs.iter().map(|r| r.run.notifications.len()).sum()
    }

    pub fn high_severity_count(&self) -> usize {
        self.notifications()
            .filter(|(_, n)| n.severity == Severity::High)
            .count()
    }

    /// Every notification across modes, tagged with its mode.
    pub fn notifications(&self) -> impl Iterator<Item = (Mode, &Notification)> + '_ {
        self.runs
            .iter()
            .flat_map(|r| r.run.notifications.iter().map(move |n| (r.run.mode, n)))
    }

    pub fn run_for(&self, mode: Mode) -> Option<&ComparisonRun> {
        self.runs.iter().map(|r| &r.run).find(|r| r.mode == mode)
    }
}

/// Drives the engine against a history store.
pub struct RankingCycle {
    engine: Arc<ComparisonEngine>,
    history: Arc<dyn RunHistory>,
}

impl RankingCycle {
    pub fn new(engine: ComparisonEngine, history: Arc<dyn RunHistory>) -> Self {
        Self {
            engine: Arc::new(engine),
            history,
        }
    }

    pub fn engine(&self) -> &ComparisonEngine {
        &self.engine
    }

    /// Run every configured mode over `batch` and persist the results.
    pub async fn run(&self, batch: ClassificationBatch) -> Result<CycleReport> {
        let cycle_id = Uuid::new_v4();
        let span = obs::cycle_span(&cycle_id.to_string());
        self.run_modes(cycle_id, batch).instrument(span).await
    }

    async fn run_modes(&self, cycle_id: Uuid, batch: ClassificationBatch) -> Result<CycleReport> {
        let modes = self.engine.config().modes.clone();
        let records = batch.len();

        if batch.is_empty() {
            tracing::info!(event = "cycle.skipped", reason = "empty batch");
            return Ok(CycleReport {
                cycle_id,
                generated_at: Utc::now(),
                records,
                runs: Vec::new(),
            });
        }

        obs::emit_cycle_started(&cycle_id.to_string(), records, &modes);

        let batch = Arc::new(batch);
        let mut join_set = JoinSet::new();
        for (idx, mode) in modes.iter().copied().enumerate() {
            let engine = Arc::clone(&self.engine);
            let history = Arc::clone(&self.history);
            let batch = Arc::clone(&batch);
            join_set.spawn(
                async move { (idx, run_mode(&engine, history.as_ref(), mode, &batch).await) }
                    .instrument(tracing::Span::current()),
            );
        }

        // Drain every task; the earliest configured mode's failure is returned.
        let mut slots: Vec<Option<CycleRun>> = vec![None; modes.len()];
        let mut failure: Option<(usize, RankError)> = None;
        while let Some(joined) = join_set.join_next().await {
            let (idx, error) = match joined {
                Ok((idx, Ok(run))) => {
                    slots[idx] = Some(run);
                    continue;
                }
                Ok((idx, Err(source))) => (
                    idx,
                    RankError::Mode {
                        mode: modes[idx].to_string(),
                        source: Box::new(source),
                    },
                ),
                Err(e) => (
                    usize::MAX,
                    RankError::Task {
                        mode: "unknown".to_string(),
                        detail: format!("join error: {e}"),
                    },
                ),
            };
            obs::emit_mode_failed(&error);
            if failure.as_ref().map_or(true, |(first, _)| idx < *first) {
                failure = Some((idx, error));
            }
        }
        if let Some((_, error)) = failure {
            return Err(error);
        }

        let runs = modes
            .iter()
            .zip(slots)
            .map(|(mode, slot)| {
                slot.ok_or_else(|| RankError::Task {
                    mode: mode.to_string(),
                    detail: "missing result".to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CycleReport {
            cycle_id,
            generated_at: Utc::now(),
            records,
            runs,
        })
    }
}

async fn run_mode(
    engine: &ComparisonEngine,
    history: &dyn RunHistory,
    mode: Mode,
    batch: &ClassificationBatch,
) -> Result<CycleRun> {
    let previous = history
        .latest(mode.as_str())
        .await?
        .and_then(|stored| decode_previous(mode, stored));

    let run = engine.run(mode, batch, previous.as_ref());

    let payload = serde_json::to_value(&run)?;
    let stored = history
        .append(mode.as_str(), payload)
        .await
        .map_err(|e| {
            obs::emit_history_append_failed(mode, &e);
            RankError::from(e)
        })?;

    Ok(CycleRun {
        run_id: stored.run_id,
        digest: stored.digest,
        run,
    })
}

/// A stored payload that no longer decodes counts as no previous run.
fn decode_previous(mode: Mode, stored: StoredRun) -> Option<ComparisonRun> {
    match serde_json::from_value::<ComparisonRun>(stored.payload) {
        Ok(run) => Some(run),
        Err(e) => {
            obs::emit_previous_run_unreadable(mode, &e);
            None
        }
    }
}
