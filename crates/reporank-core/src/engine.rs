//! The per-mode pipeline: build → detect → notify.
//!
//! [`ComparisonEngine`] is pure. It never reads history itself; the caller
//! passes the previous run of the same mode, or `None` on the first run.

use crate::comparison::ComparisonRunBuilder;
use crate::config::EngineConfig;
use crate::domain::{ClassificationBatch, ComparisonRun, Mode};
use crate::metrics::METRICS;
use crate::notification::NotificationBuilder;
use crate::obs;
use crate::rank_shift::RankShiftDetector;
use crate::scoring::ScoreCalculator;

#[derive(Debug, Clone)]
pub struct ComparisonEngine {
    config: EngineConfig,
    builder: ComparisonRunBuilder,
    detector: RankShiftDetector,
}

impl Default for ComparisonEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ComparisonEngine {
    pub fn new(config: EngineConfig) -> Self {
        let builder = ComparisonRunBuilder::new(ScoreCalculator::new(config.weights.clone()));
        let detector = RankShiftDetector::new(config.min_shift);
        Self {
            config,
            builder,
            detector,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ranked run for `mode` without rank shifts.
    pub fn build(&self, mode: Mode, batch: &ClassificationBatch) -> ComparisonRun {
        self.builder.build(mode, batch)
    }

    /// Full pipeline for one mode.
    ///
    /// `previous` must be the most recent earlier run of the same mode.
    pub fn run(
        &self,
        mode: Mode,
        batch: &ClassificationBatch,
        previous: Option<&ComparisonRun>,
    ) -> ComparisonRun {
        let current = self.builder.build(mode, batch);

        let shifts = match previous {
            Some(prev) => self.detector.detect(&prev.results, &current.results),
            None => Vec::new(),
        };
        for shift in &shifts {
            obs::emit_rank_shift(mode, shift);
        }
        let notifications = NotificationBuilder.build(&shifts);

        METRICS.record_run(shifts.len() as u64, notifications.len() as u64);
        obs::emit_comparison_built(
            mode,
            current.results.len(),
            shifts.len(),
            notifications.len(),
        );

        current.with_shifts(shifts, notifications)
    }
}
