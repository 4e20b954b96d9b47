//! Rank movement between two runs of the same mode.
//!
//! The detector has no notion of mode; the caller pairs a run with the
//! previous run of the same mode.

use std::collections::HashMap;

use crate::domain::{RankShift, ScoredRepository};

/// Compares current ranks against a previous run's ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankShiftDetector {
    min_shift: u32,
}

impl Default for RankShiftDetector {
    fn default() -> Self {
        Self { min_shift: 1 }
    }
}

impl RankShiftDetector {
    pub fn new(min_shift: u32) -> Self {
        Self { min_shift }
    }

    pub fn min_shift(&self) -> u32 {
        self.min_shift
    }

    /// Shifts of at least `min_shift` places, in `current` order.
    ///
    /// Repositories absent from `previous` are new entrants and produce no
    /// shift. Rank `0` on either side is treated as no signal.
    pub fn detect(
        &self,
        previous: &[ScoredRepository],
        current: &[ScoredRepository],
    ) -> Vec<RankShift> {
        let previous_rank: HashMap<&str, u32> = previous
            .iter()
            .map(|r| (r.repo_url.as_str(), r.rank))
            .collect();

        current
            .iter()
            .filter_map(|entry| {
                let before = *previous_rank.get(entry.repo_url.as_str())?;
                let now = entry.rank;
                if before == 0 || now == 0 {
                    return None;
                }
                let delta = i64::from(before) - i64::from(now);
                (delta.unsigned_abs() >= u64::from(self.min_shift)).then(|| RankShift {
                    repo_url: entry.repo_url.clone(),
                    previous_rank: before,
                    current_rank: now,
                    delta,
                })
            })
            .collect()
    }
}
