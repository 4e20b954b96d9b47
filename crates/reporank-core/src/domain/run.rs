//! Comparison runs and the records derived from them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::mode::Mode;
use crate::weights::CriteriaWeights;

/// One repository's score within one comparison run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRepository {
    pub repo_url: String,
    /// Weighted score, conventionally on a 0 to 10 scale.
    pub score: f64,
    /// Calibrated confidence in `[0, 1]`.
    pub confidence: f64,
    pub sample_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_ratio: Option<f64>,
    /// 1-based position after sorting. `0` marks an unranked entry.
    #[serde(default, deserialize_with = "lenient_rank")]
    pub rank: u32,
}

/// Stored ranks that are not positive integers decode as `0` (unranked),
/// so one bad entry does not invalidate the rest of its run.
fn lenient_rank<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_u64)
        .and_then(|rank| u32::try_from(rank).ok())
        .unwrap_or(0))
}

/// One complete ranked snapshot of all repositories for one mode.
///
/// # Invariants
///
/// `results` holds one entry per distinct repository in `repositories`,
/// sorted by score descending, with ranks `1..=N` and no gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRun {
    pub mode: Mode,
    pub criteria_weights: CriteriaWeights,
    /// Repositories in order of first appearance in the input batch.
    pub repositories: Vec<String>,
    pub results: Vec<ScoredRepository>,
    #[serde(default)]
    pub rank_shifts: Vec<RankShift>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

impl ComparisonRun {
    /// Attach rank shifts and their notifications.
    pub fn with_shifts(mut self, shifts: Vec<RankShift>, notifications: Vec<Notification>) -> Self {
        self.rank_shifts = shifts;
        self.notifications = notifications;
        self
    }

    /// The rank-1 entry, if any repository was scored.
    pub fn leader(&self) -> Option<&ScoredRepository> {
        self.results.first()
    }

    pub fn rank_of(&self, repo_url: &str) -> Option<u32> {
        self.results
            .iter()
            .find(|r| r.repo_url == repo_url)
            .map(|r| r.rank)
    }
}

/// Change in one repository's rank between two consecutive runs of a mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankShift {
    pub repo_url: String,
    pub previous_rank: u32,
    pub current_rank: u32,
    /// `previous_rank - current_rank`; positive means closer to rank 1.
    pub delta: i64,
}

impl RankShift {
    pub fn direction(&self) -> Direction {
        if self.delta > 0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

/// Direction of a rank movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    RankingShift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Medium => f.write_str("medium"),
            Severity::High => f.write_str("high"),
        }
    }
}

/// Human-readable, severity-tagged notice about a rank shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub event_type: NotificationKind,
    pub repo_url: String,
    pub message: String,
    pub severity: Severity,
}
