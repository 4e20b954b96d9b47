//! Notifications for rank shifts.

use crate::domain::{Notification, NotificationKind, RankShift, Severity};

/// Movement of this many places or more is `High` severity.
pub const HIGH_SEVERITY_DELTA: u64 = 2;

/// Turns rank shifts into notifications, one per shift.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationBuilder;

impl NotificationBuilder {
    pub fn build(&self, shifts: &[RankShift]) -> Vec<Notification> {
        shifts.iter().map(Notification::for_shift).collect()
    }
}

impl Notification {
    pub fn for_shift(shift: &RankShift) -> Notification {
        let severity = if shift.delta.unsigned_abs() >= HIGH_SEVERITY_DELTA {
            Severity::High
        } else {
            Severity::Medium
        };
        Notification {
            event_type: NotificationKind::RankingShift,
            repo_url: shift.repo_url.clone(),
            message: format!(
                "Ranking shift: {} moved {} from #{} to #{}",
                shift.repo_url,
                shift.direction(),
                shift.previous_rank,
                shift.current_rank
            ),
            severity,
        }
    }
}
