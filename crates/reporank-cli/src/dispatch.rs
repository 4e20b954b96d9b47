//! Console dispatch of rank-shift notifications.
//!
//! Each notification is logged (warn for `high`, info for `medium`) and,
//! outside dry runs, appended to the notification log next to the run history.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reporank_core::{CycleReport, Mode, Notification, Severity};
use reporank_state::JsonlRunHistory;
use serde::Serialize;
use tracing::{info, warn};

/// One line of `notifications.jsonl`.
#[derive(Debug, Serialize)]
struct DispatchedNotification<'a> {
    mode: Mode,
    dispatched_at: DateTime<Utc>,
    #[serde(flatten)]
    notification: &'a Notification,
}

/// Dispatch every notification in `report`. Returns how many were sent.
pub async fn dispatch(report: &CycleReport, log: Option<&JsonlRunHistory>) -> Result<usize> {
    let mut sent = 0;
    for (mode, notification) in report.notifications() {
        match notification.severity {
            Severity::High => warn!(
                event = "notification.dispatched",
                mode = %mode,
                repo_url = %notification.repo_url,
                severity = "high",
                "{}",
                notification.message
            ),
            Severity::Medium => info!(
                event = "notification.dispatched",
                mode = %mode,
                repo_url = %notification.repo_url,
                severity = "medium",
                "{}",
                notification.message
            ),
        }

        if let Some(log) = log {
            let row = serde_json::to_value(DispatchedNotification {
                mode,
                dispatched_at: Utc::now(),
                notification,
            })?;
            log.append_notification(&row)
                .await
                .context("Failed to append to notification log")?;
        }
        sent += 1;
    }
    Ok(sent)
}
