//! Process-wide counters for records, runs, shifts and notifications.
//!
//! Increments only log at `trace`. [`Metrics::flush`] reports the totals in
//! one `info` event, typically once per command.

use std::sync::atomic::{AtomicU64, Ordering};

pub static METRICS: Metrics = Metrics::new();

/// Lock-free atomic counters.
pub struct Metrics {
    records_accepted: AtomicU64,
    records_rejected: AtomicU64,
    runs_built: AtomicU64,
    shifts_detected: AtomicU64,
    notifications_built: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            records_accepted: AtomicU64::new(0),
            records_rejected: AtomicU64::new(0),
            runs_built: AtomicU64::new(0),
            shifts_detected: AtomicU64::new(0),
            notifications_built: AtomicU64::new(0),
        }
    }

    pub fn add_records(&self, accepted: u64, rejected: u64) {
        self.records_accepted.fetch_add(accepted, Ordering::Relaxed);
        self.records_rejected.fetch_add(rejected, Ordering::Relaxed);
        tracing::trace!(metric = "records", accepted, rejected, "counter incremented");
    }

    /// Record one built comparison run and what it produced.
    pub fn record_run(&self, shifts: u64, notifications: u64) {
        self.runs_built.fetch_add(1, Ordering::Relaxed);
        self.shifts_detected.fetch_add(shifts, Ordering::Relaxed);
        self.notifications_built
            .fetch_add(notifications, Ordering::Relaxed);
        tracing::trace!(metric = "runs_built", "counter incremented");
    }

    /// Log every counter in one event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            records_accepted = self.records_accepted(),
            records_rejected = self.records_rejected(),
            runs_built = self.runs_built(),
            shifts_detected = self.shifts_detected(),
            notifications_built = self.notifications_built(),
        );
    }

    pub fn records_accepted(&self) -> u64 {
        self.records_accepted.load(Ordering::Relaxed)
    }

    pub fn records_rejected(&self) -> u64 {
        self.records_rejected.load(Ordering::Relaxed)
    }

    pub fn runs_built(&self) -> u64 {
        self.runs_built.load(Ordering::Relaxed)
    }

    pub fn shifts_detected(&self) -> u64 {
        self.shifts_detected.load(Ordering::Relaxed)
    }

    pub fn notifications_built(&self) -> u64 {
        self.notifications_built.load(Ordering::Relaxed)
    }

    /// Zero every counter.
    pub fn reset(&self) {
        self.records_accepted.store(0, Ordering::Relaxed);
        self.records_rejected.store(0, Ordering::Relaxed);
        self.runs_built.store(0, Ordering::Relaxed);
        self.shifts_detected.store(0, Ordering::Relaxed);
        self.notifications_built.store(0, Ordering::Relaxed);
    }
}
