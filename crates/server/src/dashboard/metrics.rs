//! Lock-free driver counters.
//!
//! Drivers bump these with atomic adds -- no locks, no allocation on the hot
//! path. The dashboard server reads them at its own pace; a slow reader
//! costs the drivers nothing.

use std::sync::atomic::{AtomicU64, Ordering::Relaxed};
use std::time::Instant;

use serde::Serialize;

pub struct Metrics {
    jobs_finished: AtomicU64,
    steps_walked: AtomicU64,
    replans: AtomicU64,
    started_at: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            jobs_finished: AtomicU64::new(0),
            steps_walked: AtomicU64::new(0),
            replans: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    pub fn job_finished(&self) {
        self.jobs_finished.fetch_add(1, Relaxed);
    }

    pub fn step_walked(&self) {
        self.steps_walked.fetch_add(1, Relaxed);
    }

    pub fn replan(&self) {
        self.replans.fetch_add(1, Relaxed);
    }

    /// Read every counter into a serializable snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.started_at.elapsed().as_secs_f64(),
            jobs_finished: self.jobs_finished.load(Relaxed),
            steps_walked: self.steps_walked.load(Relaxed),
            replans: self.replans.load(Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the driver counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: f64,
    pub jobs_finished: u64,
    pub steps_walked: u64,
    pub replans: u64,
}
