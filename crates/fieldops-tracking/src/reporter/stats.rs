//! Reporter counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::cycle::CycleOutcome;

/// Running cycle counters.
#[derive(Debug, Default)]
pub struct ReporterStats {
    /// Cycles that ran (including skipped ones).
    pub cycles: AtomicU64,
    /// Cycles that wrote a fix.
    pub reported: AtomicU64,
    /// Cycles that failed to acquire a fix.
    pub acquisition_failures: AtomicU64,
    /// Cycles whose store write failed.
    pub write_failures: AtomicU64,
    /// Cycles skipped for lack of an identity.
    pub skipped: AtomicU64,
}

impl ReporterStats {
    /// Count one finished cycle.
    pub fn record(&self, outcome: &CycleOutcome) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            CycleOutcome::Skipped => &self.skipped,
            CycleOutcome::Reported(_) => &self.reported,
            CycleOutcome::AcquisitionFailed(_) => &self.acquisition_failures,
            CycleOutcome::WriteFailed { .. } => &self.write_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            reported: self.reported.load(Ordering::Relaxed),
            acquisition_failures: self.acquisition_failures.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

/// Serializable counter snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Cycles that ran.
    pub cycles: u64,
    /// Cycles that wrote a fix.
    pub reported: u64,
    /// Cycles that failed to acquire a fix.
    pub acquisition_failures: u64,
    /// Cycles whose store write failed.
    pub write_failures: u64,
    /// Cycles skipped for lack of an identity.
    pub skipped: u64,
}
