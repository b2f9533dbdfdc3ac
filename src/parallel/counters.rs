//! Shared tallies updated from every worker thread

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::processing::ImageOutcome;

/// Lock-free per-category counters.
///
/// Increments are relaxed; readers must only trust a snapshot taken after
/// every worker has been joined.
#[derive(Debug, Default)]
pub struct Counters {
    total: AtomicU64,
    resized: AtomicU64,
    unchanged: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    /// Images that were resized or left unchanged. Failures are not included.
    pub total: u64,
    pub resized: u64,
    pub unchanged: u64,
    pub failed: u64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one finished image
    pub fn record(&self, outcome: &ImageOutcome) {
        match outcome {
            ImageOutcome::Resized { .. } => {
                self.resized.fetch_add(1, Ordering::Relaxed);
                self.total.fetch_add(1, Ordering::Relaxed);
            }
            ImageOutcome::Unchanged { .. } => {
                self.unchanged.fetch_add(1, Ordering::Relaxed);
                self.total.fetch_add(1, Ordering::Relaxed);
            }
            ImageOutcome::Failed { .. } => {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            total: self.total.load(Ordering::Relaxed),
            resized: self.resized.load(Ordering::Relaxed),
            unchanged: self.unchanged.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
