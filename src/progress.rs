//! Module: Progress
//! But: Progress observers, decoupled from the derivation loop.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default report interval, in processed pairs.
pub const PROGRESS_INTERVAL: u64 = 50;

/// Notified once per processed (seed, index) pair, whatever its outcome.
pub trait ProgressObserver: Send + Sync {
    fn on_processed(&self);

    /// Called once when every pair has been processed.
    fn finish(&self) {}
}

/// Observer that ignores everything.
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_processed(&self) {}
}

/// Prints `\rProcessed n/total` every `interval` pairs on stdout.
pub struct ProgressReporter {
    processed: AtomicU64,
    total: u64,
    interval: u64,
}

impl ProgressReporter {
    pub fn new(total: u64) -> Self {
        Self::with_interval(total, PROGRESS_INTERVAL)
    }

    pub fn with_interval(total: u64, interval: u64) -> Self {
        Self {
            processed: AtomicU64::new(0),
            total,
            interval: interval.max(1),
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Counts one pair; returns the new count when a report is due.
    fn advance(&self) -> Option<u64> {
        let count = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        count.is_multiple_of(self.interval).then_some(count)
    }

    fn print(&self, count: u64, end: &str) {
        let mut out = std::io::stdout().lock();
        // Progress is cosmetic; a closed stdout must not stop the sweep.
        let _ = write!(out, "\rProcessed {count}/{}{end}", self.total);
        let _ = out.flush();
    }
}

impl ProgressObserver for ProgressReporter {
    fn on_processed(&self) {
        if let Some(count) = self.advance() {
            self.print(count, "");
        }
    }

    fn finish(&self) {
        self.print(self.processed(), "\n");
    }
}
