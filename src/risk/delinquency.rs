//! Delinquency tracker.
//!
//! A monotonic non-decreasing counter of missed incoming payments.
//! Lock-free so the monitor loop and any observer (status endpoint,
//! recorder) can read it without coordination. External reset is out of
//! scope; the counter only moves forward.

use std::sync::atomic::{AtomicU32, Ordering};

use tracing::warn;

/// Thread-safe monotonic counter of confirmation failures.
#[derive(Debug, Default)]
pub struct DelinquencyTracker {
    missed: AtomicU32,
}

impl DelinquencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failed wait-and-confirm. Returns the new total.
    pub fn record_missed(&self) -> u32 {
        let total = self.missed.fetch_add(1, Ordering::SeqCst) + 1;
        warn!(risk_score = total, "expected payment did not confirm");
        total
    }

    /// Current count. Lock-free read.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.missed.load(Ordering::SeqCst)
    }
}
