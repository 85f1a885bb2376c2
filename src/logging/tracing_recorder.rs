//! Tracing-based Cycle Recorder
//!
//! Emits structured logs for reconciliation cycles that any tracing
//! subscriber can capture. Zero additional dependencies.

use super::recorder::{CycleRecord, CycleRecorder, RecordError};
use async_trait::async_trait;
use tracing::info;

/// Recorder that emits structured tracing logs
pub struct TracingRecorder;

impl TracingRecorder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CycleRecorder for TracingRecorder {
    async fn append(&self, record: &CycleRecord) -> Result<(), RecordError> {
        info!(
            target: "cycles",
            formatted_time = %record.formatted_time,
            estimated_price = %record.estimated_price,
            expected_dollar_amount = %record.expected_dollar_amount,
            stable_receiver_dollar_amount = %record.stable_receiver_dollar_amount,
            payment_made = record.payment_made,
            risk_score = record.risk_score,
            "Cycle recorded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn append_does_not_error() {
        let recorder = TracingRecorder::new();
        let record = CycleRecord::new(Utc::now(), dec!(64000.00), dec!(50), dec!(50.001), true, 0);
        recorder.append(&record).await.unwrap();
    }
}
