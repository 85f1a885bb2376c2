//! Cycle Recording System
//!
//! Every reconciliation cycle appends one structured record describing
//! what the engine saw and did. Recording is strictly best-effort: a
//! failed write must never abort the cycle that produced it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Error type for cycle recording operations
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// One reconciliation cycle's outcome, as persisted.
///
/// Field names are the wire format of the append-only snapshot log; they
/// must not change without migrating downstream readers.
#[derive(Debug, Clone, Serialize)]
pub struct CycleRecord {
    pub formatted_time: String,
    pub estimated_price: Decimal,
    pub expected_dollar_amount: Decimal,
    pub stable_receiver_dollar_amount: Decimal,
    pub payment_made: bool,
    pub risk_score: u32,
}

impl CycleRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        estimated_price: Decimal,
        expected_dollar_amount: Decimal,
        stable_receiver_dollar_amount: Decimal,
        payment_made: bool,
        risk_score: u32,
    ) -> Self {
        Self {
            formatted_time: timestamp.format("%H:%M %d %b %Y").to_string(),
            estimated_price,
            expected_dollar_amount,
            stable_receiver_dollar_amount,
            payment_made,
            risk_score,
        }
    }

    /// Serialize as a single JSON line.
    pub fn to_json_line(&self) -> Result<String, RecordError> {
        serde_json::to_string(self).map_err(|e| RecordError::Serialization(e.to_string()))
    }
}

/// Pluggable recorder backend.
#[async_trait]
pub trait CycleRecorder: Send + Sync {
    async fn append(&self, record: &CycleRecord) -> Result<(), RecordError>;
}

/// Fan-out recorder that writes to every configured backend.
///
/// Individual backend failures are logged and swallowed so that one
/// broken sink cannot silence the others.
pub struct MultiRecorder {
    backends: Vec<Arc<dyn CycleRecorder>>,
}

impl MultiRecorder {
    pub fn new(backends: Vec<Arc<dyn CycleRecorder>>) -> Self {
        Self { backends }
    }
}

#[async_trait]
impl CycleRecorder for MultiRecorder {
    async fn append(&self, record: &CycleRecord) -> Result<(), RecordError> {
        for backend in &self.backends {
            if let Err(e) = backend.append(record).await {
                warn!(error = %e, "cycle recorder backend failed");
            }
        }
        Ok(())
    }
}
