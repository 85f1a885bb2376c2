//! Logging and Cycle Recording Module
//!
//! Provides multiple backends for recording reconciliation cycles:
//! - `CycleRecorder` trait - Pluggable recorder interface
//! - `JsonlRecorder` - Append-only JSON-lines file recorder
//! - `TracingRecorder` - Structured log emission

pub mod jsonl_recorder;
pub mod recorder;
pub mod tracing_recorder;

// Re-exports for convenience
pub use jsonl_recorder::JsonlRecorder;
pub use recorder::{CycleRecord, CycleRecorder, MultiRecorder, RecordError};
pub use tracing_recorder::TracingRecorder;
