//! # Resilience Module
//!
//! Reusable resilience patterns for calls to external services.
//!
//! ## Components
//! - `RetryPolicy`: Bounded retries with exponential backoff and jitter,
//!   parameterized by a retryable-status predicate.

pub mod retry;

// Re-export for convenience
pub use retry::{Attempt, RetryPolicy};
