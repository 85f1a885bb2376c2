//! Bounded retry with exponential backoff and jitter.
//!
//! Price feeds and other external HTTP services fail transiently; every
//! call site shares this one policy object instead of inlining its own
//! retry loop.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

/// Outcome of a single attempt inside [`RetryPolicy::run`].
///
/// `Retry` consumes one attempt from the budget; `Fatal` aborts
/// immediately without sleeping.
pub enum Attempt<T, E> {
    Done(T),
    Retry(E),
    Fatal(E),
}

/// Retry policy with exponential backoff and uniform jitter.
///
/// Delay for attempt `n` (1-based) is
/// `base_delay * backoff_factor^(n-1)`, capped at `max_delay`, plus up to
/// 50% uniform jitter so that several sources polled on the same cadence
/// do not retry in lockstep.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Multiplier applied per retry.
    pub backoff_factor: f64,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(300),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Policy used for external price feed queries: five attempts from a
    /// 300 ms base.
    pub fn price_feed() -> Self {
        Self {
            max_attempts: 5,
            ..Self::default()
        }
    }

    /// Whether an HTTP status is worth retrying.
    ///
    /// Server errors and 404 are retryable; 404 tolerates a known-flaky
    /// feed that intermittently resolves to a bad upstream.
    pub fn is_retryable_status(status: u16) -> bool {
        status >= 500 || status == 404
    }

    /// Backoff delay before retry number `attempt` (1-based), jittered.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self.backoff_factor.powi(attempt.saturating_sub(1) as i32);
        let base = self.base_delay.as_millis() as f64 * exp;
        let capped = base.min(self.max_delay.as_millis() as f64);
        let jitter = rand::thread_rng().gen_range(0.0..=0.5);
        Duration::from_millis((capped * (1.0 + jitter)) as u64)
    }

    /// Drive `op` until it succeeds, fails fatally, or the attempt budget
    /// is exhausted. The last retryable error is returned on exhaustion.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Attempt<T, E>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Attempt::Done(value) => return Ok(value),
                Attempt::Fatal(err) => return Err(err),
                Attempt::Retry(err) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        return Err(err);
                    }
                    let delay = self.delay_for(attempt);
                    debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn retryable_statuses() {
        assert!(RetryPolicy::is_retryable_status(500));
        assert!(RetryPolicy::is_retryable_status(502));
        assert!(RetryPolicy::is_retryable_status(504));
        assert!(RetryPolicy::is_retryable_status(404));
        assert!(!RetryPolicy::is_retryable_status(200));
        assert!(!RetryPolicy::is_retryable_status(400));
        assert!(!RetryPolicy::is_retryable_status(403));
    }

    #[test]
    fn delay_grows_and_is_capped() {
        let policy = RetryPolicy::price_feed();
        // Jitter adds at most 50%, so bounds are deterministic.
        let d1 = policy.delay_for(1);
        assert!(d1 >= Duration::from_millis(300));
        assert!(d1 <= Duration::from_millis(450));

        let d3 = policy.delay_for(3);
        assert!(d3 >= Duration::from_millis(1200));
        assert!(d3 <= Duration::from_millis(1800));

        let d20 = policy.delay_for(20);
        assert!(d20 <= Duration::from_millis(15_000));
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_after_budget_exhausted() {
        let policy = RetryPolicy::price_feed();
        let calls = AtomicU32::new(0);

        let result: Result<(), &str> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Attempt::Retry("still failing") }
            })
            .await;

        assert_eq!(result, Err("still failing"));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn run_returns_first_success() {
        let policy = RetryPolicy::price_feed();
        let calls = AtomicU32::new(0);

        let result: Result<u32, &str> = policy
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Attempt::Retry("transient")
                    } else {
                        Attempt::Done(n)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(2));
    }

    #[tokio::test]
    async fn fatal_errors_do_not_retry() {
        let policy = RetryPolicy::price_feed();
        let calls = AtomicU32::new(0);

        let result: Result<(), &str> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Attempt::Fatal("bad request") }
            })
            .await;

        assert_eq!(result, Err("bad request"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
