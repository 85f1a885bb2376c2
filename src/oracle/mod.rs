//! Price oracle: multi-source median BTC/USD rate.
//!
//! Queries every configured feed independently, swallows per-source
//! failures, and aggregates the survivors with a median so that no single
//! manipulated or broken feed can move the rate. Results are cached per
//! currency for a short window to absorb repeated lookups within one
//! cycle.

pub mod sources;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::resilience::{Attempt, RetryPolicy};
use crate::types::MSATS_PER_BTC;

pub use sources::{default_sources, msat_per_unit, RateSource};

/// How long a fetched rate stays valid for repeat lookups.
const CACHE_TTL: Duration = Duration::from_secs(60);

/// Errors from the price oracle.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Every configured source failed this cycle.
    #[error("no rates available for {0}")]
    NoRatesAvailable(String),
}

/// One cycle's aggregated rate. Ephemeral: logged, never persisted as
/// authoritative state.
#[derive(Debug, Clone)]
pub struct RateQuote {
    /// Median millisatoshis per unit of the target currency.
    pub msat_per_unit: u64,
    /// Names of the sources that contributed a value.
    pub sources: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

impl RateQuote {
    /// Implied BTC price in the target currency, two decimal places.
    pub fn estimated_price(&self) -> Decimal {
        (Decimal::from(MSATS_PER_BTC) / Decimal::from(self.msat_per_unit)).round_dp(2)
    }

    /// Dollar value of a native amount, rounded to three decimal places.
    pub fn dollar_value(&self, msat: u64) -> Decimal {
        (Decimal::from(msat) / Decimal::from(self.msat_per_unit)).round_dp(3)
    }

    /// Native amount equivalent of a dollar amount, rounded to whole msat.
    pub fn native_amount(&self, usd: Decimal) -> u64 {
        use rust_decimal::prelude::ToPrimitive;
        (Decimal::from(self.msat_per_unit) * usd)
            .round()
            .to_u64()
            .unwrap_or(0)
    }
}

/// Seam between the reconciliation engine and the live oracle, so the
/// engine can be driven by a canned rate in tests.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn usd_rate(&self) -> Result<RateQuote, OracleError>;
}

/// Median-of-feeds price oracle with retry and TTL caching.
pub struct PriceOracle {
    client: reqwest::Client,
    sources: Vec<RateSource>,
    retry: RetryPolicy,
    cache: Mutex<HashMap<String, CachedQuote>>,
}

struct CachedQuote {
    quote: RateQuote,
    fetched: Instant,
}

impl PriceOracle {
    pub fn new() -> Self {
        Self::with_sources(default_sources())
    }

    pub fn with_sources(sources: Vec<RateSource>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            sources,
            retry: RetryPolicy::price_feed(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the median rate for a currency, serving from cache when a
    /// quote younger than the TTL exists.
    pub async fn rate(&self, currency: &str) -> Result<RateQuote, OracleError> {
        let currency = currency.to_uppercase();

        {
            let cache = self.cache.lock().await;
            if let Some(cached) = cache.get(&currency) {
                if cached.fetched.elapsed() < CACHE_TTL {
                    debug!(%currency, "serving cached rate");
                    return Ok(cached.quote.clone());
                }
            }
        }

        let mut values = Vec::new();
        let mut contributed = Vec::new();
        for source in &self.sources {
            if let Some(rate) = self.fetch_source(source, &currency).await {
                values.push(rate);
                contributed.push(source.name.to_string());
            }
        }

        if values.len() < self.sources.len() {
            warn!(
                succeeded = values.len(),
                configured = self.sources.len(),
                "some price sources failed"
            );
        }

        let median = median(&mut values)
            .ok_or_else(|| OracleError::NoRatesAvailable(currency.clone()))?;

        let quote = RateQuote {
            msat_per_unit: median,
            sources: contributed,
            fetched_at: Utc::now(),
        };
        info!(
            %currency,
            msat_per_unit = quote.msat_per_unit,
            estimated_price = %quote.estimated_price(),
            sources = quote.sources.len(),
            "rate aggregated"
        );

        let mut cache = self.cache.lock().await;
        cache.insert(
            currency,
            CachedQuote {
                quote: quote.clone(),
                fetched: Instant::now(),
            },
        );
        Ok(quote)
    }

    /// Query one feed with the retry policy. All failure modes collapse
    /// to `None`; a broken source must never abort the aggregate query.
    async fn fetch_source(&self, source: &RateSource, currency: &str) -> Option<u64> {
        let url = source.url(currency);
        let client = self.client.clone();

        let fetched: Result<Value, String> = self
            .retry
            .run(move || {
                let client = client.clone();
                let url = url.clone();
                async move {
                    match client.get(&url).send().await {
                        Ok(resp) => {
                            let status = resp.status();
                            if status.is_success() {
                                match resp.json::<Value>().await {
                                    Ok(body) => Attempt::Done(body),
                                    Err(e) => Attempt::Fatal(format!("malformed reply: {e}")),
                                }
                            } else if RetryPolicy::is_retryable_status(status.as_u16()) {
                                Attempt::Retry(format!("status {status}"))
                            } else {
                                Attempt::Fatal(format!("status {status}"))
                            }
                        }
                        Err(e) if e.is_timeout() || e.is_connect() => {
                            Attempt::Retry(e.to_string())
                        }
                        Err(e) => Attempt::Fatal(e.to_string()),
                    }
                }
            })
            .await;

        let body = match fetched {
            Ok(body) => body,
            Err(reason) => {
                info!(source = source.name, %reason, "price source failed");
                return None;
            }
        };

        let price = match source.extract_price(&body, currency) {
            Some(price) => price,
            None => {
                info!(source = source.name, "price missing from reply");
                return None;
            }
        };

        match msat_per_unit(price) {
            Some(rate) => {
                debug!(source = source.name, price, rate, "price fetched");
                Some(rate)
            }
            None => {
                info!(source = source.name, price, "unusable price");
                None
            }
        }
    }
}

impl Default for PriceOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateProvider for PriceOracle {
    async fn usd_rate(&self) -> Result<RateQuote, OracleError> {
        self.rate("USD").await
    }
}

/// Median of the collected per-source rates. Sorts in place; an even
/// count takes the midpoint average of the two central values.
pub fn median(values: &mut [u64]) -> Option<u64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2)
    } else {
        Some(values[mid])
    }
}
