//! CLI configuration structs bridging CLI arguments to domain types.
//!
//! These structs decouple the CLI parsing layer from the business logic,
//! allowing the monitor to start from a validated, typed configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::ChannelAgreement;

/// Errors that can occur when validating monitor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("channel id must not be empty")]
    EmptyChannelId,

    #[error("counterparty identity must not be empty")]
    EmptyCounterparty,

    #[error("invalid target dollar amount '{0}'")]
    InvalidTarget(String),

    #[error("target dollar amount must be positive, got {0}")]
    NonPositiveTarget(Decimal),

    #[error("cadence must be at least 1 second")]
    ZeroCadence,
}

/// Validated configuration for one monitor worker.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub channel_id: String,
    pub counterparty: String,
    pub target_usd: Decimal,
    pub native_reserve_msat: u64,
    pub is_stable_receiver: bool,
    pub node_url: String,
    pub cadence: Duration,
    pub log_dir: PathBuf,
}

impl MonitorConfig {
    /// Build and validate from raw CLI arguments.
    #[allow(clippy::too_many_arguments)]
    pub fn from_args(
        channel_id: String,
        counterparty: String,
        target_usd: &str,
        native_reserve_msat: u64,
        is_stable_receiver: bool,
        node_url: String,
        cadence_secs: u64,
        log_dir: String,
    ) -> Result<Self, ConfigError> {
        if channel_id.trim().is_empty() {
            return Err(ConfigError::EmptyChannelId);
        }
        if counterparty.trim().is_empty() {
            return Err(ConfigError::EmptyCounterparty);
        }
        let target = Decimal::from_str(target_usd)
            .map_err(|_| ConfigError::InvalidTarget(target_usd.to_string()))?;
        if target <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveTarget(target));
        }
        if cadence_secs == 0 {
            return Err(ConfigError::ZeroCadence);
        }
        Ok(Self {
            channel_id,
            counterparty,
            target_usd: target,
            native_reserve_msat,
            is_stable_receiver,
            node_url,
            cadence: Duration::from_secs(cadence_secs),
            log_dir: PathBuf::from(log_dir),
        })
    }

    /// The channel agreement this configuration describes.
    pub fn agreement(&self) -> ChannelAgreement {
        ChannelAgreement {
            channel_id: self.channel_id.clone(),
            counterparty: self.counterparty.clone(),
            is_stable_receiver: self.is_stable_receiver,
            target_usd: self.target_usd,
            native_reserve_msat: self.native_reserve_msat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid() -> Result<MonitorConfig, ConfigError> {
        MonitorConfig::from_args(
            "chan-1".to_string(),
            "02abc".to_string(),
            "100.00",
            0,
            true,
            "http://127.0.0.1:9737".to_string(),
            300,
            ".".to_string(),
        )
    }

    #[test]
    fn accepts_valid_arguments() {
        let config = valid().unwrap();
        assert_eq!(config.target_usd, dec!(100));
        assert_eq!(config.cadence, Duration::from_secs(300));
        let agreement = config.agreement();
        assert!(agreement.is_stable_receiver);
        assert_eq!(agreement.channel_id, "chan-1");
    }

    #[test]
    fn rejects_empty_channel_id() {
        let err = MonitorConfig::from_args(
            "  ".to_string(),
            "02abc".to_string(),
            "100",
            0,
            true,
            String::new(),
            300,
            ".".to_string(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyChannelId));
    }

    #[test]
    fn rejects_unparseable_target() {
        let err = MonitorConfig::from_args(
            "chan-1".to_string(),
            "02abc".to_string(),
            "a hundred",
            0,
            true,
            String::new(),
            300,
            ".".to_string(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTarget(_)));
    }

    #[test]
    fn rejects_non_positive_target() {
        let err = MonitorConfig::from_args(
            "chan-1".to_string(),
            "02abc".to_string(),
            "0",
            0,
            true,
            String::new(),
            300,
            ".".to_string(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveTarget(_)));
    }

    #[test]
    fn rejects_zero_cadence() {
        let err = MonitorConfig::from_args(
            "chan-1".to_string(),
            "02abc".to_string(),
            "100",
            0,
            true,
            String::new(),
            0,
            ".".to_string(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroCadence));
    }
}
