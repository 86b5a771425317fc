//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file; every section has defaults so
//! an empty file (or no file) yields a working engine.

use std::num::NonZeroUsize;
use std::path::Path;

use chrono::Duration;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub ordering: OrderingConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.detection.rapid_succession_secs <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "detection.rapid_succession_secs",
                reason: "must be positive".into(),
            }
            .into());
        }
        if self.detection.anomaly_multiplier <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "detection.anomaly_multiplier",
                reason: "must be positive".into(),
            }
            .into());
        }
        if self.ordering.grace_secs < 0 {
            return Err(ConfigError::InvalidValue {
                field: "ordering.grace_secs",
                reason: "cannot be negative".into(),
            }
            .into());
        }
        if self.store.database_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "store.database_url",
            }
            .into());
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_attempts",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.backoff_multiplier",
                reason: "must be at least 1.0".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

/// Detection rule thresholds.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Gap below which two transactions count as rapid succession, seconds.
    pub rapid_succession_secs: i64,
    /// An amount above `multiplier x prior mean` flags as anomalous.
    pub anomaly_multiplier: Decimal,
    /// Cap on the recent-amounts window used for rank. 0 = unbounded.
    pub rank_window: usize,
}

impl DetectionConfig {
    /// Rapid-succession threshold as a duration.
    #[must_use]
    pub fn rapid_succession(&self) -> Duration {
        Duration::seconds(self.rapid_succession_secs)
    }

    /// Rank window cap, if bounded.
    #[must_use]
    pub fn rank_window(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.rank_window)
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            rapid_succession_secs: 300,
            anomaly_multiplier: Decimal::from(3),
            rank_window: 0,
        }
    }
}

/// How out-of-order arrivals are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderingMode {
    /// Reject anything at or below the finalized watermark; finalize
    /// everything currently available.
    #[default]
    Strict,
    /// Hold back the newest transactions for a grace window so late
    /// arrivals can still be incorporated before the order is finalized.
    Lenient,
}

/// Ordering policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderingConfig {
    #[serde(default)]
    pub mode: OrderingMode,
    /// Grace window for lenient mode, seconds. Ignored in strict mode.
    pub grace_secs: i64,
}

impl OrderingConfig {
    /// Grace window as a duration.
    #[must_use]
    pub fn grace(&self) -> Duration {
        Duration::seconds(self.grace_secs)
    }
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            mode: OrderingMode::Strict,
            grace_secs: 600,
        }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub database_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "ledgerhawk.db".into(),
        }
    }
}

/// Bounded exponential backoff for store appends and reads.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 100,
            max_delay_ms: 5_000,
            backoff_multiplier: 2.0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn default_config_validates() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn defaults_match_documented_thresholds() {
        let config = Config::default();
        assert_eq!(config.detection.rapid_succession(), Duration::minutes(5));
        assert_eq!(config.detection.anomaly_multiplier, dec!(3));
        assert_eq!(config.detection.rank_window(), None);
        assert_eq!(config.ordering.mode, OrderingMode::Strict);
    }

    #[test]
    fn empty_toml_parses_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.store.database_url, "ledgerhawk.db");
    }

    #[test]
    fn lenient_mode_parses_with_grace() {
        let config: Config = toml::from_str(
            r#"
            [ordering]
            mode = "lenient"
            grace_secs = 120
            "#,
        )
        .unwrap();
        assert_eq!(config.ordering.mode, OrderingMode::Lenient);
        assert_eq!(config.ordering.grace(), Duration::seconds(120));
    }

    #[test]
    fn zero_rapid_succession_is_rejected() {
        let config: Config = toml::from_str(
            r#"
            [detection]
            rapid_succession_secs = 0
            anomaly_multiplier = "3"
            rank_window = 0
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn sub_one_backoff_multiplier_is_rejected() {
        let config: Config = toml::from_str(
            r#"
            [retry]
            max_attempts = 3
            initial_delay_ms = 50
            max_delay_ms = 500
            backoff_multiplier = 0.5
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}
