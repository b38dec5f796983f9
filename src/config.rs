//! Environment-driven configuration

use crate::common::time::parse_interval_millis;
use crate::error::ConfigError;
use crate::models::indicators::IndicatorKind;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Get the current environment (production, sandbox, ...)
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

/// Postgres connection string for the signal history store
pub fn get_database_url() -> String {
    env::var("DATABASE_URL")
        .unwrap_or_else(|_| "host=localhost user=postgres password=postgres dbname=signals".to_string())
}

pub fn get_bybit_base_url() -> String {
    env::var("BYBIT_BASE_URL").unwrap_or_else(|_| "https://api.bybit.com".to_string())
}

/// Universe override, comma separated (e.g. `BTCUSDT,ETHUSDT`)
pub fn get_symbols() -> Option<Vec<String>> {
    env::var("SYMBOLS").ok().and_then(|s| {
        let v: Vec<String> = s
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if v.is_empty() {
            None
        } else {
            Some(v)
        }
    })
}

/// Parameters for one pipeline cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum number of provider calls in flight
    pub concurrency_limit: usize,
    pub fetch_timeout: Duration,
    pub cycle_deadline: Duration,
    pub indicator_period: usize,
    pub indicator_kind: IndicatorKind,
    pub min_score: f64,
    pub result_limit: usize,
    /// Samples requested per entity. Must be at least `indicator_period + 1`.
    pub window_size: usize,
    /// Sample period, e.g. `5m`
    pub interval: String,
    /// Keep only entities whose identifier ends with this quote (e.g. `USDT`)
    #[serde(default)]
    pub quote_filter: Option<String>,
    /// Price drop (in %) against the previous cycle that raises an alert
    pub drop_alert_pct: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 8,
            fetch_timeout: Duration::from_secs(10),
            cycle_deadline: Duration::from_secs(60),
            indicator_period: 100,
            indicator_kind: IndicatorKind::Sma,
            min_score: 70.0,
            result_limit: 20,
            window_size: 101,
            interval: "5m".to_string(),
            quote_filter: None,
            drop_alert_pct: 2.0,
        }
    }
}

impl PipelineConfig {
    /// Build from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            concurrency_limit: env_parse("CONCURRENCY_LIMIT")?.unwrap_or(defaults.concurrency_limit),
            fetch_timeout: env_parse("FETCH_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.fetch_timeout),
            cycle_deadline: env_parse("CYCLE_DEADLINE_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.cycle_deadline),
            indicator_period: env_parse("INDICATOR_PERIOD")?.unwrap_or(defaults.indicator_period),
            indicator_kind: env_parse("INDICATOR_KIND")?.unwrap_or(defaults.indicator_kind),
            min_score: env_parse("MIN_SCORE")?.unwrap_or(defaults.min_score),
            result_limit: env_parse("RESULT_LIMIT")?.unwrap_or(defaults.result_limit),
            window_size: env_parse("WINDOW_SIZE")?.unwrap_or(defaults.window_size),
            interval: env::var("INTERVAL").unwrap_or(defaults.interval),
            quote_filter: env::var("QUOTE_FILTER").ok().filter(|q| !q.is_empty()),
            drop_alert_pct: env_parse("DROP_ALERT_PCT")?.unwrap_or(defaults.drop_alert_pct),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a meaningful cycle
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency_limit == 0 {
            return Err(ConfigError::Invalid("concurrency_limit must be > 0".to_string()));
        }
        if self.indicator_period == 0 {
            return Err(ConfigError::Invalid("indicator_period must be > 0".to_string()));
        }
        if self.window_size < self.indicator_period + 1 {
            return Err(ConfigError::Invalid(format!(
                "window_size ({}) must be at least indicator_period + 1 ({})",
                self.window_size,
                self.indicator_period + 1
            )));
        }
        if self.fetch_timeout.is_zero() || self.cycle_deadline.is_zero() {
            return Err(ConfigError::Invalid("timeouts must be non-zero".to_string()));
        }
        if !self.min_score.is_finite() || !self.drop_alert_pct.is_finite() {
            return Err(ConfigError::Invalid("thresholds must be finite".to_string()));
        }
        if parse_interval_millis(&self.interval).is_none() {
            return Err(ConfigError::Invalid(format!("unknown interval '{}'", self.interval)));
        }
        Ok(())
    }

    /// Minimum window length for one crossover
    pub fn min_window_len(&self) -> usize {
        self.indicator_period + 1
    }

    pub fn interval_millis(&self) -> Option<i64> {
        parse_interval_millis(&self.interval)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("cannot parse {}='{}'", key, raw))),
        Err(_) => Ok(None),
    }
}
