use crate::common::Instrument;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// # Summary
/// Configuration loading or validation failure.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The source could not be read or deserialized
    #[error("Config load error: {0}")]
    Load(String),
    /// A value is present but unusable
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Global application configuration. Every section is optional in the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub instrument: Instrument,
    pub market: MarketConfig,
    pub scheduler: SchedulerConfig,
    pub engine: EngineConfig,
    pub feed: FeedConfig,
    pub notify: NotifyConfig,
    pub ledger: LedgerConfig,
    pub logging: LoggingConfig,
}

/// Exchange session window, in the exchange's local time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    // IANA name, e.g. Asia/Kolkata
    pub timezone: String,
    // HH:MM
    pub open: String,
    // HH:MM
    pub close: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            timezone: "Asia/Kolkata".to_string(),
            open: "09:15".to_string(),
            close: "15:30".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    // pause between two ticks while the market is open
    pub poll_interval_secs: u64,
    // sleep between two "market closed" checks
    pub closed_recheck_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            closed_recheck_secs: 3600,
        }
    }
}

/// # Summary
/// When cached pivot levels are considered stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotRefresh {
    /// Refetch once per market-local calendar day.
    Daily,
    /// Keep the first successful fetch for the whole process lifetime.
    Once,
}

/// # Summary
/// How often the static risk disclaimer is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisclaimerPolicy {
    /// On every tick that observed a price change.
    EveryChange,
    /// On a price change, at most once per `disclaimer_interval_secs`.
    Interval,
    /// Never.
    Off,
}

/// Signal thresholds, all in currency units of the instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub profit_threshold: f64,
    pub stoploss_threshold: f64,
    pub pivot_tolerance: f64,
    pub movement_threshold: f64,
    pub pivot_refresh: PivotRefresh,
    pub disclaimer: DisclaimerPolicy,
    pub disclaimer_interval_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profit_threshold: 2.0,
            stoploss_threshold: 5.0,
            pivot_tolerance: 2.0,
            movement_threshold: 3.0,
            pivot_refresh: PivotRefresh::Daily,
            disclaimer: DisclaimerPolicy::EveryChange,
            disclaimer_interval_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub price_base_url: String,
    pub pivot_base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            price_base_url: "https://query1.finance.yahoo.com".to_string(),
            pivot_base_url: "https://www.moneycontrol.com/india/stockpricequote".to_string(),
            timeout_secs: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
        }
    }
}

/// # Summary
/// Alert channels. Secrets are never stored here, only the names of the
/// environment variables that hold them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub slack_token_env: String,
    pub slack_channel_env: String,
    pub slack_api_url: String,
    pub desktop: bool,
    pub desktop_title: String,
    pub desktop_timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            slack_token_env: "SLACK_TOKEN".to_string(),
            slack_channel_env: "SLACK_CHANNEL_ID".to_string(),
            slack_api_url: "https://slack.com/api".to_string(),
            desktop: true,
            desktop_title: "📢 Stock Alert".to_string(),
            desktop_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub data_dir: String,
    pub file_name: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            file_name: "ledger.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    // default filter directive, RUST_LOG wins when set
    pub level: String,
    // daily rolling file output is enabled when set
    pub dir: Option<String>,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
            file_prefix: "tickwatch.log".to_string(),
        }
    }
}

impl AppConfig {
    /// # Summary
    /// Rejects values the engine or scheduler cannot run with.
    ///
    /// # Logic
    /// 1. All thresholds must be finite and strictly positive.
    /// 2. Poll and recheck intervals must be non-zero.
    /// 3. The market window must parse (see `MarketHours::from_config`).
    /// 4. The instrument symbol must not be empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let thresholds = [
            ("engine.profit_threshold", self.engine.profit_threshold),
            ("engine.stoploss_threshold", self.engine.stoploss_threshold),
            ("engine.pivot_tolerance", self.engine.pivot_tolerance),
            ("engine.movement_threshold", self.engine.movement_threshold),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if self.scheduler.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "scheduler.poll_interval_secs must be greater than zero".into(),
            ));
        }
        if self.scheduler.closed_recheck_secs == 0 {
            return Err(ConfigError::Invalid(
                "scheduler.closed_recheck_secs must be greater than zero".into(),
            ));
        }
        if self.instrument.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("instrument.symbol is empty".into()));
        }
        crate::common::calendar::MarketHours::from_config(&self.market)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.instrument.symbol, "ICICIBANK.NS");
        assert_eq!(config.market.timezone, "Asia/Kolkata");
        assert_eq!(config.scheduler.poll_interval_secs, 5);
        assert_eq!(config.scheduler.closed_recheck_secs, 3600);
        assert_eq!(config.engine.profit_threshold, 2.0);
        assert_eq!(config.engine.stoploss_threshold, 5.0);
        assert_eq!(config.engine.pivot_refresh, PivotRefresh::Daily);
        assert_eq!(config.notify.slack_token_env, "SLACK_TOKEN");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections_fall_back_to_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "engine": { "disclaimer": "interval", "pivot_refresh": "once" } }"#,
        )
        .unwrap();
        assert_eq!(config.engine.disclaimer, DisclaimerPolicy::Interval);
        assert_eq!(config.engine.pivot_refresh, PivotRefresh::Once);
        assert_eq!(config.engine.movement_threshold, 3.0);
        assert_eq!(config.ledger.data_dir, "data");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.engine.stoploss_threshold = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::default();
        config.scheduler.poll_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.market.close = "09:00".to_string();
        assert!(config.validate().is_err());
    }
}
