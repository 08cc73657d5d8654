//! Application configuration loading and validation.
//!
//! Configuration is read from a TOML file. Exchange credentials are only
//! ever taken from the environment (`STRATEGIST_API_KEY`,
//! `STRATEGIST_API_SECRET`).
//!
//! # Example
//!
//! ```no_run
//! use strategist::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.logging.init();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use url::Url;

use super::exchange::{Credentials, ExchangeConfig};
use super::feed::FeedConfig;
use super::logging::LoggingConfig;
use super::strategy::StrategyConfig;
use crate::application::EngineSettings;
use crate::domain::ProductSpec;
use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Loaded from the environment, never from the file.
    #[serde(skip)]
    pub credentials: Option<Credentials>,
}

impl Config {
    /// Parse and validate configuration from TOML content.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.credentials = Credentials::from_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Product the engine trades, resolved from `strategy.symbol`.
    pub fn product(&self) -> Result<ProductSpec> {
        Ok(ProductSpec::resolve(&self.strategy.settings.symbol)?)
    }

    fn validate(&self) -> Result<()> {
        if self.feed.ws_url.is_empty() {
            return Err(ConfigError::MissingField { field: "ws_url" }.into());
        }
        let url = Url::parse(&self.feed.ws_url).map_err(|e| ConfigError::InvalidValue {
            field: "ws_url",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(ConfigError::InvalidValue {
                field: "ws_url",
                reason: format!("unsupported scheme '{}'", url.scheme()),
            }
            .into());
        }

        ProductSpec::resolve(&self.strategy.settings.symbol).map_err(|e| {
            ConfigError::InvalidValue {
                field: "symbol",
                reason: e.to_string(),
            }
        })?;

        if self.strategy.settings.max_candles == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_candles",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.engine.feed_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "feed_capacity",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.engine.reaper_interval_secs == 0
            || self.engine.balance_interval_secs == 0
            || self.engine.maintenance_interval_secs == 0
        {
            return Err(ConfigError::InvalidValue {
                field: "engine",
                reason: "task periods must be greater than 0".to_string(),
            }
            .into());
        }

        let reconnection = &self.feed.reconnection;
        if reconnection.initial_delay_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "initial_delay_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if reconnection.max_delay_ms < reconnection.initial_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "max_delay_ms",
                reason: "must be >= initial_delay_ms".to_string(),
            }
            .into());
        }
        if reconnection.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "backoff_multiplier",
                reason: "must be >= 1.0".to_string(),
            }
            .into());
        }
        if reconnection.max_consecutive_failures == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_consecutive_failures",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
