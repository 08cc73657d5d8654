//! Lookup of bundled decision functions by name.

use super::observer::Observer;
use super::spread_quoter::SpreadQuoter;
use crate::application::Strategy;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::StrategyConfig;

/// Names accepted by `[strategy] name`.
pub const AVAILABLE: &[&str] = &["observer", "spread_quoter"];

/// Build the decision function selected in the config.
pub fn build_strategy(config: &StrategyConfig) -> Result<Box<dyn Strategy>> {
    match config.name.as_str() {
        "observer" => Ok(Box::new(Observer::new())),
        "spread_quoter" => Ok(Box::new(SpreadQuoter::new(config.spread_quoter.clone()))),
        other => Err(ConfigError::InvalidValue {
            field: "strategy.name",
            reason: format!("unknown strategy '{other}', expected one of {AVAILABLE:?}"),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_every_bundled_strategy() {
        for name in AVAILABLE {
            let config = StrategyConfig {
                name: (*name).to_string(),
                ..StrategyConfig::default()
            };
            assert_eq!(build_strategy(&config).unwrap().name(), *name);
        }
    }

    #[test]
    fn unknown_name_is_a_config_error() {
        let config = StrategyConfig {
            name: "martingale".into(),
            ..StrategyConfig::default()
        };
        assert!(build_strategy(&config).is_err());
    }
}
