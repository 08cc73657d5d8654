//! Decision-function selection and parameters.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::application::Settings;

/// The `[strategy]` section: engine settings plus the decision function.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    /// Registered decision function, e.g. `observer` or `spread_quoter`.
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(flatten)]
    pub settings: Settings,
    #[serde(default)]
    pub spread_quoter: SpreadQuoterConfig,
}

fn default_name() -> String {
    "observer".to_string()
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            settings: Settings::default(),
            spread_quoter: SpreadQuoterConfig::default(),
        }
    }
}

/// Parameters of the `spread_quoter` decision function.
#[derive(Debug, Clone, Deserialize)]
pub struct SpreadQuoterConfig {
    /// Half-spread around the reference price, as a fraction (0.001 = 10 bp).
    #[serde(default = "default_half_spread")]
    pub half_spread: Decimal,
    /// Size of each quote.
    #[serde(default = "default_size")]
    pub size: Decimal,
    /// Net position at which the side that would grow it stops quoting.
    #[serde(default = "default_max_position")]
    pub max_position: Decimal,
    /// Price tolerance under which a resting quote is kept.
    #[serde(default)]
    pub limit_mask: Decimal,
    /// Cancel each quote after this many seconds if still open.
    #[serde(default)]
    pub cancel_after_secs: Option<u64>,
}

fn default_half_spread() -> Decimal {
    dec!(0.001)
}

fn default_size() -> Decimal {
    dec!(0.01)
}

fn default_max_position() -> Decimal {
    dec!(0.1)
}

impl Default for SpreadQuoterConfig {
    fn default() -> Self {
        Self {
            half_spread: default_half_spread(),
            size: default_size(),
            max_position: default_max_position(),
            limit_mask: Decimal::ZERO,
            cancel_after_secs: None,
        }
    }
}
