//! Exchange selection and credentials.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// Exchange variant, selected by the `type` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExchangeConfig {
    /// In-memory exchange filled from the live feed.
    Paper(PaperConfig),
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self::Paper(PaperConfig::default())
    }
}

impl ExchangeConfig {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Paper(_) => "paper",
        }
    }
}

/// Starting balances and fees of the paper exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct PaperConfig {
    #[serde(default)]
    pub base_balance: Decimal,
    #[serde(default = "default_quote_balance")]
    pub quote_balance: Decimal,
    /// Fee charged on each fill, as a fraction of notional.
    #[serde(default)]
    pub fee_rate: Decimal,
}

fn default_quote_balance() -> Decimal {
    dec!(1000000)
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            base_balance: Decimal::ZERO,
            quote_balance: default_quote_balance(),
            fee_rate: Decimal::ZERO,
        }
    }
}

/// API credentials, read only from `STRATEGIST_API_KEY` and
/// `STRATEGIST_API_SECRET`.
#[derive(Clone, Default)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    /// Both variables must be set and non-empty.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("STRATEGIST_API_KEY").ok()?;
        let api_secret = std::env::var("STRATEGIST_API_SECRET").ok()?;
        if api_key.is_empty() || api_secret.is_empty() {
            return None;
        }
        Some(Self {
            api_key,
            api_secret,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .finish()
    }
}
