//! Identifier newtypes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Caller-chosen order key. At most one record exists per client id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientOrderId(String);

impl ClientOrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientOrderId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ClientOrderId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Order identifier assigned by the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExchangeOrderId(String);

impl ExchangeOrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExchangeOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExchangeOrderId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Trade identifier, monotonically increasing within a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TradeId(u64);

impl TradeId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exchange pair key, e.g. `btc_jpy` for the symbol `BTC/JPY`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair(String);

impl Pair {
    /// Resolve a `BASE/QUOTE` symbol into its pair key.
    pub fn from_symbol(symbol: &str) -> Result<Self, DomainError> {
        let malformed = || DomainError::MalformedSymbol {
            symbol: symbol.to_string(),
        };
        let (base, quote) = symbol.split_once('/').ok_or_else(malformed)?;
        let (base, quote) = (base.trim(), quote.trim());
        if base.is_empty() || quote.is_empty() || quote.contains('/') {
            return Err(malformed());
        }
        Ok(Self(format!(
            "{}_{}",
            base.to_lowercase(),
            quote.to_lowercase()
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base currency, e.g. `btc`.
    pub fn base(&self) -> &str {
        self.0.split_once('_').map_or(self.0.as_str(), |(b, _)| b)
    }

    /// Quote currency, e.g. `jpy`.
    pub fn quote(&self) -> &str {
        self.0.split_once('_').map_or("", |(_, q)| q)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
