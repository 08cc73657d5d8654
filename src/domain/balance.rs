//! Account balance, ticker and valuation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::money::{Price, Volume};

/// Account balance for one pair, split into free and reserved amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balance {
    pub base: Volume,
    pub base_reserved: Volume,
    pub quote: Decimal,
    pub quote_reserved: Decimal,
}

impl Balance {
    #[must_use]
    pub fn base_total(&self) -> Volume {
        self.base + self.base_reserved
    }

    #[must_use]
    pub fn quote_total(&self) -> Decimal {
        self.quote + self.quote_reserved
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker {
    pub last: Price,
    pub bid: Price,
    pub ask: Price,
    pub timestamp: DateTime<Utc>,
}

/// Account value marked at the best bid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Valuation {
    pub balance: Balance,
    pub bid: Price,
    /// Quote plus reserved quote plus bid times base plus reserved base.
    pub total: Decimal,
    pub at: DateTime<Utc>,
}

impl Valuation {
    #[must_use]
    pub fn mark(balance: Balance, ticker: &Ticker, at: DateTime<Utc>) -> Self {
        let total = balance.quote_total() + ticker.bid * balance.base_total();
        Self {
            balance,
            bid: ticker.bid,
            total,
            at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn valuation_includes_reserved_amounts() {
        let balance = Balance {
            base: dec!(0.5),
            base_reserved: dec!(0.25),
            quote: dec!(10000),
            quote_reserved: dec!(5000),
        };
        let ticker = Ticker {
            last: dec!(4000000),
            bid: dec!(3999000),
            ask: dec!(4001000),
            timestamp: Utc::now(),
        };

        let valuation = Valuation::mark(balance, &ticker, Utc::now());
        assert_eq!(valuation.total, dec!(15000) + dec!(3999000) * dec!(0.75));
    }
}
