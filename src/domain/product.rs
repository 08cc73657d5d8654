//! Tradeable product specifications.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::DomainError;
use super::id::Pair;
use super::money::{Price, Volume};

/// Trading constraints for one pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSpec {
    pair: Pair,
    min_size: Volume,
    size_step: Volume,
    tick_size: Price,
}

/// Built-in table: pair key, minimum size, size step, price tick.
const PRODUCTS: &[(&str, Decimal, Decimal, Decimal)] = &[
    ("btc_jpy", dec!(0.001), dec!(0.0001), dec!(1)),
    ("eth_jpy", dec!(0.01), dec!(0.0001), dec!(1)),
    ("eth_btc", dec!(0.01), dec!(0.0001), dec!(0.00000001)),
    ("xrp_jpy", dec!(1), dec!(0.000001), dec!(0.001)),
    ("btc_usd", dec!(0.0001), dec!(0.0001), dec!(0.01)),
];

impl ProductSpec {
    #[must_use]
    pub const fn new(pair: Pair, min_size: Volume, size_step: Volume, tick_size: Price) -> Self {
        Self {
            pair,
            min_size,
            size_step,
            tick_size,
        }
    }

    /// Resolve a `BASE/QUOTE` symbol against the built-in product table.
    pub fn resolve(symbol: &str) -> Result<Self, DomainError> {
        let pair = Pair::from_symbol(symbol)?;
        PRODUCTS
            .iter()
            .find(|(key, ..)| *key == pair.as_str())
            .map(|&(_, min_size, size_step, tick_size)| {
                Self::new(pair.clone(), min_size, size_step, tick_size)
            })
            .ok_or_else(|| DomainError::UnknownProduct {
                pair: pair.to_string(),
            })
    }

    #[must_use]
    pub const fn pair(&self) -> &Pair {
        &self.pair
    }

    #[must_use]
    pub const fn min_size(&self) -> Volume {
        self.min_size
    }

    #[must_use]
    pub const fn tick_size(&self) -> Price {
        self.tick_size
    }

    /// Round a price to the nearest tick.
    #[must_use]
    pub fn round_price(&self, price: Price) -> Price {
        if self.tick_size.is_zero() {
            return price;
        }
        ((price / self.tick_size).round() * self.tick_size).normalize()
    }

    /// Truncate a size down to the size step.
    #[must_use]
    pub fn round_size(&self, size: Volume) -> Volume {
        if self.size_step.is_zero() {
            return size;
        }
        ((size / self.size_step).floor() * self.size_step).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_symbol() {
        let product = ProductSpec::resolve("BTC/JPY").unwrap();
        assert_eq!(product.pair().as_str(), "btc_jpy");
        assert_eq!(product.min_size(), dec!(0.001));
    }

    #[test]
    fn unknown_symbol_fails() {
        assert_eq!(
            ProductSpec::resolve("DOGE/EUR"),
            Err(DomainError::UnknownProduct {
                pair: "doge_eur".into()
            })
        );
    }

    #[test]
    fn rounds_price_to_tick_and_truncates_size() {
        let product = ProductSpec::resolve("BTC/JPY").unwrap();
        assert_eq!(product.round_price(dec!(100.5)), dec!(100));
        assert_eq!(product.round_price(dec!(100.6)), dec!(101));
        assert_eq!(product.round_size(dec!(0.12349)), dec!(0.1234));
    }
}
