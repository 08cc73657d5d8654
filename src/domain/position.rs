//! Net position tracking from fills.

use rust_decimal::Decimal;

use super::money::{Price, Volume};
use super::order::OrderSide;

/// Read-only copy of the position handed to the decision function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionSnapshot {
    pub long_size: Volume,
    pub short_size: Volume,
    /// Signed net size: long minus short.
    pub position_size: Volume,
    /// Volume-weighted entry price of the current net position.
    pub avg_price: Price,
}

/// Running net position built from fills.
#[derive(Debug, Clone, Default)]
pub struct Position {
    net: Volume,
    avg_price: Price,
}

impl Position {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one fill.
    ///
    /// Increasing the position re-weights the entry price, reducing it keeps
    /// the entry price, and flipping through zero restarts at the fill price.
    pub fn apply(&mut self, side: OrderSide, size: Volume, price: Price) {
        if size.is_zero() {
            return;
        }
        let delta = side.sign() * size;
        let next = self.net + delta;

        if self.net.is_zero() || self.net.is_sign_positive() == delta.is_sign_positive() {
            let notional = self.net.abs() * self.avg_price + size * price;
            self.avg_price = notional / next.abs();
        } else if next.is_zero() {
            self.avg_price = Decimal::ZERO;
        } else if next.is_sign_positive() != self.net.is_sign_positive() {
            self.avg_price = price;
        }
        self.net = next;
    }

    #[must_use]
    pub fn snapshot(&self) -> PositionSnapshot {
        PositionSnapshot {
            long_size: self.net.max(Decimal::ZERO),
            short_size: (-self.net).max(Decimal::ZERO),
            position_size: self.net,
            avg_price: self.avg_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn buys_weight_the_entry_price() {
        let mut position = Position::new();
        position.apply(OrderSide::Buy, dec!(1), dec!(100));
        position.apply(OrderSide::Buy, dec!(3), dec!(200));

        let snap = position.snapshot();
        assert_eq!(snap.long_size, dec!(4));
        assert_eq!(snap.short_size, dec!(0));
        assert_eq!(snap.avg_price, dec!(175));
    }

    #[test]
    fn reducing_keeps_entry_price() {
        let mut position = Position::new();
        position.apply(OrderSide::Buy, dec!(2), dec!(100));
        position.apply(OrderSide::Sell, dec!(1), dec!(150));

        let snap = position.snapshot();
        assert_eq!(snap.position_size, dec!(1));
        assert_eq!(snap.avg_price, dec!(100));
    }

    #[test]
    fn flipping_restarts_at_fill_price() {
        let mut position = Position::new();
        position.apply(OrderSide::Buy, dec!(1), dec!(100));
        position.apply(OrderSide::Sell, dec!(3), dec!(90));

        let snap = position.snapshot();
        assert_eq!(snap.position_size, dec!(-2));
        assert_eq!(snap.short_size, dec!(2));
        assert_eq!(snap.long_size, dec!(0));
        assert_eq!(snap.avg_price, dec!(90));
    }

    #[test]
    fn closing_flat_clears_entry_price() {
        let mut position = Position::new();
        position.apply(OrderSide::Sell, dec!(1), dec!(100));
        position.apply(OrderSide::Buy, dec!(1), dec!(80));
        assert_eq!(position.snapshot(), PositionSnapshot::default());
    }
}
