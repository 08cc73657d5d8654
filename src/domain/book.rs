//! Order book types for market depth representation.
//!
//! - [`PriceLevel`] - A single price level with size
//! - [`Book`] - Sorted snapshot of both sides
//! - [`BookDelta`] - Incremental level changes from the live feed
//!
//! # Order Book Structure
//!
//! An order book has two sides:
//! - **Bids**: Buy orders, sorted by price descending (best bid first)
//! - **Asks**: Sell orders, sorted by price ascending (best ask first)
//!
//! # Examples
//!
//! ```
//! use strategist::domain::{Book, PriceLevel};
//! use rust_decimal_macros::dec;
//!
//! let book = Book::from_levels(
//!     vec![PriceLevel::new(dec!(99), dec!(1)), PriceLevel::new(dec!(100), dec!(2))],
//!     vec![PriceLevel::new(dec!(101), dec!(1))],
//! );
//!
//! assert_eq!(book.best_bid().unwrap().price(), dec!(100));
//! assert_eq!(book.spread(), Some(dec!(1)));
//! ```

use serde::{Deserialize, Serialize};

use super::money::{Price, Volume};

/// A single price level in an order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    price: Price,
    size: Volume,
}

impl PriceLevel {
    #[must_use]
    pub const fn new(price: Price, size: Volume) -> Self {
        Self { price, size }
    }

    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    #[must_use]
    pub const fn size(&self) -> Volume {
        self.size
    }
}

/// Sorted order book snapshot.
///
/// Bids are sorted descending, asks are sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Book {
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
}

impl Book {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bids: Vec::new(),
            asks: Vec::new(),
        }
    }

    /// Build a book from levels in any order; empty levels are dropped.
    #[must_use]
    pub fn from_levels(mut bids: Vec<PriceLevel>, mut asks: Vec<PriceLevel>) -> Self {
        bids.retain(|l| !l.size.is_zero());
        asks.retain(|l| !l.size.is_zero());
        bids.sort_by(|a, b| b.price.cmp(&a.price));
        asks.sort_by(|a, b| a.price.cmp(&b.price));
        Self { bids, asks }
    }

    #[must_use]
    pub fn bids(&self) -> &[PriceLevel] {
        &self.bids
    }

    #[must_use]
    pub fn asks(&self) -> &[PriceLevel] {
        &self.asks
    }

    #[must_use]
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }

    /// Best ask minus best bid. Negative when the book is crossed.
    #[must_use]
    pub fn spread(&self) -> Option<Price> {
        Some(self.best_ask()?.price - self.best_bid()?.price)
    }

    #[must_use]
    pub fn mid(&self) -> Option<Price> {
        Some((self.best_ask()?.price + self.best_bid()?.price) / rust_decimal::Decimal::TWO)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

/// Level changes for both sides. A zero size removes the level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDelta {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}
