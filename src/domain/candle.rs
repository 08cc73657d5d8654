//! Candle aggregation over cadence-aligned windows.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::money::{Price, Volume};
use super::order::OrderSide;
use super::trade::Execution;

/// Buy/sell breakdown computed when rich candles are enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleDetail {
    pub buy_volume: Volume,
    pub sell_volume: Volume,
    pub trades: usize,
    pub vwap: Price,
}

/// OHLCV over the window ending at `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Volume,
    pub detail: Option<CandleDetail>,
}

impl Candle {
    /// A zero-volume candle pinned at `price`.
    #[must_use]
    pub fn flat(timestamp: DateTime<Utc>, price: Price) -> Self {
        Self {
            timestamp,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: Decimal::ZERO,
            detail: None,
        }
    }
}

/// Builds one candle per tick and keeps a bounded history.
#[derive(Debug)]
pub struct CandleBuilder {
    history: VecDeque<Candle>,
    max_len: usize,
    rich: bool,
}

impl CandleBuilder {
    #[must_use]
    pub fn new(max_len: usize, rich: bool) -> Self {
        Self {
            history: VecDeque::with_capacity(max_len.min(4096)),
            max_len: max_len.max(1),
            rich,
        }
    }

    /// Aggregate `executions` into the candle stamped `at` and append it.
    ///
    /// An empty batch yields a flat candle at the previous close, or `None`
    /// when no trade has ever been seen.
    pub fn push(&mut self, executions: &[Execution], at: DateTime<Utc>) -> Option<&Candle> {
        let candle = match executions.split_first() {
            Some((first, rest)) => self.aggregate(first, rest, at),
            None => Candle::flat(at, self.latest()?.close),
        };

        if self.history.len() == self.max_len {
            self.history.pop_front();
        }
        self.history.push_back(candle);
        self.history.back()
    }

    fn aggregate(&self, first: &Execution, rest: &[Execution], at: DateTime<Utc>) -> Candle {
        let mut candle = Candle {
            timestamp: at,
            open: first.price,
            high: first.price,
            low: first.price,
            close: first.price,
            volume: first.size,
            detail: None,
        };
        for e in rest {
            candle.high = candle.high.max(e.price);
            candle.low = candle.low.min(e.price);
            candle.close = e.price;
            candle.volume += e.size;
        }

        if self.rich {
            let all = std::iter::once(first).chain(rest);
            let (mut buy, mut sell, mut notional) = (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
            for e in all {
                match e.side {
                    OrderSide::Buy => buy += e.size,
                    OrderSide::Sell => sell += e.size,
                }
                notional += e.price * e.size;
            }
            let vwap = if candle.volume.is_zero() {
                candle.close
            } else {
                notional / candle.volume
            };
            candle.detail = Some(CandleDetail {
                buy_volume: buy,
                sell_volume: sell,
                trades: rest.len() + 1,
                vwap,
            });
        }
        candle
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Candle> {
        self.history.back()
    }

    /// Candles oldest first.
    pub fn history(&self) -> &VecDeque<Candle> {
        &self.history
    }
}
