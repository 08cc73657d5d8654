//! A decision function that only watches.

use async_trait::async_trait;
use tracing::info;

use crate::application::{Strategy, StrategyHandle, Tick};
use crate::error::Result;

/// Logs each candle and the current position. Never trades.
#[derive(Debug, Default)]
pub struct Observer {
    ticks: u64,
}

impl Observer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[async_trait]
impl Strategy for Observer {
    fn name(&self) -> &'static str {
        "observer"
    }

    async fn on_tick(&mut self, tick: Tick<'_>, handle: &StrategyHandle) -> Result<()> {
        self.ticks += 1;
        let position = handle.position();
        match tick.candle {
            Some(candle) => info!(
                tick = self.ticks,
                at = %candle.timestamp,
                open = %candle.open,
                high = %candle.high,
                low = %candle.low,
                close = %candle.close,
                volume = %candle.volume,
                trades = tick.executions.len(),
                position = %position.position_size,
                "Candle"
            ),
            None => info!(tick = self.ticks, "No trades yet"),
        }
        if let Some(book) = tick.book {
            info!(
                bid = ?book.best_bid().map(|l| l.price()),
                ask = ?book.best_ask().map(|l| l.price()),
                "Book"
            );
        }
        Ok(())
    }
}
