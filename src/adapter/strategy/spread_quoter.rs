//! Two-sided quoting around a reference price.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

use crate::application::{OrderIntent, Strategy, StrategyHandle, Tick};
use crate::domain::{OrderSide, Price};
use crate::error::Result;
use crate::infrastructure::config::SpreadQuoterConfig;

pub const BID: &str = "bid";
pub const ASK: &str = "ask";

/// Keeps one bid (client id `bid`) and one ask (client id `ask`) resting at
/// `half_spread` around the book mid, or the candle close without a book.
/// The side that would push the position past `max_position` is pulled.
#[derive(Debug)]
pub struct SpreadQuoter {
    config: SpreadQuoterConfig,
}

impl SpreadQuoter {
    #[must_use]
    pub const fn new(config: SpreadQuoterConfig) -> Self {
        Self { config }
    }

    /// Bid and ask around `reference`.
    #[must_use]
    pub fn quotes(&self, reference: Price) -> (Price, Price) {
        let offset = reference * self.config.half_spread;
        (reference - offset, reference + offset)
    }

    fn intent(&self, client_id: &str, side: OrderSide, price: Price) -> OrderIntent {
        let intent = OrderIntent::limit(client_id, side, self.config.size, price)
            .limit_mask(self.config.limit_mask);
        match self.config.cancel_after_secs {
            Some(secs) => intent.cancel_after(Duration::from_secs(secs)),
            None => intent,
        }
    }
}

#[async_trait]
impl Strategy for SpreadQuoter {
    fn name(&self) -> &'static str {
        "spread_quoter"
    }

    async fn on_tick(&mut self, tick: Tick<'_>, handle: &StrategyHandle) -> Result<()> {
        let reference = tick
            .book
            .and_then(|b| b.mid())
            .or_else(|| tick.candle.map(|c| c.close));
        let Some(reference) = reference.filter(|r| *r > Decimal::ZERO) else {
            debug!("No reference price, not quoting");
            return Ok(());
        };

        let (bid, ask) = self.quotes(reference);
        let position = handle.position().position_size;

        if position < self.config.max_position {
            handle.order(self.intent(BID, OrderSide::Buy, bid)).await?;
        } else {
            handle.cancel(BID).await;
        }

        if position > -self.config.max_position {
            handle.order(self.intent(ASK, OrderSide::Sell, ask)).await?;
        } else {
            handle.cancel(ASK).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn quotes_straddle_reference() {
        let quoter = SpreadQuoter::new(SpreadQuoterConfig {
            half_spread: dec!(0.01),
            ..SpreadQuoterConfig::default()
        });
        assert_eq!(quoter.quotes(dec!(1000)), (dec!(990), dec!(1010)));
    }

    #[test]
    fn intent_carries_mask_and_deferred_cancel() {
        let quoter = SpreadQuoter::new(SpreadQuoterConfig {
            limit_mask: dec!(5),
            cancel_after_secs: Some(30),
            ..SpreadQuoterConfig::default()
        });
        let intent = quoter.intent(BID, OrderSide::Buy, dec!(100));
        assert_eq!(intent.limit_mask, dec!(5));
        assert_eq!(intent.cancel_after, Some(Duration::from_secs(30)));
        assert_eq!(intent.client_id.as_str(), "bid");
    }
}
