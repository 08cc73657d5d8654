//! Periodic account valuation.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::guard::guarded;
use super::state::EngineState;
use crate::domain::{Pair, Valuation};
use crate::error::Result;
use crate::port::{Clock, ExchangeClient};

pub struct BalancePoller {
    exchange: Arc<dyn ExchangeClient>,
    engine: Arc<EngineState>,
    clock: Arc<dyn Clock>,
    pair: Pair,
    period: Duration,
}

impl BalancePoller {
    pub fn new(
        exchange: Arc<dyn ExchangeClient>,
        engine: Arc<EngineState>,
        clock: Arc<dyn Clock>,
        pair: Pair,
        period: Duration,
    ) -> Self {
        Self {
            exchange,
            engine,
            clock,
            pair,
            period,
        }
    }

    /// Fetch ticker and balance, then publish the valuation.
    pub async fn refresh(&self) -> Result<Valuation> {
        let ticker = self.exchange.ticker(&self.pair).await?;
        let balance = self.exchange.balance(&self.pair).await?;
        let valuation = Valuation::mark(balance, &ticker, self.clock.now());
        info!(
            pair = %self.pair,
            base = %valuation.balance.base_total(),
            quote = %valuation.balance.quote_total(),
            bid = %valuation.bid,
            total = %valuation.total,
            "Balance refreshed"
        );
        self.engine.set_valuation(valuation.clone());
        Ok(valuation)
    }

    pub async fn run(&self) {
        loop {
            tokio::time::sleep(self.period).await;
            guarded("balance", async { self.refresh().await.map(|_| ()) }).await;
        }
    }
}
