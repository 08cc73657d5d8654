//! The cadence engine.
//!
//! Each iteration runs, in order: wait, gate, refresh, snapshot, data,
//! callback. Refresh and callback only run when the entry gate permits.
//! An iteration that fails or panics is logged and the loop carries on.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::balance::BalancePoller;
use super::book::BookTracker;
use super::guard::{guarded, log_failure};
use super::schedule::{boundary_floor, cadence_delay, EntryGate};
use super::settings::{BookMode, EngineSettings, Settings};
use super::state::{AccountState, EngineState};
use super::strategy::{Strategy, StrategyHandle, Tick};
use crate::domain::{Book, CandleBuilder, Pair};
use crate::error::Result;
use crate::port::{Clock, ExchangeClient, MarketFeed};

/// Collaborators the main loop drives.
pub struct MainLoopParts {
    pub settings: Settings,
    pub engine_settings: EngineSettings,
    pub pair: Pair,
    pub exchange: Arc<dyn ExchangeClient>,
    pub account: Arc<AccountState>,
    pub engine: Arc<EngineState>,
    pub feed: Arc<dyn MarketFeed>,
    pub clock: Arc<dyn Clock>,
    pub book: Option<Arc<BookTracker>>,
    pub balance: Arc<BalancePoller>,
    pub handle: StrategyHandle,
}

pub struct MainLoop {
    parts: MainLoopParts,
    strategy: Box<dyn Strategy>,
    candles: CandleBuilder,
    gate: EntryGate,
}

impl MainLoop {
    pub fn new(parts: MainLoopParts, strategy: Box<dyn Strategy>) -> Self {
        let candles = CandleBuilder::new(parts.settings.max_candles, parts.settings.rich_candles);
        let gate = EntryGate::new(parts.settings.minimum_interval, DateTime::UNIX_EPOCH);
        Self {
            parts,
            strategy,
            candles,
            gate,
        }
    }

    /// Refresh the balance once, wait for market data, then tick forever.
    pub async fn run(mut self) {
        self.prime().await;
        loop {
            guarded("main", self.tick()).await;
        }
    }

    /// Startup: one balance refresh, wait for the first trades, then start
    /// the entry gate at the current time so the startup bucket gets no entry.
    pub async fn prime(&mut self) {
        guarded("balance", async { self.parts.balance.refresh().await.map(|_| ()) }).await;

        info!(strategy = self.strategy.name(), "Waiting for market data");
        self.parts.feed.wait_ready().await;
        self.gate.record(self.parts.clock.now());
        info!(
            strategy = self.strategy.name(),
            pair = %self.parts.pair,
            interval = self.parts.settings.interval,
            minimum_interval = self.parts.settings.minimum_interval,
            "Main loop started"
        );
    }

    /// One full iteration.
    pub async fn tick(&mut self) -> Result<()> {
        let now = self.wait().await;
        let permitted = self.gate.permits(now);

        if permitted {
            self.refresh().await?;
        }

        self.parts.engine.set_position(self.parts.account.position());

        let executions = self.parts.feed.next_batch().await;
        let stamp = if self.parts.settings.interval > 0 {
            boundary_floor(now, self.parts.settings.interval)
        } else {
            now
        };
        self.candles.push(&executions, stamp);

        if !permitted {
            debug!(
                last_entry = %self.gate.last_entry(),
                trades = executions.len(),
                "Entry throttled"
            );
            return Ok(());
        }

        self.gate.record(now);
        self.parts.engine.set_last_entry(now);
        let book = self.book_view().await?;

        let tick = Tick {
            now,
            executions: &executions,
            candle: self.candles.latest(),
            history: self.candles.history(),
            book: book.as_ref(),
        };
        self.strategy.on_tick(tick, &self.parts.handle).await
    }

    async fn wait(&self) -> DateTime<Utc> {
        let interval = self.parts.settings.interval;
        if interval > 0 {
            let delay = cadence_delay(self.parts.clock.now(), interval);
            tokio::time::sleep(delay).await;
        } else {
            self.parts.feed.wait_new().await;
        }
        self.parts.clock.now()
    }

    /// Pull fills since the watermark and, in api mode, resync the book.
    ///
    /// An exchange rejection only loses the call that failed; the iteration
    /// carries on with the previous book and position.
    async fn refresh(&self) -> Result<()> {
        if let (BookMode::Api, Some(tracker)) = (self.parts.settings.book, &self.parts.book) {
            match self.parts.exchange.order_book(&self.parts.pair).await {
                Ok(snapshot) => tracker.sync(&snapshot),
                Err(e) if e.is_exchange_rejection() => log_failure("book", &e),
                Err(e) => return Err(e),
            }
        }

        let watermark = self.parts.account.watermark();
        let trades = match self
            .parts
            .exchange
            .my_trades(&self.parts.pair, watermark)
            .await
        {
            Ok(trades) => trades,
            Err(e) if e.is_exchange_rejection() => {
                log_failure("trades", &e);
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        if !trades.is_empty() {
            let applied = self.parts.account.ingest_trades(&trades);
            let position = self.parts.account.position();
            info!(
                applied,
                watermark = ?self.parts.account.watermark(),
                position = %position.position_size,
                avg_price = %position.avg_price,
                "Own trades ingested"
            );
        }
        Ok(())
    }

    /// Current book, resynced first when it looks stale.
    async fn book_view(&self) -> Result<Option<Book>> {
        let Some(tracker) = &self.parts.book else {
            return Ok(None);
        };
        if tracker.is_stale(self.parts.engine_settings.book_resync_spread) {
            warn!(pair = %self.parts.pair, "Order book looks stale, resyncing");
            let snapshot = self.parts.exchange.order_book(&self.parts.pair).await?;
            tracker.sync(&snapshot);
        }
        Ok(Some(tracker.snapshot()))
    }
}
