//! Wires the engine's tasks to their collaborators and runs them together.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::application::{
    AccountState, BalancePoller, BookMode, BookTracker, EngineSettings, EngineState, MainLoop,
    MainLoopParts, OrderReconciler, Settings, StaleOrderReaper, Strategy, StrategyHandle,
};
use crate::domain::ProductSpec;
use crate::error::Result;
use crate::infrastructure::config::ReconnectionConfig;
use crate::infrastructure::feed::{FeedRunner, TradeEndpoint};
use crate::port::{Clock, ExchangeClient, MarketFeed, TradeSource};

/// Everything the engine needs from the outside.
pub struct SupervisorParts<S> {
    pub settings: Settings,
    pub engine: EngineSettings,
    pub product: ProductSpec,
    pub exchange: Arc<dyn ExchangeClient>,
    pub source: S,
    pub reconnection: ReconnectionConfig,
    pub strategy: Box<dyn Strategy>,
    pub clock: Arc<dyn Clock>,
}

/// Owns the shared state and starts every long-running task.
pub struct Supervisor<S> {
    parts: SupervisorParts<S>,
    endpoint: Arc<TradeEndpoint>,
    account: Arc<AccountState>,
    engine_state: Arc<EngineState>,
}

impl<S: TradeSource> Supervisor<S> {
    pub fn new(parts: SupervisorParts<S>) -> Self {
        let endpoint = Arc::new(TradeEndpoint::new(parts.engine.feed_capacity));
        let account = Arc::new(AccountState::new(Duration::from_secs(
            parts.engine.order_retention_secs,
        )));
        Self {
            parts,
            endpoint,
            account,
            engine_state: Arc::new(EngineState::new()),
        }
    }

    #[must_use]
    pub fn account(&self) -> Arc<AccountState> {
        Arc::clone(&self.account)
    }

    #[must_use]
    pub fn engine_state(&self) -> Arc<EngineState> {
        Arc::clone(&self.engine_state)
    }

    #[must_use]
    pub fn endpoint(&self) -> Arc<TradeEndpoint> {
        Arc::clone(&self.endpoint)
    }

    /// Run the main loop, reaper, balance poller, ledger maintenance and the
    /// feed task for the rest of the process.
    ///
    /// Only startup can fail. The tasks are joined, not raced: if one of
    /// them ever returned, the others would keep running.
    pub async fn start(self) -> Result<()> {
        let Self {
            parts,
            endpoint,
            account,
            engine_state,
        } = self;
        let pair = parts.product.pair().clone();
        let secs = Duration::from_secs;

        let book = match parts.settings.book {
            BookMode::Off => None,
            BookMode::Stream => {
                let tracker = Arc::new(BookTracker::new());
                let snapshot = parts.exchange.order_book(&pair).await?;
                tracker.sync(&snapshot);
                Arc::clone(&tracker).attach(endpoint.subscribe());
                Some(tracker)
            }
            BookMode::Api => Some(Arc::new(BookTracker::new())),
        };

        let reconciler = OrderReconciler::new(
            Arc::clone(&parts.exchange),
            Arc::clone(&account),
            parts.product.clone(),
            Arc::clone(&parts.clock),
        );
        let handle = StrategyHandle::new(reconciler.clone(), Arc::clone(&engine_state));
        let balance = Arc::new(BalancePoller::new(
            Arc::clone(&parts.exchange),
            Arc::clone(&engine_state),
            Arc::clone(&parts.clock),
            pair.clone(),
            secs(parts.engine.balance_interval_secs),
        ));
        let reaper = StaleOrderReaper::new(
            Arc::clone(&parts.exchange),
            reconciler,
            secs(parts.engine.reaper_interval_secs),
        );
        let maintenance_period = secs(parts.engine.maintenance_interval_secs);

        info!(
            pair = %pair,
            exchange = parts.exchange.exchange_name(),
            source = parts.source.source_name(),
            strategy = parts.strategy.name(),
            book = ?parts.settings.book,
            feed_capacity = parts.engine.feed_capacity,
            "Engine starting"
        );

        let feed: Arc<dyn MarketFeed> = endpoint.clone();
        let runner = FeedRunner::new(
            parts.source,
            pair.clone(),
            Arc::clone(&endpoint),
            parts.reconnection,
        );
        let main_loop = MainLoop::new(
            MainLoopParts {
                settings: parts.settings,
                engine_settings: parts.engine,
                pair,
                exchange: parts.exchange,
                account: Arc::clone(&account),
                engine: engine_state,
                feed,
                clock: Arc::clone(&parts.clock),
                book,
                balance: Arc::clone(&balance),
                handle,
            },
            parts.strategy,
        );

        tokio::join!(
            main_loop.run(),
            reaper.run(),
            balance.run(),
            account.run_maintenance(maintenance_period, parts.clock),
            runner.run(),
        );
        Ok(())
    }
}
