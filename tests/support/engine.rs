use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use strategist::application::{
    AccountState, BalancePoller, BookTracker, EngineSettings, EngineState, MainLoop,
    MainLoopParts, OrderReconciler, Settings, Strategy, StrategyHandle,
};
use strategist::infrastructure::feed::TradeEndpoint;
use strategist::port::{Clock, ExchangeClient};
use strategist::testkit::clock::ManualClock;
use strategist::testkit::domain::product;
use strategist::testkit::exchange::ScriptedExchange;

/// A reconciler wired to a scripted exchange and a fresh ledger.
pub struct Rig {
    pub exchange: Arc<ScriptedExchange>,
    pub account: Arc<AccountState>,
    pub engine: Arc<EngineState>,
    pub clock: Arc<ManualClock>,
    pub reconciler: OrderReconciler,
}

pub fn rig(start: DateTime<Utc>) -> Rig {
    let exchange = Arc::new(ScriptedExchange::new());
    let account = Arc::new(AccountState::new(Duration::from_secs(600)));
    let clock = Arc::new(ManualClock::new(start));
    let reconciler = OrderReconciler::new(
        exchange.clone() as Arc<dyn ExchangeClient>,
        Arc::clone(&account),
        product(),
        clock.clone() as Arc<dyn Clock>,
    );
    Rig {
        exchange,
        account,
        engine: Arc::new(EngineState::new()),
        clock,
        reconciler,
    }
}

impl Rig {
    pub fn handle(&self) -> StrategyHandle {
        StrategyHandle::new(self.reconciler.clone(), Arc::clone(&self.engine))
    }

    /// A main loop reading from `endpoint` and driving `strategy`.
    pub fn main_loop(
        &self,
        settings: Settings,
        endpoint: Arc<TradeEndpoint>,
        book: Option<Arc<BookTracker>>,
        strategy: Box<dyn Strategy>,
    ) -> MainLoop {
        let exchange: Arc<dyn ExchangeClient> = self.exchange.clone();
        let clock: Arc<dyn Clock> = self.clock.clone();
        let pair = product().pair().clone();
        let balance = Arc::new(BalancePoller::new(
            Arc::clone(&exchange),
            Arc::clone(&self.engine),
            Arc::clone(&clock),
            pair.clone(),
            Duration::from_secs(300),
        ));
        MainLoop::new(
            MainLoopParts {
                settings,
                engine_settings: EngineSettings::default(),
                pair,
                exchange,
                account: Arc::clone(&self.account),
                engine: Arc::clone(&self.engine),
                feed: endpoint,
                clock,
                book,
                balance,
                handle: self.handle(),
            },
            strategy,
        )
    }
}

/// Event-driven settings for the test product.
pub fn event_settings(minimum_interval: u64) -> Settings {
    Settings {
        symbol: "BTC/USD".into(),
        interval: 0,
        minimum_interval,
        ..Settings::default()
    }
}
