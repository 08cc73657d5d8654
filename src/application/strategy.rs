//! The user decision function and the handle it trades through.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//! use strategist::application::{OrderIntent, Strategy, StrategyHandle, Tick};
//! use strategist::domain::OrderSide;
//!
//! struct BuyTheDip;
//!
//! #[async_trait]
//! impl Strategy for BuyTheDip {
//!     fn name(&self) -> &'static str { "buy_the_dip" }
//!
//!     async fn on_tick(&mut self, tick: Tick<'_>, handle: &StrategyHandle) -> strategist::Result<()> {
//!         if let Some(candle) = tick.candle {
//!             let intent = OrderIntent::limit("dip", OrderSide::Buy, dec!(0.01), candle.low);
//!             handle.order(intent).await?;
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::reconciler::{OrderIntent, OrderOutcome, OrderReconciler};
use super::state::EngineState;
use crate::domain::{
    Book, Candle, ClientOrderId, Execution, OrderRecord, PositionSnapshot, ProductSpec, Valuation,
};
use crate::error::Result;

/// Market data passed to one invocation of the decision function.
#[derive(Debug, Clone, Copy)]
pub struct Tick<'a> {
    pub now: DateTime<Utc>,
    /// Executions received since the previous tick, oldest first.
    pub executions: &'a [Execution],
    /// Candle built from `executions`; `None` before the first trade.
    pub candle: Option<&'a Candle>,
    /// Candle history, oldest first.
    pub history: &'a VecDeque<Candle>,
    /// Order book, when tracking is enabled.
    pub book: Option<&'a Book>,
}

/// A trading decision function driven by the main loop.
#[async_trait]
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Called on every permitted entry.
    async fn on_tick(&mut self, tick: Tick<'_>, handle: &StrategyHandle) -> Result<()>;
}

/// What the decision function can do and see.
#[derive(Clone)]
pub struct StrategyHandle {
    reconciler: OrderReconciler,
    engine: Arc<EngineState>,
}

impl StrategyHandle {
    pub fn new(reconciler: OrderReconciler, engine: Arc<EngineState>) -> Self {
        Self { reconciler, engine }
    }

    pub async fn order(&self, intent: OrderIntent) -> Result<OrderOutcome> {
        self.reconciler.order(intent).await
    }

    pub async fn cancel(&self, client_id: impl Into<ClientOrderId>) {
        self.reconciler.cancel(&client_id.into()).await;
    }

    pub async fn cancel_order_all(&self) {
        self.reconciler.cancel_order_all().await;
    }

    pub fn get_order(&self, client_id: impl Into<ClientOrderId>) -> Option<OrderRecord> {
        self.reconciler.account().order(&client_id.into())
    }

    /// Position as of the start of this tick.
    pub fn position(&self) -> PositionSnapshot {
        self.engine.position()
    }

    pub fn valuation(&self) -> Option<Valuation> {
        self.engine.valuation()
    }

    pub fn product(&self) -> &ProductSpec {
        self.reconciler.product()
    }
}
