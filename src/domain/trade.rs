//! Market executions and the account's own fills.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ExchangeOrderId, TradeId};
use super::money::{Price, Volume};
use super::order::OrderSide;

/// A public trade from the market-data feed. `side` is the taker side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub id: TradeId,
    pub price: Price,
    pub size: Volume,
    pub side: OrderSide,
    pub timestamp: DateTime<Utc>,
}

/// A fill of one of the account's own orders.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnTrade {
    pub id: TradeId,
    pub order_id: ExchangeOrderId,
    pub side: OrderSide,
    pub price: Price,
    pub size: Volume,
    pub fee: Price,
    pub timestamp: DateTime<Utc>,
}
