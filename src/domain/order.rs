//! Order types and the local order record.
//!
//! [`OrderStatus`] is partitioned into open and closed variants; the
//! reconciler only ever asks [`OrderStatus::is_open`].

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{ClientOrderId, ExchangeOrderId, Pair};
use super::money::{Price, Volume};

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// +1 for buys, -1 for sells.
    #[must_use]
    pub fn sign(&self) -> Decimal {
        match self {
            Self::Buy => Decimal::ONE,
            Self::Sell => Decimal::NEGATIVE_ONE,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Limit,
    Market,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Limit => "limit",
            Self::Market => "market",
        })
    }
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Submitted,
    PartiallyFilled,
    PendingCancel,
    Filled,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    /// Returns true while the exchange may still hold the order.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        match self {
            Self::Submitted | Self::PartiallyFilled | Self::PendingCancel => true,
            Self::Filled | Self::Cancelled | Self::Rejected => false,
        }
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        !self.is_open()
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::PartiallyFilled => "partially_filled",
            Self::PendingCancel => "pending_cancel",
            Self::Filled => "filled",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order about to be sent to the exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub pair: Pair,
    pub side: OrderSide,
    pub size: Volume,
    /// `None` submits a market order.
    pub price: Option<Price>,
}

impl OrderRequest {
    #[must_use]
    pub const fn kind(&self) -> OrderKind {
        match self.price {
            Some(_) => OrderKind::Limit,
            None => OrderKind::Market,
        }
    }
}

/// The exchange's acknowledgement of a submitted order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderAck {
    pub id: ExchangeOrderId,
    pub pair: Pair,
    pub side: OrderSide,
    pub kind: OrderKind,
    pub price: Option<Price>,
    pub size: Volume,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// An order the exchange currently reports as open.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenOrder {
    pub id: ExchangeOrderId,
    pub pair: Pair,
    pub side: OrderSide,
    pub kind: OrderKind,
    pub price: Option<Price>,
    pub pending_size: Volume,
    pub created_at: DateTime<Utc>,
}

/// Local bookkeeping for the latest order placed under a client id.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub client_id: ClientOrderId,
    pub exchange_id: ExchangeOrderId,
    pub status: OrderStatus,
    pub side: OrderSide,
    pub kind: OrderKind,
    pub price: Option<Price>,
    pub size: Volume,
    pub executed: Volume,
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    pub fn from_ack(client_id: ClientOrderId, ack: OrderAck) -> Self {
        Self {
            client_id,
            exchange_id: ack.id,
            status: ack.status,
            side: ack.side,
            kind: ack.kind,
            price: ack.price,
            size: ack.size,
            executed: Decimal::ZERO,
            created_at: ack.created_at,
        }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.status.is_open()
    }

    #[must_use]
    pub fn remaining(&self) -> Volume {
        (self.size - self.executed).max(Decimal::ZERO)
    }

    /// Apply an execution against this order and advance its status.
    pub fn apply_fill(&mut self, size: Volume) {
        self.executed += size;
        if self.executed >= self.size {
            self.status = OrderStatus::Filled;
        } else if self.status == OrderStatus::Submitted {
            self.status = OrderStatus::PartiallyFilled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(size: Decimal) -> OrderRecord {
        OrderRecord::from_ack(
            ClientOrderId::new("bid"),
            OrderAck {
                id: ExchangeOrderId::new("x1"),
                pair: Pair::from_symbol("BTC/JPY").unwrap(),
                side: OrderSide::Buy,
                kind: OrderKind::Limit,
                price: Some(dec!(100)),
                size,
                status: OrderStatus::Submitted,
                created_at: Utc::now(),
            },
        )
    }

    #[test]
    fn status_partition_is_exhaustive() {
        let open = [
            OrderStatus::Submitted,
            OrderStatus::PartiallyFilled,
            OrderStatus::PendingCancel,
        ];
        let closed = [
            OrderStatus::Filled,
            OrderStatus::Cancelled,
            OrderStatus::Rejected,
        ];
        assert!(open.iter().all(OrderStatus::is_open));
        assert!(closed.iter().all(OrderStatus::is_closed));
    }

    #[test]
    fn fills_advance_status() {
        let mut order = record(dec!(1));
        order.apply_fill(dec!(0.4));
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert_eq!(order.remaining(), dec!(0.6));

        order.apply_fill(dec!(0.6));
        assert_eq!(order.status, OrderStatus::Filled);
        assert!(!order.is_open());
    }

    #[test]
    fn market_requests_have_no_price() {
        let request = OrderRequest {
            pair: Pair::from_symbol("BTC/JPY").unwrap(),
            side: OrderSide::Sell,
            size: dec!(1),
            price: None,
        };
        assert_eq!(request.kind(), OrderKind::Market);
    }
}
