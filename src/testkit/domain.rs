//! Builders for domain primitives used across tests.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::domain::{
    Book, Execution, ExchangeOrderId, OrderSide, OwnTrade, PriceLevel, ProductSpec, TradeId,
};

/// `BTC/USD`: tick 0.01, size step 0.0001, min size 0.0001.
pub fn product() -> ProductSpec {
    ProductSpec::resolve("BTC/USD").expect("btc_usd is a known product")
}

/// Seconds since the epoch as a UTC timestamp.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
}

pub fn execution(id: u64, price: Decimal, size: Decimal) -> Execution {
    Execution {
        id: TradeId::new(id),
        price,
        size,
        side: OrderSide::Buy,
        timestamp: at(1_700_000_000),
    }
}

pub fn own_trade(
    id: u64,
    order_id: &str,
    side: OrderSide,
    price: Decimal,
    size: Decimal,
) -> OwnTrade {
    OwnTrade {
        id: TradeId::new(id),
        order_id: ExchangeOrderId::new(order_id),
        side,
        price,
        size,
        fee: Decimal::ZERO,
        timestamp: at(1_700_000_000),
    }
}

/// One level each side.
pub fn book(bid: Decimal, ask: Decimal) -> Book {
    Book::from_levels(
        vec![PriceLevel::new(bid, Decimal::ONE)],
        vec![PriceLevel::new(ask, Decimal::ONE)],
    )
}
