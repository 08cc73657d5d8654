//! Exchange-agnostic domain types: orders, fills, positions, candles, books.

pub mod balance;
pub mod book;
pub mod candle;
pub mod error;
pub mod id;
pub mod money;
pub mod order;
pub mod position;
pub mod product;
pub mod trade;

pub use balance::{Balance, Ticker, Valuation};
pub use book::{Book, BookDelta, PriceLevel};
pub use candle::{Candle, CandleBuilder, CandleDetail};
pub use error::DomainError;
pub use id::{ClientOrderId, ExchangeOrderId, Pair, TradeId};
pub use money::{Price, Volume};
pub use order::{
    OpenOrder, OrderAck, OrderKind, OrderRecord, OrderRequest, OrderSide, OrderStatus,
};
pub use position::{Position, PositionSnapshot};
pub use product::ProductSpec;
pub use trade::{Execution, OwnTrade};
