//! Exchange port: the remote venue the engine reconciles against.
//!
//! Every call may fail with [`Error::Exchange`](crate::error::Error::Exchange)
//! for expected rejections, or with any other variant for unclassified faults.

use async_trait::async_trait;

use crate::domain::{
    Balance, Book, ExchangeOrderId, OpenOrder, OrderAck, OrderRequest, OwnTrade, Pair, Ticker,
    TradeId,
};
use crate::error::Error;

/// Order placement, cancellation and account queries.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Submit a new order.
    async fn submit_order(&self, request: &OrderRequest) -> Result<OrderAck, Error>;

    /// Cancel an order by its exchange id.
    async fn cancel_order(&self, pair: &Pair, order_id: &ExchangeOrderId) -> Result<(), Error>;

    async fn ticker(&self, pair: &Pair) -> Result<Ticker, Error>;

    async fn balance(&self, pair: &Pair) -> Result<Balance, Error>;

    /// Own fills with an id strictly greater than `since`, oldest first.
    async fn my_trades(&self, pair: &Pair, since: Option<TradeId>) -> Result<Vec<OwnTrade>, Error>;

    /// All orders the exchange currently holds open.
    async fn open_orders(&self, pair: &Pair) -> Result<Vec<OpenOrder>, Error>;

    /// Full order book snapshot.
    async fn order_book(&self, pair: &Pair) -> Result<Book, Error>;

    /// Get the exchange name for logging/debugging.
    fn exchange_name(&self) -> &'static str;
}
