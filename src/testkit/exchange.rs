//! An in-memory [`ExchangeClient`] that records calls and fails on demand.
//!
//! Submitted orders rest on a simple open-order list until cancelled.
//! Failures are queued per call kind and consumed one per call.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::domain::{
    Balance, Book, ExchangeOrderId, OpenOrder, OrderAck, OrderRequest, OrderStatus, OwnTrade,
    Pair, Ticker, TradeId,
};
use crate::error::Error;
use crate::port::ExchangeClient;

/// One recorded exchange call.
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeCall {
    Submit(OrderRequest),
    Cancel(ExchangeOrderId),
    Ticker,
    Balance,
    MyTrades(Option<TradeId>),
    OpenOrders,
    OrderBook,
}

#[derive(Default)]
struct Script {
    calls: Vec<ExchangeCall>,
    submit_failures: VecDeque<Error>,
    cancel_failures: VecDeque<Error>,
    open_orders_failures: VecDeque<Error>,
    my_trades_failures: VecDeque<Error>,
    order_book_failures: VecDeque<Error>,
    ticker_failures: VecDeque<Error>,
    open: Vec<OpenOrder>,
    trades: Vec<OwnTrade>,
    book: Book,
    balance: Balance,
    next_id: u64,
}

#[derive(Default)]
pub struct ScriptedExchange {
    script: Mutex<Script>,
}

impl ScriptedExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_submit(&self, err: impl Into<Error>) {
        self.script.lock().submit_failures.push_back(err.into());
    }

    pub fn fail_next_cancel(&self, err: impl Into<Error>) {
        self.script.lock().cancel_failures.push_back(err.into());
    }

    pub fn fail_next_open_orders(&self, err: impl Into<Error>) {
        self.script.lock().open_orders_failures.push_back(err.into());
    }

    pub fn fail_next_my_trades(&self, err: impl Into<Error>) {
        self.script.lock().my_trades_failures.push_back(err.into());
    }

    pub fn fail_next_order_book(&self, err: impl Into<Error>) {
        self.script.lock().order_book_failures.push_back(err.into());
    }

    pub fn fail_next_ticker(&self, err: impl Into<Error>) {
        self.script.lock().ticker_failures.push_back(err.into());
    }

    /// Fills returned by `my_trades`, filtered by the caller's watermark.
    pub fn push_trades(&self, trades: impl IntoIterator<Item = OwnTrade>) {
        self.script.lock().trades.extend(trades);
    }

    pub fn set_book(&self, book: Book) {
        self.script.lock().book = book;
    }

    pub fn set_balance(&self, balance: Balance) {
        self.script.lock().balance = balance;
    }

    /// Drop an order from the open list, as if it had filled.
    pub fn close(&self, id: &ExchangeOrderId) {
        self.script.lock().open.retain(|o| &o.id != id);
    }

    pub fn calls(&self) -> Vec<ExchangeCall> {
        self.script.lock().calls.clone()
    }

    pub fn submits(&self) -> Vec<OrderRequest> {
        self.script
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                ExchangeCall::Submit(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn cancels(&self) -> Vec<ExchangeOrderId> {
        self.script
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                ExchangeCall::Cancel(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn open_ids(&self) -> Vec<ExchangeOrderId> {
        self.script.lock().open.iter().map(|o| o.id.clone()).collect()
    }

    pub fn clear_calls(&self) {
        self.script.lock().calls.clear();
    }
}

#[async_trait]
impl ExchangeClient for ScriptedExchange {
    async fn submit_order(&self, request: &OrderRequest) -> Result<OrderAck, Error> {
        let mut script = self.script.lock();
        script.calls.push(ExchangeCall::Submit(request.clone()));
        if let Some(err) = script.submit_failures.pop_front() {
            return Err(err);
        }

        script.next_id += 1;
        let id = ExchangeOrderId::new(format!("x{}", script.next_id));
        let created_at = Utc::now();
        script.open.push(OpenOrder {
            id: id.clone(),
            pair: request.pair.clone(),
            side: request.side,
            kind: request.kind(),
            price: request.price,
            pending_size: request.size,
            created_at,
        });
        Ok(OrderAck {
            id,
            pair: request.pair.clone(),
            side: request.side,
            kind: request.kind(),
            price: request.price,
            size: request.size,
            status: OrderStatus::Submitted,
            created_at,
        })
    }

    async fn cancel_order(&self, _pair: &Pair, order_id: &ExchangeOrderId) -> Result<(), Error> {
        let mut script = self.script.lock();
        script.calls.push(ExchangeCall::Cancel(order_id.clone()));
        if let Some(err) = script.cancel_failures.pop_front() {
            return Err(err);
        }
        script.open.retain(|o| &o.id != order_id);
        Ok(())
    }

    async fn ticker(&self, _pair: &Pair) -> Result<Ticker, Error> {
        let mut script = self.script.lock();
        script.calls.push(ExchangeCall::Ticker);
        if let Some(err) = script.ticker_failures.pop_front() {
            return Err(err);
        }
        let bid = script.book.best_bid().map_or(Decimal::ZERO, |l| l.price());
        let ask = script.book.best_ask().map_or(Decimal::ZERO, |l| l.price());
        Ok(Ticker {
            last: bid,
            bid,
            ask,
            timestamp: Utc::now(),
        })
    }

    async fn balance(&self, _pair: &Pair) -> Result<Balance, Error> {
        let mut script = self.script.lock();
        script.calls.push(ExchangeCall::Balance);
        Ok(script.balance.clone())
    }

    async fn my_trades(&self, _pair: &Pair, since: Option<TradeId>) -> Result<Vec<OwnTrade>, Error> {
        let mut script = self.script.lock();
        script.calls.push(ExchangeCall::MyTrades(since));
        if let Some(err) = script.my_trades_failures.pop_front() {
            return Err(err);
        }
        let mut trades: Vec<_> = script
            .trades
            .iter()
            .filter(|t| since.map_or(true, |w| t.id > w))
            .cloned()
            .collect();
        trades.sort_by_key(|t| t.id);
        Ok(trades)
    }

    async fn open_orders(&self, _pair: &Pair) -> Result<Vec<OpenOrder>, Error> {
        let mut script = self.script.lock();
        script.calls.push(ExchangeCall::OpenOrders);
        if let Some(err) = script.open_orders_failures.pop_front() {
            return Err(err);
        }
        Ok(script.open.clone())
    }

    async fn order_book(&self, _pair: &Pair) -> Result<Book, Error> {
        let mut script = self.script.lock();
        script.calls.push(ExchangeCall::OrderBook);
        if let Some(err) = script.order_book_failures.pop_front() {
            return Err(err);
        }
        Ok(script.book.clone())
    }

    fn exchange_name(&self) -> &'static str {
        "scripted"
    }
}
