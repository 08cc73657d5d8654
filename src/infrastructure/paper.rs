//! In-memory paper exchange driven by the live feed.
//!
//! Orders rest until an observed public trade crosses them, then fill at
//! their limit price. Market orders fill immediately at the last trade
//! price. Funds are reserved on submit and released on fill or cancel.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::BookTracker;
use crate::domain::{
    Balance, Book, BookDelta, ExchangeOrderId, Execution, OpenOrder, OrderAck, OrderRequest,
    OrderSide, OrderStatus, OwnTrade, Pair, Price, ProductSpec, Ticker, TradeId, Volume,
};
use crate::error::{Error, ExchangeError, ExchangeErrorKind};
use crate::infrastructure::config::PaperConfig;
use crate::port::{ExchangeClient, SourceEvent, TradeSource};

#[derive(Debug, Clone)]
struct Resting {
    order: OpenOrder,
    limit: Price,
    /// Funds still held for the unfilled part.
    reserved: Decimal,
}

#[derive(Debug)]
struct Ledger {
    balance: Balance,
    resting: BTreeMap<DateTime<Utc>, Vec<ExchangeOrderId>>,
    orders: std::collections::HashMap<ExchangeOrderId, Resting>,
    trades: Vec<OwnTrade>,
    next_trade_id: u64,
    last_trade: Option<Execution>,
}

pub struct PaperExchange {
    product: ProductSpec,
    fee_rate: Decimal,
    ledger: Mutex<Ledger>,
    book: BookTracker,
}

impl PaperExchange {
    #[must_use]
    pub fn new(product: ProductSpec, config: &PaperConfig) -> Self {
        info!(
            pair = %product.pair(),
            base = %config.base_balance,
            quote = %config.quote_balance,
            "Paper exchange opened"
        );
        Self {
            product,
            fee_rate: config.fee_rate,
            ledger: Mutex::new(Ledger {
                balance: Balance {
                    base: config.base_balance,
                    base_reserved: Decimal::ZERO,
                    quote: config.quote_balance,
                    quote_reserved: Decimal::ZERO,
                },
                resting: BTreeMap::new(),
                orders: std::collections::HashMap::new(),
                trades: Vec::new(),
                next_trade_id: 1,
                last_trade: None,
            }),
            book: BookTracker::new(),
        }
    }

    fn check_pair(&self, pair: &Pair) -> Result<(), Error> {
        if pair == self.product.pair() {
            Ok(())
        } else {
            Err(ExchangeError::invalid(format!("unknown pair {pair}")).into())
        }
    }

    /// Match resting orders against observed public trades.
    pub fn observe_trades(&self, executions: &[Execution]) {
        let mut ledger = self.ledger.lock();
        for execution in executions {
            let mut available = execution.size;
            let queue: Vec<ExchangeOrderId> = ledger.resting.values().flatten().cloned().collect();
            for id in queue {
                if available <= Decimal::ZERO {
                    break;
                }
                let Some(resting) = ledger.orders.get(&id) else {
                    continue;
                };
                let crosses = match resting.order.side {
                    OrderSide::Buy => execution.price <= resting.limit,
                    OrderSide::Sell => execution.price >= resting.limit,
                };
                if !crosses {
                    continue;
                }
                let size = resting.order.pending_size.min(available);
                available -= size;
                self.fill(&mut ledger, &id, size, execution.timestamp);
            }
            ledger.last_trade = Some(execution.clone());
        }
    }

    pub fn observe_book(&self, delta: &BookDelta) {
        self.book.apply(delta);
    }

    /// Settle `size` of resting order `id` at its limit price.
    fn fill(&self, ledger: &mut Ledger, id: &ExchangeOrderId, size: Volume, at: DateTime<Utc>) {
        let Some(resting) = ledger.orders.get_mut(id) else {
            return;
        };
        let price = resting.limit;
        let notional = price * size;
        let fee = notional * self.fee_rate;
        let side = resting.order.side;

        resting.order.pending_size -= size;
        let released = match side {
            OrderSide::Buy => (notional + fee).min(resting.reserved),
            OrderSide::Sell => size.min(resting.reserved),
        };
        resting.reserved -= released;
        let done = resting.order.pending_size <= Decimal::ZERO;
        let created_at = resting.order.created_at;

        match side {
            OrderSide::Buy => {
                ledger.balance.quote_reserved -= released;
                ledger.balance.base += size;
            }
            OrderSide::Sell => {
                ledger.balance.base_reserved -= released;
                ledger.balance.quote += notional - fee;
            }
        }

        let trade_id = TradeId::new(ledger.next_trade_id);
        ledger.next_trade_id += 1;
        ledger.trades.push(OwnTrade {
            id: trade_id,
            order_id: id.clone(),
            side,
            price,
            size,
            fee,
            timestamp: at,
        });
        debug!(exchange_id = %id, trade_id = %trade_id, %price, %size, "Paper fill");

        if done {
            self.release(ledger, id, created_at);
        }
    }

    /// Remove a resting order and return whatever it still holds.
    fn release(&self, ledger: &mut Ledger, id: &ExchangeOrderId, created_at: DateTime<Utc>) {
        if let Some(resting) = ledger.orders.remove(id) {
            match resting.order.side {
                OrderSide::Buy => {
                    ledger.balance.quote_reserved -= resting.reserved;
                    ledger.balance.quote += resting.reserved;
                }
                OrderSide::Sell => {
                    ledger.balance.base_reserved -= resting.reserved;
                    ledger.balance.base += resting.reserved;
                }
            }
        }
        if let Some(ids) = ledger.resting.get_mut(&created_at) {
            ids.retain(|other| other != id);
            if ids.is_empty() {
                ledger.resting.remove(&created_at);
            }
        }
    }

    fn reference_price(&self, ledger: &Ledger, side: OrderSide) -> Option<Price> {
        let book = self.book.snapshot();
        let quoted = match side {
            OrderSide::Buy => book.best_ask(),
            OrderSide::Sell => book.best_bid(),
        };
        quoted
            .map(|l| l.price())
            .or_else(|| ledger.last_trade.as_ref().map(|t| t.price))
    }
}

#[async_trait]
impl ExchangeClient for PaperExchange {
    async fn submit_order(&self, request: &OrderRequest) -> Result<OrderAck, Error> {
        self.check_pair(&request.pair)?;
        if request.size < self.product.min_size() {
            return Err(ExchangeError::invalid(format!(
                "size {} below minimum {}",
                request.size,
                self.product.min_size()
            ))
            .into());
        }

        let mut ledger = self.ledger.lock();
        let limit = match request.price {
            Some(price) if price > Decimal::ZERO => price,
            Some(price) => {
                return Err(ExchangeError::invalid(format!("price {price} must be positive")).into())
            }
            None => self.reference_price(&ledger, request.side).ok_or_else(|| {
                ExchangeError::new(ExchangeErrorKind::Unavailable, "no market price yet")
            })?,
        };

        let notional = limit * request.size;
        let reserved = match request.side {
            OrderSide::Buy => {
                let needed = notional + notional * self.fee_rate;
                if ledger.balance.quote < needed {
                    return Err(ExchangeError::new(
                        ExchangeErrorKind::InsufficientFunds,
                        format!("need {needed} {}, have {}", self.product.pair().quote(), ledger.balance.quote),
                    )
                    .into());
                }
                ledger.balance.quote -= needed;
                ledger.balance.quote_reserved += needed;
                needed
            }
            OrderSide::Sell => {
                if ledger.balance.base < request.size {
                    return Err(ExchangeError::new(
                        ExchangeErrorKind::InsufficientFunds,
                        format!("need {} {}, have {}", request.size, self.product.pair().base(), ledger.balance.base),
                    )
                    .into());
                }
                ledger.balance.base -= request.size;
                ledger.balance.base_reserved += request.size;
                request.size
            }
        };

        let id = ExchangeOrderId::new(Uuid::new_v4().to_string());
        let created_at = Utc::now();
        let order = OpenOrder {
            id: id.clone(),
            pair: request.pair.clone(),
            side: request.side,
            kind: request.kind(),
            price: request.price,
            pending_size: request.size,
            created_at,
        };
        ledger.orders.insert(
            id.clone(),
            Resting {
                order,
                limit,
                reserved,
            },
        );
        ledger.resting.entry(created_at).or_default().push(id.clone());

        let status = if request.price.is_none() {
            self.fill(&mut ledger, &id, request.size, created_at);
            OrderStatus::Filled
        } else {
            OrderStatus::Submitted
        };

        Ok(OrderAck {
            id,
            pair: request.pair.clone(),
            side: request.side,
            kind: request.kind(),
            price: request.price,
            size: request.size,
            status,
            created_at,
        })
    }

    async fn cancel_order(&self, pair: &Pair, order_id: &ExchangeOrderId) -> Result<(), Error> {
        self.check_pair(pair)?;
        let mut ledger = self.ledger.lock();
        let created_at = ledger
            .orders
            .get(order_id)
            .map(|r| r.order.created_at)
            .ok_or_else(|| ExchangeError::not_found(format!("order {order_id} is not open")))?;
        self.release(&mut ledger, order_id, created_at);
        Ok(())
    }

    async fn ticker(&self, pair: &Pair) -> Result<Ticker, Error> {
        self.check_pair(pair)?;
        let ledger = self.ledger.lock();
        let last = ledger.last_trade.as_ref().ok_or_else(|| {
            ExchangeError::new(ExchangeErrorKind::Unavailable, "no trades observed yet")
        })?;
        let book = self.book.snapshot();
        Ok(Ticker {
            last: last.price,
            bid: book.best_bid().map_or(last.price, |l| l.price()),
            ask: book.best_ask().map_or(last.price, |l| l.price()),
            timestamp: last.timestamp,
        })
    }

    async fn balance(&self, pair: &Pair) -> Result<Balance, Error> {
        self.check_pair(pair)?;
        Ok(self.ledger.lock().balance.clone())
    }

    async fn my_trades(&self, pair: &Pair, since: Option<TradeId>) -> Result<Vec<OwnTrade>, Error> {
        self.check_pair(pair)?;
        Ok(self
            .ledger
            .lock()
            .trades
            .iter()
            .filter(|t| since.map_or(true, |s| t.id > s))
            .cloned()
            .collect())
    }

    async fn open_orders(&self, pair: &Pair) -> Result<Vec<OpenOrder>, Error> {
        self.check_pair(pair)?;
        Ok(self
            .ledger
            .lock()
            .orders
            .values()
            .map(|r| r.order.clone())
            .collect())
    }

    async fn order_book(&self, pair: &Pair) -> Result<Book, Error> {
        self.check_pair(pair)?;
        Ok(self.book.snapshot())
    }

    fn exchange_name(&self) -> &'static str {
        "paper"
    }
}

/// Passes a source's events through while showing them to the paper exchange.
pub struct PaperTap<S> {
    inner: S,
    exchange: Arc<PaperExchange>,
}

impl<S: TradeSource> PaperTap<S> {
    pub fn new(inner: S, exchange: Arc<PaperExchange>) -> Self {
        Self { inner, exchange }
    }
}

#[async_trait]
impl<S: TradeSource> TradeSource for PaperTap<S> {
    async fn connect(&mut self) -> Result<(), Error> {
        self.inner.connect().await
    }

    async fn subscribe(&mut self, pair: &Pair) -> Result<(), Error> {
        self.inner.subscribe(pair).await
    }

    async fn next_event(&mut self) -> Option<SourceEvent> {
        let event = self.inner.next_event().await?;
        match &event {
            SourceEvent::Trades(trades) => self.exchange.observe_trades(trades),
            SourceEvent::BookDelta(delta) => self.exchange.observe_book(delta),
            SourceEvent::Connected | SourceEvent::Disconnected { .. } => {}
        }
        Some(event)
    }

    fn source_name(&self) -> &'static str {
        self.inner.source_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceLevel;
    use rust_decimal_macros::dec;

    fn exchange() -> PaperExchange {
        PaperExchange::new(
            ProductSpec::resolve("BTC/JPY").unwrap(),
            &PaperConfig {
                base_balance: dec!(1),
                quote_balance: dec!(1000000),
                fee_rate: Decimal::ZERO,
            },
        )
    }

    fn pair() -> Pair {
        Pair::from_symbol("BTC/JPY").unwrap()
    }

    fn limit(side: OrderSide, size: Decimal, price: Decimal) -> OrderRequest {
        OrderRequest {
            pair: pair(),
            side,
            size,
            price: Some(price),
        }
    }

    fn print(id: u64, price: Decimal, size: Decimal) -> Execution {
        Execution {
            id: TradeId::new(id),
            price,
            size,
            side: OrderSide::Sell,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn buy_reserves_quote_and_fills_on_cross() {
        let ex = exchange();
        let ack = ex
            .submit_order(&limit(OrderSide::Buy, dec!(0.1), dec!(100000)))
            .await
            .unwrap();
        assert_eq!(ack.status, OrderStatus::Submitted);

        let balance = ex.balance(&pair()).await.unwrap();
        assert_eq!(balance.quote, dec!(990000));
        assert_eq!(balance.quote_reserved, dec!(10000));

        ex.observe_trades(&[print(1, dec!(100001), dec!(1))]);
        assert_eq!(ex.open_orders(&pair()).await.unwrap().len(), 1);

        ex.observe_trades(&[print(2, dec!(99999), dec!(1))]);
        assert!(ex.open_orders(&pair()).await.unwrap().is_empty());

        let balance = ex.balance(&pair()).await.unwrap();
        assert_eq!(balance.base, dec!(1.1));
        assert_eq!(balance.quote_reserved, dec!(0));

        let trades = ex.my_trades(&pair(), None).await.unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].order_id, ack.id);
        assert_eq!(trades[0].price, dec!(100000));
        assert!(ex.my_trades(&pair(), Some(trades[0].id)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn partial_fills_follow_trade_size() {
        let ex = exchange();
        ex.submit_order(&limit(OrderSide::Sell, dec!(0.5), dec!(200)))
            .await
            .unwrap();

        ex.observe_trades(&[print(1, dec!(201), dec!(0.2))]);
        let open = ex.open_orders(&pair()).await.unwrap();
        assert_eq!(open[0].pending_size, dec!(0.3));
        assert_eq!(ex.balance(&pair()).await.unwrap().quote, dec!(1000040));
    }

    #[tokio::test]
    async fn cancel_releases_funds_and_unknown_is_not_found() {
        let ex = exchange();
        let ack = ex
            .submit_order(&limit(OrderSide::Sell, dec!(0.5), dec!(200)))
            .await
            .unwrap();
        assert_eq!(ex.balance(&pair()).await.unwrap().base, dec!(0.5));

        ex.cancel_order(&pair(), &ack.id).await.unwrap();
        let balance = ex.balance(&pair()).await.unwrap();
        assert_eq!(balance.base, dec!(1));
        assert_eq!(balance.base_reserved, dec!(0));

        let err = ex.cancel_order(&pair(), &ack.id).await.unwrap_err();
        assert!(matches!(err, Error::Exchange(e) if e.kind == ExchangeErrorKind::NotFound));
    }

    #[tokio::test]
    async fn rejects_unfunded_and_undersized_orders() {
        let ex = exchange();
        let err = ex
            .submit_order(&limit(OrderSide::Sell, dec!(2), dec!(200)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Exchange(e) if e.kind == ExchangeErrorKind::InsufficientFunds));

        let err = ex
            .submit_order(&limit(OrderSide::Buy, dec!(0.0001), dec!(200)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Exchange(e) if e.kind == ExchangeErrorKind::InvalidParameter));
    }

    #[tokio::test]
    async fn market_order_needs_a_price_then_fills() {
        let ex = exchange();
        let market = OrderRequest {
            pair: pair(),
            side: OrderSide::Buy,
            size: dec!(0.01),
            price: None,
        };
        let err = ex.submit_order(&market).await.unwrap_err();
        assert!(err.is_exchange_rejection());

        ex.observe_book(&BookDelta {
            bids: vec![PriceLevel::new(dec!(99), dec!(1))],
            asks: vec![PriceLevel::new(dec!(101), dec!(1))],
        });
        let ack = ex.submit_order(&market).await.unwrap();
        assert_eq!(ack.status, OrderStatus::Filled);
        assert_eq!(ex.balance(&pair()).await.unwrap().base, dec!(1.01));
    }

    #[tokio::test]
    async fn ticker_uses_last_trade_and_book() {
        let ex = exchange();
        assert!(ex.ticker(&pair()).await.is_err());

        ex.observe_trades(&[print(1, dec!(100), dec!(1))]);
        ex.observe_book(&BookDelta {
            bids: vec![PriceLevel::new(dec!(99), dec!(1))],
            asks: vec![],
        });
        let ticker = ex.ticker(&pair()).await.unwrap();
        assert_eq!(ticker.last, dec!(100));
        assert_eq!(ticker.bid, dec!(99));
        assert_eq!(ticker.ask, dec!(100));
    }

    #[tokio::test]
    async fn other_pairs_are_rejected() {
        let ex = exchange();
        let eth = Pair::from_symbol("ETH/JPY").unwrap();
        assert!(ex.balance(&eth).await.is_err());
    }
}
