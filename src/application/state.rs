//! Shared account and engine state.
//!
//! [`AccountState`] is the single ledger every task reads and mutates: the
//! active order per client id, orders that have been replaced ("nonactive"),
//! the position built from own fills and the trade-id watermark. All access
//! goes through one lock and no guard is held across an `.await`, so every
//! read-then-use sees a fully updated record.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::domain::{
    ClientOrderId, ExchangeOrderId, OrderAck, OrderRecord, OrderStatus, OwnTrade, Position,
    PositionSnapshot, TradeId, Valuation,
};
use crate::port::Clock;

#[derive(Debug)]
struct Retired {
    record: OrderRecord,
    retired_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Ledger {
    orders: HashMap<ClientOrderId, OrderRecord>,
    retired: VecDeque<Retired>,
    position: Position,
    watermark: Option<TradeId>,
}

impl Ledger {
    fn record(&self, id: &ExchangeOrderId) -> Option<&OrderRecord> {
        self.orders
            .values()
            .chain(self.retired.iter().map(|r| &r.record))
            .find(|r| &r.exchange_id == id)
    }

    fn record_mut(&mut self, id: &ExchangeOrderId) -> Option<&mut OrderRecord> {
        if let Some(record) = self.orders.values_mut().find(|r| &r.exchange_id == id) {
            return Some(record);
        }
        self.retired
            .iter_mut()
            .map(|r| &mut r.record)
            .find(|r| &r.exchange_id == id)
    }
}

/// Order and position bookkeeping shared by all tasks.
#[derive(Debug)]
pub struct AccountState {
    ledger: RwLock<Ledger>,
    retention: chrono::Duration,
}

impl AccountState {
    /// Replaced orders stay in the nonactive set for `retention`.
    #[must_use]
    pub fn new(retention: Duration) -> Self {
        Self {
            ledger: RwLock::new(Ledger::default()),
            retention: chrono::Duration::from_std(retention).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Current record for a client id.
    pub fn order(&self, client_id: &ClientOrderId) -> Option<OrderRecord> {
        self.ledger.read().orders.get(client_id).cloned()
    }

    /// Store the exchange's acknowledgement as the record for `client_id`.
    ///
    /// A previous record under the same client id moves to the nonactive set.
    pub fn record_submission(
        &self,
        client_id: ClientOrderId,
        ack: OrderAck,
        now: DateTime<Utc>,
    ) -> OrderRecord {
        let record = OrderRecord::from_ack(client_id.clone(), ack);
        let mut ledger = self.ledger.write();
        if let Some(previous) = ledger.orders.insert(client_id, record.clone()) {
            debug!(
                client_id = %previous.client_id,
                exchange_id = %previous.exchange_id,
                status = %previous.status,
                "Order replaced"
            );
            ledger.retired.push_back(Retired {
                record: previous,
                retired_at: now,
            });
        }
        record
    }

    /// Look up an active or nonactive record by exchange id.
    pub fn find_by_exchange_id(&self, id: &ExchangeOrderId) -> Option<OrderRecord> {
        self.ledger.read().record(id).cloned()
    }

    /// Mark an order cancelled after the exchange accepted the cancel.
    pub fn mark_cancelled(&self, id: &ExchangeOrderId) -> bool {
        self.set_status(id, OrderStatus::Cancelled)
    }

    fn set_status(&self, id: &ExchangeOrderId, status: OrderStatus) -> bool {
        let mut ledger = self.ledger.write();
        match ledger.record_mut(id) {
            Some(record) if record.status.is_open() => {
                record.status = status;
                true
            }
            _ => false,
        }
    }

    /// Orders no longer in the active working set, newest last.
    pub fn nonactive_orders(&self) -> Vec<OrderRecord> {
        self.ledger
            .read()
            .retired
            .iter()
            .map(|r| r.record.clone())
            .collect()
    }

    /// Ingest own fills newer than the watermark.
    ///
    /// Updates executed size and status of the matching order, the position,
    /// and raises the watermark. Returns the number of fills applied.
    pub fn ingest_trades(&self, trades: &[OwnTrade]) -> usize {
        let mut ledger = self.ledger.write();
        let mut seen = HashSet::new();
        let mut applied = 0;

        for trade in trades {
            if ledger.watermark.is_some_and(|w| trade.id <= w) || !seen.insert(trade.id) {
                continue;
            }
            ledger.position.apply(trade.side, trade.size, trade.price);
            match ledger.record_mut(&trade.order_id) {
                Some(record) => record.apply_fill(trade.size),
                None => debug!(
                    trade_id = %trade.id,
                    exchange_id = %trade.order_id,
                    "Fill for untracked order"
                ),
            }
            applied += 1;
        }

        if let Some(max) = trades.iter().map(|t| t.id).max() {
            ledger.watermark = Some(ledger.watermark.map_or(max, |w| w.max(max)));
        }
        applied
    }

    /// Highest own trade id already processed.
    pub fn watermark(&self) -> Option<TradeId> {
        self.ledger.read().watermark
    }

    pub fn position(&self) -> PositionSnapshot {
        self.ledger.read().position.snapshot()
    }

    /// Drop nonactive records retired before the retention window.
    pub fn prune(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.retention;
        let mut ledger = self.ledger.write();
        let before = ledger.retired.len();
        ledger.retired.retain(|r| r.retired_at > cutoff);
        before - ledger.retired.len()
    }

    /// Background maintenance: prune the nonactive set forever.
    pub async fn run_maintenance(&self, period: Duration, clock: Arc<dyn Clock>) {
        loop {
            tokio::time::sleep(period).await;
            let pruned = self.prune(clock.now());
            let (active, nonactive) = {
                let ledger = self.ledger.read();
                let open = ledger.orders.values().filter(|r| r.is_open()).count();
                (open, ledger.retired.len())
            };
            if pruned > 0 {
                info!(pruned, active, nonactive, "Order ledger pruned");
            } else {
                debug!(active, nonactive, "Order ledger maintenance");
            }
        }
    }
}

/// Values the engine publishes for external reads.
#[derive(Debug, Default)]
pub struct EngineState {
    position: RwLock<PositionSnapshot>,
    valuation: RwLock<Option<Valuation>>,
    last_entry: RwLock<Option<DateTime<Utc>>>,
}

impl EngineState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Position as copied by the main loop on its latest tick.
    pub fn position(&self) -> PositionSnapshot {
        *self.position.read()
    }

    pub fn set_position(&self, snapshot: PositionSnapshot) {
        *self.position.write() = snapshot;
    }

    pub fn valuation(&self) -> Option<Valuation> {
        self.valuation.read().clone()
    }

    pub fn set_valuation(&self, valuation: Valuation) {
        *self.valuation.write() = Some(valuation);
    }

    pub fn last_entry(&self) -> Option<DateTime<Utc>> {
        *self.last_entry.read()
    }

    pub fn set_last_entry(&self, at: DateTime<Utc>) {
        *self.last_entry.write() = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderKind, OrderSide, Pair};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn ack(id: &str, price: Decimal, size: Decimal) -> OrderAck {
        OrderAck {
            id: ExchangeOrderId::new(id),
            pair: Pair::from_symbol("BTC/JPY").unwrap(),
            side: OrderSide::Buy,
            kind: OrderKind::Limit,
            price: Some(price),
            size,
            status: OrderStatus::Submitted,
            created_at: Utc::now(),
        }
    }

    fn fill(id: u64, order: &str, side: OrderSide, size: Decimal, price: Decimal) -> OwnTrade {
        OwnTrade {
            id: TradeId::new(id),
            order_id: ExchangeOrderId::new(order),
            side,
            price,
            size,
            fee: Decimal::ZERO,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn replacing_an_order_retires_the_previous_record() {
        let account = AccountState::new(Duration::from_secs(600));
        let id = ClientOrderId::new("bid");

        account.record_submission(id.clone(), ack("x1", dec!(100), dec!(1)), Utc::now());
        assert!(account.nonactive_orders().is_empty());

        account.record_submission(id.clone(), ack("x2", dec!(101), dec!(1)), Utc::now());
        assert_eq!(account.order(&id).unwrap().exchange_id.as_str(), "x2");

        let nonactive = account.nonactive_orders();
        assert_eq!(nonactive.len(), 1);
        assert_eq!(nonactive[0].exchange_id.as_str(), "x1");
    }

    #[test]
    fn fills_update_orders_position_and_watermark() {
        let account = AccountState::new(Duration::from_secs(600));
        let id = ClientOrderId::new("bid");
        account.record_submission(id.clone(), ack("x1", dec!(100), dec!(2)), Utc::now());

        let applied = account.ingest_trades(&[
            fill(10, "x1", OrderSide::Buy, dec!(1), dec!(100)),
            fill(11, "x1", OrderSide::Buy, dec!(1), dec!(100)),
        ]);

        assert_eq!(applied, 2);
        assert_eq!(account.watermark(), Some(TradeId::new(11)));
        assert_eq!(account.order(&id).unwrap().status, OrderStatus::Filled);
        assert_eq!(account.position().long_size, dec!(2));
    }

    #[test]
    fn fills_at_or_below_watermark_are_ignored() {
        let account = AccountState::new(Duration::from_secs(600));
        account.ingest_trades(&[fill(5, "x1", OrderSide::Buy, dec!(1), dec!(100))]);

        let applied = account.ingest_trades(&[
            fill(4, "x1", OrderSide::Buy, dec!(1), dec!(100)),
            fill(5, "x1", OrderSide::Buy, dec!(1), dec!(100)),
            fill(6, "x1", OrderSide::Sell, dec!(1), dec!(100)),
            fill(6, "x1", OrderSide::Sell, dec!(1), dec!(100)),
        ]);

        assert_eq!(applied, 1);
        assert_eq!(account.position().position_size, dec!(0));
        assert_eq!(account.watermark(), Some(TradeId::new(6)));
    }

    #[test]
    fn cancel_marks_only_open_orders() {
        let account = AccountState::new(Duration::from_secs(600));
        let id = ClientOrderId::new("ask");
        account.record_submission(id.clone(), ack("x1", dec!(100), dec!(1)), Utc::now());

        assert!(account.mark_cancelled(&ExchangeOrderId::new("x1")));
        assert_eq!(account.order(&id).unwrap().status, OrderStatus::Cancelled);
        assert!(!account.mark_cancelled(&ExchangeOrderId::new("x1")));
        assert!(!account.mark_cancelled(&ExchangeOrderId::new("missing")));
    }

    #[test]
    fn prune_drops_records_outside_retention() {
        let account = AccountState::new(Duration::from_secs(60));
        let id = ClientOrderId::new("bid");
        let start = Utc::now();
        account.record_submission(id.clone(), ack("x1", dec!(100), dec!(1)), start);
        account.record_submission(id.clone(), ack("x2", dec!(100), dec!(1)), start);

        assert_eq!(account.prune(start + chrono::Duration::seconds(30)), 0);
        assert_eq!(account.prune(start + chrono::Duration::seconds(61)), 1);
        assert!(account.nonactive_orders().is_empty());
    }

    #[test]
    fn nonactive_orders_are_found_by_exchange_id() {
        let account = AccountState::new(Duration::from_secs(600));
        let id = ClientOrderId::new("bid");
        account.record_submission(id.clone(), ack("x1", dec!(100), dec!(1)), Utc::now());
        account.record_submission(id, ack("x2", dec!(100), dec!(1)), Utc::now());

        let old = account.find_by_exchange_id(&ExchangeOrderId::new("x1")).unwrap();
        assert!(old.is_open());
    }
}
