//! Bounded trade buffer between the feed task and the main loop.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch, Notify};
use tracing::{debug, warn};

use crate::domain::{BookDelta, Execution};
use crate::port::{FeedUpdate, MarketFeed};

const UPDATE_CHANNEL_CAPACITY: usize = 1024;

/// Trade endpoint: a FIFO capped at `capacity` unconsumed executions.
///
/// When the main loop falls behind the oldest executions are dropped.
/// Every update is also fanned out on a broadcast channel.
pub struct TradeEndpoint {
    buffer: Mutex<VecDeque<Execution>>,
    capacity: usize,
    notify: Notify,
    ready: watch::Sender<bool>,
    updates: broadcast::Sender<FeedUpdate>,
}

impl TradeEndpoint {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (ready, _) = watch::channel(false);
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(capacity.min(8192))),
            capacity,
            notify: Notify::new(),
            ready,
            updates,
        }
    }

    /// Append a batch of public trades.
    pub fn push_trades(&self, trades: Vec<Execution>) {
        if trades.is_empty() {
            return;
        }
        let shared: Arc<[Execution]> = Arc::from(trades.as_slice());

        let dropped = {
            let mut buffer = self.buffer.lock();
            buffer.extend(trades);
            let overflow = buffer.len().saturating_sub(self.capacity);
            buffer.drain(..overflow);
            overflow
        };
        if dropped > 0 {
            warn!(dropped, capacity = self.capacity, "Trade buffer full, dropped oldest");
        }

        self.notify.notify_one();
        self.ready.send_if_modified(|ready| !std::mem::replace(ready, true));
        let _ = self.updates.send(FeedUpdate::Trades(shared));
    }

    /// Forward order book changes to subscribers.
    pub fn push_book(&self, delta: BookDelta) {
        let _ = self.updates.send(FeedUpdate::Book(delta));
    }

    /// Executions waiting to be consumed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.lock().len()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    fn drain(&self) -> Vec<Execution> {
        self.buffer.lock().drain(..).collect()
    }
}

#[async_trait]
impl MarketFeed for TradeEndpoint {
    async fn wait_ready(&self) {
        let mut ready = self.ready.subscribe();
        if ready.wait_for(|r| *r).await.is_err() {
            debug!("Readiness channel closed");
        }
    }

    async fn wait_new(&self) {
        while self.pending() == 0 {
            self.notify.notified().await;
        }
    }

    async fn next_batch(&self) -> Vec<Execution> {
        loop {
            let batch = self.drain();
            if !batch.is_empty() {
                return batch;
            }
            self.notify.notified().await;
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<FeedUpdate> {
        self.updates.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderSide, TradeId};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn trade(id: u64) -> Execution {
        Execution {
            id: TradeId::new(id),
            price: dec!(100),
            size: dec!(1),
            side: OrderSide::Buy,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn drops_oldest_beyond_capacity() {
        let endpoint = TradeEndpoint::new(3);
        endpoint.push_trades((1..=5).map(trade).collect());

        let batch = endpoint.next_batch().await;
        let ids: Vec<u64> = batch.iter().map(|t| t.id.value()).collect();
        assert_eq!(ids, vec![3, 4, 5]);
        assert_eq!(endpoint.pending(), 0);
    }

    #[tokio::test]
    async fn ready_after_first_batch() {
        let endpoint = TradeEndpoint::new(10);
        assert!(!endpoint.is_ready());

        endpoint.push_trades(vec![]);
        assert!(!endpoint.is_ready());

        endpoint.push_trades(vec![trade(1)]);
        assert!(endpoint.is_ready());
        tokio::time::timeout(Duration::from_secs(1), endpoint.wait_ready())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn next_batch_waits_for_data() {
        let endpoint = Arc::new(TradeEndpoint::new(10));
        let reader = Arc::clone(&endpoint);
        let handle = tokio::spawn(async move { reader.next_batch().await });

        tokio::task::yield_now().await;
        assert!(!handle.is_finished());

        endpoint.push_trades(vec![trade(7), trade(8)]);
        let batch = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(batch.len(), 2);
    }

    #[tokio::test]
    async fn updates_are_broadcast() {
        let endpoint = TradeEndpoint::new(10);
        let mut rx = endpoint.subscribe();

        endpoint.push_trades(vec![trade(1)]);
        endpoint.push_book(BookDelta::default());

        assert!(matches!(rx.recv().await.unwrap(), FeedUpdate::Trades(t) if t.len() == 1));
        assert!(matches!(rx.recv().await.unwrap(), FeedUpdate::Book(_)));
    }
}
