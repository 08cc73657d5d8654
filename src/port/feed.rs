//! Market-data ports.
//!
//! A [`TradeSource`] is the raw transport the feed's background task reads.
//! A [`MarketFeed`] is the buffered endpoint the main loop consumes.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::{BookDelta, Execution, Pair};
use crate::error::Error;

/// Events read from a raw market-data transport.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// Public trades, oldest first.
    Trades(Vec<Execution>),
    /// Order book level changes.
    BookDelta(BookDelta),
    /// Connection established.
    Connected,
    /// Connection lost (may reconnect).
    Disconnected { reason: String },
}

/// Raw market-data transport.
#[async_trait]
pub trait TradeSource: Send {
    async fn connect(&mut self) -> Result<(), Error>;

    /// Subscribe to trades and depth for the pair. Called after every connect.
    async fn subscribe(&mut self, pair: &Pair) -> Result<(), Error>;

    /// Next event, or `None` once the connection is gone.
    async fn next_event(&mut self) -> Option<SourceEvent>;

    fn source_name(&self) -> &'static str;
}

#[async_trait]
impl TradeSource for Box<dyn TradeSource> {
    async fn connect(&mut self) -> Result<(), Error> {
        (**self).connect().await
    }

    async fn subscribe(&mut self, pair: &Pair) -> Result<(), Error> {
        (**self).subscribe(pair).await
    }

    async fn next_event(&mut self) -> Option<SourceEvent> {
        (**self).next_event().await
    }

    fn source_name(&self) -> &'static str {
        (**self).source_name()
    }
}

/// Fan-out of everything the feed receives, for live patching and observers.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate {
    Trades(Arc<[Execution]>),
    Book(BookDelta),
}

/// Buffered market data as seen by the main loop.
#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// Resolves once the first batch of trades has arrived.
    async fn wait_ready(&self);

    /// Suspends until at least one execution is buffered.
    async fn wait_new(&self);

    /// Drain every buffered execution, suspending while none is pending.
    async fn next_batch(&self) -> Vec<Execution>;

    /// Subscribe to live updates.
    fn subscribe(&self) -> broadcast::Receiver<FeedUpdate>;
}
