//! Channel-backed [`TradeSource`] with an external control handle.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{Execution, Pair};
use crate::error::Error;
use crate::port::{SourceEvent, TradeSource};

/// Sends events into a [`ChannelSource`].
#[derive(Clone)]
pub struct SourceHandle {
    tx: mpsc::UnboundedSender<SourceEvent>,
    connects: Arc<AtomicU32>,
}

impl SourceHandle {
    /// Returns false once the source has been dropped.
    pub fn send(&self, event: SourceEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn trades(&self, trades: Vec<Execution>) -> bool {
        self.send(SourceEvent::Trades(trades))
    }

    pub fn connect_count(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }
}

/// A source whose events come from the paired [`SourceHandle`].
///
/// `next_event` waits for the next sent event and returns `None` once every
/// handle is dropped.
pub struct ChannelSource {
    rx: mpsc::UnboundedReceiver<SourceEvent>,
    connects: Arc<AtomicU32>,
}

impl ChannelSource {
    pub fn new() -> (Self, SourceHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connects = Arc::new(AtomicU32::new(0));
        (
            Self {
                rx,
                connects: Arc::clone(&connects),
            },
            SourceHandle { tx, connects },
        )
    }
}

#[async_trait]
impl TradeSource for ChannelSource {
    async fn connect(&mut self) -> Result<(), Error> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn subscribe(&mut self, _pair: &Pair) -> Result<(), Error> {
        Ok(())
    }

    async fn next_event(&mut self) -> Option<SourceEvent> {
        self.rx.recv().await
    }

    fn source_name(&self) -> &'static str {
        "channel"
    }
}
