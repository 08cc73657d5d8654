//! Thread-safe order-book tracker, synced from snapshots and live-patched
//! from feed deltas.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::domain::{Book, BookDelta, Price, PriceLevel, Volume};
use crate::port::FeedUpdate;

#[derive(Debug, Default)]
struct Levels {
    bids: BTreeMap<Reverse<Price>, Volume>,
    asks: BTreeMap<Price, Volume>,
}

/// Sorted bids and asks for one pair.
#[derive(Debug, Default)]
pub struct BookTracker {
    levels: RwLock<Levels>,
}

impl BookTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both sides with a full snapshot.
    pub fn sync(&self, snapshot: &Book) {
        let mut levels = self.levels.write();
        levels.bids = snapshot
            .bids()
            .iter()
            .map(|l| (Reverse(l.price()), l.size()))
            .collect();
        levels.asks = snapshot
            .asks()
            .iter()
            .map(|l| (l.price(), l.size()))
            .collect();
    }

    /// Apply level changes; a zero size removes the level.
    pub fn apply(&self, delta: &BookDelta) {
        let mut levels = self.levels.write();
        for level in &delta.bids {
            if level.size().is_zero() {
                levels.bids.remove(&Reverse(level.price()));
            } else {
                levels.bids.insert(Reverse(level.price()), level.size());
            }
        }
        for level in &delta.asks {
            if level.size().is_zero() {
                levels.asks.remove(&level.price());
            } else {
                levels.asks.insert(level.price(), level.size());
            }
        }
    }

    /// Sorted copy of the current book.
    #[must_use]
    pub fn snapshot(&self) -> Book {
        let levels = self.levels.read();
        Book::from_levels(
            levels
                .bids
                .iter()
                .map(|(Reverse(p), s)| PriceLevel::new(*p, *s))
                .collect(),
            levels
                .asks
                .iter()
                .map(|(p, s)| PriceLevel::new(*p, *s))
                .collect(),
        )
    }

    /// True when a side is empty or the spread is below `min_spread`.
    #[must_use]
    pub fn is_stale(&self, min_spread: Decimal) -> bool {
        let levels = self.levels.read();
        match (levels.bids.keys().next(), levels.asks.keys().next()) {
            (Some(Reverse(bid)), Some(ask)) => *ask - *bid < min_spread,
            _ => true,
        }
    }

    /// Live-patch from the feed until it closes.
    pub fn attach(self: Arc<Self>, mut updates: broadcast::Receiver<FeedUpdate>) {
        tokio::spawn(async move {
            loop {
                match updates.recv().await {
                    Ok(FeedUpdate::Book(delta)) => self.apply(&delta),
                    Ok(FeedUpdate::Trades(_)) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Book patcher lagged, book may be stale");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Feed closed, book patcher stopped");
                        break;
                    }
                }
            }
        });
    }
}
