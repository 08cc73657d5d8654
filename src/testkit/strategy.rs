//! A decision function that records what it saw.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::application::{OrderIntent, Strategy, StrategyHandle, Tick};
use crate::domain::{Book, Candle, PositionSnapshot};
use crate::error::{Error, Result};

/// What one invocation received.
#[derive(Debug, Clone)]
pub struct RecordedTick {
    pub now: DateTime<Utc>,
    pub executions: usize,
    pub candle: Option<Candle>,
    pub history_len: usize,
    pub book: Option<Book>,
    pub position: PositionSnapshot,
}

/// Records every tick, optionally places an order, and can be told to fail
/// or panic on a given invocation (1-based).
#[derive(Default)]
pub struct RecordingStrategy {
    ticks: Arc<Mutex<Vec<RecordedTick>>>,
    intent: Option<OrderIntent>,
    fail_on: Option<usize>,
    panic_on: Option<usize>,
}

impl RecordingStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view of the recorded ticks.
    pub fn ticks(&self) -> Arc<Mutex<Vec<RecordedTick>>> {
        Arc::clone(&self.ticks)
    }

    #[must_use]
    pub fn with_intent(mut self, intent: OrderIntent) -> Self {
        self.intent = Some(intent);
        self
    }

    #[must_use]
    pub const fn failing_on(mut self, invocation: usize) -> Self {
        self.fail_on = Some(invocation);
        self
    }

    #[must_use]
    pub const fn panicking_on(mut self, invocation: usize) -> Self {
        self.panic_on = Some(invocation);
        self
    }
}

#[async_trait]
impl Strategy for RecordingStrategy {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn on_tick(&mut self, tick: Tick<'_>, handle: &StrategyHandle) -> Result<()> {
        let invocation = {
            let mut ticks = self.ticks.lock();
            ticks.push(RecordedTick {
                now: tick.now,
                executions: tick.executions.len(),
                candle: tick.candle.cloned(),
                history_len: tick.history.len(),
                book: tick.book.cloned(),
                position: handle.position(),
            });
            ticks.len()
        };

        if self.panic_on == Some(invocation) {
            panic!("scripted panic on invocation {invocation}");
        }
        if self.fail_on == Some(invocation) {
            return Err(Error::Strategy(format!("scripted failure on invocation {invocation}")));
        }
        if let Some(intent) = self.intent.clone() {
            handle.order(intent).await?;
        }
        Ok(())
    }
}
