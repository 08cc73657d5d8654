//! The feed's background task: reads a [`TradeSource`] into a
//! [`TradeEndpoint`] and reconnects with exponential backoff when the
//! connection drops.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::endpoint::TradeEndpoint;
use crate::domain::Pair;
use crate::error::Result;
use crate::infrastructure::config::ReconnectionConfig;
use crate::port::{SourceEvent, TradeSource};

/// Exponential backoff with up to 20% jitter and a circuit breaker.
#[derive(Debug)]
struct Backoff {
    config: ReconnectionConfig,
    current_delay_ms: u64,
    consecutive_failures: u32,
}

impl Backoff {
    fn new(config: ReconnectionConfig) -> Self {
        let current_delay_ms = config.initial_delay_ms;
        Self {
            config,
            current_delay_ms,
            consecutive_failures: 0,
        }
    }

    fn reset(&mut self) {
        self.consecutive_failures = 0;
        self.current_delay_ms = self.config.initial_delay_ms;
    }

    /// Delay before the next attempt; advances the backoff state.
    fn next_delay(&mut self) -> Duration {
        self.consecutive_failures += 1;
        if self.consecutive_failures > self.config.max_consecutive_failures {
            error!(
                failures = self.consecutive_failures - 1,
                cooldown_ms = self.config.circuit_breaker_cooldown_ms,
                "Circuit breaker tripped, pausing reconnection attempts"
            );
            self.reset();
            return Duration::from_millis(self.config.circuit_breaker_cooldown_ms);
        }

        let base = self.current_delay_ms;
        let jitter_range = base / 5;
        let jitter = if jitter_range == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_range)
        };

        let next = (base as f64 * self.config.backoff_multiplier) as u64;
        self.current_delay_ms = next.min(self.config.max_delay_ms);
        Duration::from_millis(base + jitter)
    }
}

/// Owns the source for the lifetime of the process.
pub struct FeedRunner<S: TradeSource> {
    source: S,
    pair: Pair,
    endpoint: Arc<TradeEndpoint>,
    backoff: Backoff,
}

impl<S: TradeSource> FeedRunner<S> {
    pub fn new(
        source: S,
        pair: Pair,
        endpoint: Arc<TradeEndpoint>,
        reconnection: ReconnectionConfig,
    ) -> Self {
        Self {
            source,
            pair,
            endpoint,
            backoff: Backoff::new(reconnection),
        }
    }

    /// Connect, forward events, reconnect. Never returns.
    pub async fn run(mut self) {
        loop {
            match self.connect().await {
                Ok(()) => {
                    self.backoff.reset();
                    let reason = self.pump().await;
                    warn!(source = self.source.source_name(), reason = %reason, "Feed disconnected");
                }
                Err(e) => {
                    warn!(source = self.source.source_name(), error = %e, "Feed connection failed");
                }
            }

            let delay = self.backoff.next_delay();
            info!(
                delay_ms = delay.as_millis() as u64,
                attempt = self.backoff.consecutive_failures,
                "Reconnecting feed after delay"
            );
            sleep(delay).await;
        }
    }

    async fn connect(&mut self) -> Result<()> {
        self.source.connect().await?;
        self.source.subscribe(&self.pair).await?;
        info!(source = self.source.source_name(), pair = %self.pair, "Feed subscribed");
        Ok(())
    }

    /// Forward events until the connection is lost; returns the reason.
    async fn pump(&mut self) -> String {
        while let Some(event) = self.source.next_event().await {
            match event {
                SourceEvent::Trades(trades) => {
                    debug!(count = trades.len(), "Trades received");
                    self.endpoint.push_trades(trades);
                }
                SourceEvent::BookDelta(delta) => self.endpoint.push_book(delta),
                SourceEvent::Connected => {
                    debug!(source = self.source.source_name(), "Source reports connected");
                }
                SourceEvent::Disconnected { reason } => return reason,
            }
        }
        "stream ended".to_string()
    }
}
