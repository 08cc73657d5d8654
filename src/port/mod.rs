//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Available Ports
//!
//! - [`ExchangeClient`] - Order placement and account queries
//! - [`TradeSource`] - Raw market-data transport read by the feed task
//! - [`MarketFeed`] - Buffered market data consumed by the main loop
//! - [`Clock`] - Wall-clock time
//!
//! Note: The `Strategy` trait is in `application::strategy` because its
//! handle is an application type rather than an external dependency.

mod clock;
mod exchange;
mod feed;

pub use clock::{Clock, SystemClock};
pub use exchange::ExchangeClient;
pub use feed::{FeedUpdate, MarketFeed, SourceEvent, TradeSource};
