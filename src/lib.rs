//! Strategist - a cadence-driven strategy engine.
//!
//! A strategy is invoked on a fixed cadence (or on every new trade batch)
//! with recent executions, an aggregated candle and an optional order book.
//! It expresses intent through [`application::StrategyHandle`]; the
//! [`application::OrderReconciler`] turns that intent into the minimum set of
//! exchange calls while the engine keeps positions, fills and balances in
//! sync with the exchange.
//!
//! # Architecture
//!
//! - **`domain`** - Exchange-agnostic types: orders, fills, candles, books
//! - **`port`** - Traits at the edges: exchange, trade source, feed, clock
//! - **`application`** - Main loop, reconciler, reaper, balance poller
//! - **`adapter`** - Bundled strategies
//! - **`infrastructure`** - Config, WebSocket feed, paper exchange, supervisor
//! - **`cli`** - Command-line entry points
//!
//! # Example
//!
//! ```no_run
//! use strategist::infrastructure::bootstrap;
//! use strategist::infrastructure::config::Config;
//!
//! # async fn run() -> strategist::Result<()> {
//! let config = Config::load("config.toml")?;
//! config.logging.init();
//! bootstrap::run(config).await
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use error::{Error, Result};
