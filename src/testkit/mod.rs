//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`exchange`] - `ScriptedExchange`, an [`ExchangeClient`](crate::port::ExchangeClient)
//!   that records every call and fails on demand.
//! - [`source`] - `ChannelSource`, a [`TradeSource`](crate::port::TradeSource)
//!   fed from a test-held handle.
//! - [`clock`] - `ManualClock` and `TokioClock`.
//! - [`strategy`] - `RecordingStrategy`, a decision function that records its ticks.
//! - [`domain`] - Builders for executions, fills and products.

pub mod clock;
pub mod domain;
pub mod exchange;
pub mod source;
pub mod strategy;
