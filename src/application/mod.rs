//! Application services: the engine's long-running tasks and the state
//! they share.
//!
//! - [`MainLoop`] - cadence/event driven decision loop
//! - [`OrderReconciler`] - idempotent submit/cancel per client id
//! - [`StaleOrderReaper`] - cancels orders the ledger has retired
//! - [`BalancePoller`] - periodic account valuation
//! - [`AccountState`] - orders, fills, position and watermark

pub mod balance;
pub mod book;
pub mod guard;
pub mod main_loop;
pub mod reaper;
pub mod reconciler;
pub mod schedule;
pub mod settings;
pub mod state;
pub mod strategy;

pub use balance::BalancePoller;
pub use book::BookTracker;
pub use main_loop::{MainLoop, MainLoopParts};
pub use reaper::StaleOrderReaper;
pub use reconciler::{OrderEvent, OrderIntent, OrderOutcome, OrderReconciler};
pub use schedule::{boundary_floor, cadence_delay, EntryGate};
pub use settings::{BookMode, EngineSettings, Settings};
pub use state::{AccountState, EngineState};
pub use strategy::{Strategy, StrategyHandle, Tick};
