//! Infrastructure layer.
//!
//! Technical concerns that support the application without containing
//! trading logic.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`feed`] - Trade endpoint, feed task and WebSocket source
//! - [`paper`] - In-memory exchange
//! - [`supervisor`] - Starts and joins the engine's tasks

pub mod bootstrap;
pub mod config;
pub mod feed;
pub mod paper;
pub mod supervisor;
