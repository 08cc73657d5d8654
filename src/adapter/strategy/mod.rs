//! Bundled decision functions.

pub mod observer;
pub mod registry;
pub mod spread_quoter;

pub use observer::Observer;
pub use registry::{build_strategy, AVAILABLE};
pub use spread_quoter::SpreadQuoter;
