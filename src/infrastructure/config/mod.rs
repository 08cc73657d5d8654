//! Infrastructure configuration modules.

pub mod exchange;
pub mod feed;
pub mod logging;
pub mod settings;
pub mod strategy;

pub use exchange::{Credentials, ExchangeConfig, PaperConfig};
pub use feed::{FeedConfig, ReconnectionConfig};
pub use logging::LoggingConfig;
pub use settings::Config;
pub use strategy::{SpreadQuoterConfig, StrategyConfig};
