//! Engine settings, immutable after startup.

use rust_decimal::Decimal;
use serde::Deserialize;

/// How the decision function gets an order book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookMode {
    /// No order book tracking.
    #[default]
    Off,
    /// Synced once, then live-patched from the feed.
    Stream,
    /// Re-fetched from the exchange before every permitted entry.
    Api,
}

/// Trading settings for one symbol.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Symbol as `BASE/QUOTE`.
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Cadence in seconds; 0 runs the main loop on every new batch of trades.
    #[serde(default = "default_interval")]
    pub interval: u64,
    /// Minimum seconds between entries; 0 disables the throttle.
    #[serde(default)]
    pub minimum_interval: u64,
    /// Candle history kept for the decision function.
    #[serde(default = "default_max_candles")]
    pub max_candles: usize,
    /// Compute buy/sell volume, trade count and VWAP per candle.
    #[serde(default = "default_true")]
    pub rich_candles: bool,
    #[serde(default)]
    pub book: BookMode,
}

fn default_symbol() -> String {
    "BTC/JPY".to_string()
}

const fn default_interval() -> u64 {
    60
}

const fn default_max_candles() -> usize {
    1000
}

const fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            interval: default_interval(),
            minimum_interval: 0,
            max_candles: default_max_candles(),
            rich_candles: true,
            book: BookMode::Off,
        }
    }
}

/// Periods and capacities of the background tasks.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    #[serde(default = "default_reaper_interval")]
    pub reaper_interval_secs: u64,
    #[serde(default = "default_balance_interval")]
    pub balance_interval_secs: u64,
    /// Unconsumed trades buffered before the oldest are dropped.
    #[serde(default = "default_feed_capacity")]
    pub feed_capacity: usize,
    /// How long replaced orders stay in the nonactive set.
    #[serde(default = "default_order_retention")]
    pub order_retention_secs: u64,
    #[serde(default = "default_maintenance_interval")]
    pub maintenance_interval_secs: u64,
    /// A streamed book whose spread falls below this is resynced.
    #[serde(default)]
    pub book_resync_spread: Decimal,
}

const fn default_reaper_interval() -> u64 {
    15
}

const fn default_balance_interval() -> u64 {
    300
}

const fn default_feed_capacity() -> usize {
    5000
}

const fn default_order_retention() -> u64 {
    600
}

const fn default_maintenance_interval() -> u64 {
    60
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            reaper_interval_secs: default_reaper_interval(),
            balance_interval_secs: default_balance_interval(),
            feed_capacity: default_feed_capacity(),
            order_retention_secs: default_order_retention(),
            maintenance_interval_secs: default_maintenance_interval(),
            book_resync_spread: Decimal::ZERO,
        }
    }
}
