//! Market-data feed: the buffered endpoint, its background task and the
//! WebSocket transport.

pub mod endpoint;
pub mod runner;
pub mod ws;

pub use endpoint::TradeEndpoint;
pub use runner::FeedRunner;
pub use ws::WsTradeSource;
