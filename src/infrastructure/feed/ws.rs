//! JSON-over-WebSocket trade source.
//!
//! The server speaks a small JSON protocol. After connecting the client sends
//!
//! ```json
//! {"type":"subscribe","pair":"btc_jpy","channels":["trades","depth"]}
//! ```
//!
//! and then receives `trades` and `depth` messages:
//!
//! ```json
//! {"type":"trades","pair":"btc_jpy","trades":[{"id":1,"price":"4000000","size":"0.01","side":"buy","timestamp":1700000000000}]}
//! {"type":"depth","pair":"btc_jpy","bids":[["3999000","0.5"]],"asks":[["4001000","0"]]}
//! ```
//!
//! Any other message type is ignored.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{info, trace, warn};

use crate::domain::{BookDelta, Execution, OrderSide, Pair, PriceLevel, TradeId};
use crate::error::{FeedError, Result};
use crate::port::{SourceEvent, TradeSource};

#[derive(Debug, Serialize)]
struct SubscribeMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    pair: &'a str,
    channels: [&'static str; 2],
}

#[derive(Debug, Deserialize)]
struct WireTrade {
    id: u64,
    price: Decimal,
    size: Decimal,
    side: OrderSide,
    /// Milliseconds since the epoch.
    timestamp: i64,
}

impl WireTrade {
    fn into_execution(self) -> Execution {
        Execution {
            id: TradeId::new(self.id),
            price: self.price,
            size: self.size,
            side: self.side,
            timestamp: DateTime::from_timestamp_millis(self.timestamp).unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireMessage {
    Trades {
        trades: Vec<WireTrade>,
    },
    Depth {
        #[serde(default)]
        bids: Vec<(Decimal, Decimal)>,
        #[serde(default)]
        asks: Vec<(Decimal, Decimal)>,
    },
    #[serde(other)]
    Unknown,
}

fn levels(raw: Vec<(Decimal, Decimal)>) -> Vec<PriceLevel> {
    raw.into_iter()
        .map(|(price, size)| PriceLevel::new(price, size))
        .collect()
}

/// Decode one text frame. `Ok(None)` for messages the engine ignores.
fn decode(text: &str) -> Result<Option<SourceEvent>> {
    let message: WireMessage = serde_json::from_str(text)?;
    Ok(match message {
        WireMessage::Trades { trades } if trades.is_empty() => None,
        WireMessage::Trades { mut trades } => {
            trades.sort_by_key(|t| t.id);
            Some(SourceEvent::Trades(
                trades.into_iter().map(WireTrade::into_execution).collect(),
            ))
        }
        WireMessage::Depth { bids, asks } => Some(SourceEvent::BookDelta(BookDelta {
            bids: levels(bids),
            asks: levels(asks),
        })),
        WireMessage::Unknown => None,
    })
}

pub struct WsTradeSource {
    url: String,
    ws: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
}

impl WsTradeSource {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ws: None,
        }
    }
}

#[async_trait]
impl TradeSource for WsTradeSource {
    async fn connect(&mut self) -> Result<()> {
        info!(url = %self.url, "Connecting to WebSocket");
        let (ws_stream, response) = connect_async(&self.url).await?;
        info!(status = %response.status(), "WebSocket connected");
        self.ws = Some(ws_stream);
        Ok(())
    }

    async fn subscribe(&mut self, pair: &Pair) -> Result<()> {
        let ws = self.ws.as_mut().ok_or(FeedError::NotConnected)?;
        let msg = SubscribeMessage {
            kind: "subscribe",
            pair: pair.as_str(),
            channels: ["trades", "depth"],
        };
        let json = serde_json::to_string(&msg)?;
        info!(pair = %pair, "Subscribing to trades and depth");
        ws.send(Message::Text(json)).await?;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<SourceEvent> {
        let ws = self.ws.as_mut()?;

        loop {
            let frame = match ws.next().await {
                Some(frame) => frame,
                None => {
                    self.ws = None;
                    return None;
                }
            };
            match frame {
                Ok(Message::Text(text)) => {
                    trace!(bytes = text.len(), "Received WebSocket text frame");
                    match decode(&text) {
                        Ok(Some(event)) => return Some(event),
                        Ok(None) => continue,
                        Err(e) => {
                            warn!(error = %e, bytes = text.len(), "Failed to parse message");
                            continue;
                        }
                    }
                }
                Ok(Message::Ping(data)) => {
                    trace!("Received WebSocket ping");
                    if ws.send(Message::Pong(data)).await.is_err() {
                        self.ws = None;
                        return Some(SourceEvent::Disconnected {
                            reason: "failed to send pong".into(),
                        });
                    }
                }
                Ok(Message::Close(frame)) => {
                    info!(frame = ?frame, "WebSocket closed by server");
                    self.ws = None;
                    return Some(SourceEvent::Disconnected {
                        reason: frame.map(|f| f.reason.to_string()).unwrap_or_default(),
                    });
                }
                Ok(_) => continue,
                Err(e) => {
                    self.ws = None;
                    return Some(SourceEvent::Disconnected {
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    fn source_name(&self) -> &'static str {
        "websocket"
    }
}
