//! Websocket trade feed
//!
//! Subscribes to the trades channel for one market and forwards validated
//! trade events over an mpsc channel. Malformed trades are logged and dropped;
//! connection loss triggers a delayed reconnect.

use crate::TradeEvent;
use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// One frame from the trades channel
#[derive(Debug, Deserialize)]
struct FeedMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Vec<RawTrade>,
}

/// Unvalidated trade fields as they arrive on the wire
#[derive(Debug, Deserialize)]
struct RawTrade {
    time: String,
    price: f64,
    size: f64,
}

/// Parse one text frame into validated trade events.
///
/// Non-update frames (subscription acks, heartbeats) yield nothing. Trades
/// failing validation are logged and skipped so a single bad payload can
/// never corrupt a bucket.
fn parse_frame(text: &str) -> Vec<TradeEvent> {
    let Ok(msg) = serde_json::from_str::<FeedMessage>(text) else {
        debug!(frame = text, "ignoring unparseable feed frame");
        return Vec::new();
    };
    if msg.kind != "update" {
        return Vec::new();
    }
    msg.data
        .iter()
        .filter_map(|raw| match TradeEvent::from_parts(&raw.time, raw.price, raw.size) {
            Ok(event) => Some(event),
            Err(err) => {
                warn!(error = %err, "dropping malformed trade event");
                None
            }
        })
        .collect()
}

/// Websocket feed of trade events for one market
pub struct TradeFeed {
    ws_url: String,
    instrument: String,
}

impl TradeFeed {
    /// Create a feed for the given websocket endpoint and market
    #[must_use]
    pub fn new(ws_url: impl Into<String>, instrument: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            instrument: instrument.into(),
        }
    }

    /// Run the feed until the consumer side of `tx` is dropped.
    ///
    /// Each connection failure is logged and followed by a delayed reconnect;
    /// the subscription handshake is repeated on every connect.
    pub async fn run(&self, tx: mpsc::Sender<TradeEvent>) -> Result<()> {
        loop {
            if let Err(err) = self.stream_once(&tx).await {
                error!(instrument = self.instrument, error = %err, "trade feed connection lost");
            }
            if tx.is_closed() {
                return Ok(());
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
            warn!(instrument = self.instrument, "reconnecting trade feed");
        }
    }

    /// One connect-subscribe-consume cycle.
    async fn stream_once(&self, tx: &mpsc::Sender<TradeEvent>) -> Result<()> {
        let (ws_stream, _) = connect_async(&self.ws_url).await?;
        let (mut write, mut read) = ws_stream.split();

        let subscribe = serde_json::json!({
            "op": "subscribe",
            "channel": "trades",
            "market": self.instrument,
        });
        write.send(Message::Text(subscribe.to_string())).await?;
        info!(
            instrument = self.instrument,
            url = self.ws_url,
            "subscribed to trade feed"
        );

        while let Some(msg) = read.next().await {
            match msg? {
                Message::Text(text) => {
                    for event in parse_frame(&text) {
                        if tx.send(event).await.is_err() {
                            // Consumer is gone; shut the connection down.
                            return Ok(());
                        }
                    }
                }
                Message::Ping(payload) => write.send(Message::Pong(payload)).await?,
                Message::Close(_) => break,
                _ => {}
            }
        }
        Ok(())
    }
}
