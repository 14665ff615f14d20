//! Coinbase Exchange `matches` channel as a trade source

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, info, warn};

use super::source::TradeSource;
use crate::error::SignalError;
use crate::models::{TradeEvent, TradeSide};

#[derive(Debug, Serialize)]
struct SubscribeMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    channels: Vec<ChannelSubscription<'a>>,
}

#[derive(Debug, Serialize)]
struct ChannelSubscription<'a> {
    name: &'static str,
    product_ids: &'a [String],
}

/// Inbound feed message; only the fields of `match` and `error` are used
#[derive(Debug, Deserialize)]
struct FeedMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    side: Option<TradeSide>,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    product_id: Option<String>,
    #[serde(default)]
    time: Option<DateTime<Utc>>,
}

/// A decoded text frame
#[derive(Debug, Clone, PartialEq)]
pub enum FeedFrame {
    Trade(TradeEvent),
    /// Subscriptions, heartbeats and `last_match` replays
    Ignored,
    /// The server rejected the subscription or the session
    ServerError(String),
}

/// Parse one text frame.
///
/// Only malformed frames (bad JSON, a `match` with missing or unparsable
/// fields) are errors.
pub fn parse_message(text: &str) -> Result<FeedFrame, SignalError> {
    let msg: FeedMessage = serde_json::from_str(text)?;

    match msg.kind.as_str() {
        "match" => {
            let missing = |field: &str| {
                SignalError::FeedDisruption(format!("match message without {}", field))
            };
            let parse = |field: &str, value: Option<String>| -> Result<f64, SignalError> {
                value
                    .ok_or_else(|| missing(field))?
                    .parse::<f64>()
                    .map_err(|e| SignalError::FeedDisruption(format!("bad {}: {}", field, e)))
            };

            Ok(FeedFrame::Trade(TradeEvent {
                timestamp: msg.time.ok_or_else(|| missing("time"))?,
                price: parse("price", msg.price)?,
                size: parse("size", msg.size)?,
                side: msg.side.ok_or_else(|| missing("side"))?,
                product_id: msg.product_id.ok_or_else(|| missing("product_id"))?,
            }))
        }
        "error" => Ok(FeedFrame::ServerError(
            msg.message.unwrap_or_else(|| "unspecified feed error".to_string()),
        )),
        _ => Ok(FeedFrame::Ignored),
    }
}

/// Streams executed trades for a set of products from the public feed
pub struct CoinbaseMatchesSource {
    url: String,
    product_ids: Vec<String>,
}

impl CoinbaseMatchesSource {
    pub fn new(url: impl Into<String>, product_ids: Vec<String>) -> Self {
        Self {
            url: url.into(),
            product_ids,
        }
    }

    fn subscribe_message(&self) -> Result<String, SignalError> {
        let msg = SubscribeMessage {
            kind: "subscribe",
            channels: vec![ChannelSubscription {
                name: "matches",
                product_ids: &self.product_ids,
            }],
        };
        Ok(serde_json::to_string(&msg)?)
    }
}

#[async_trait]
impl TradeSource for CoinbaseMatchesSource {
    async fn run(&mut self, sender: mpsc::Sender<TradeEvent>) -> Result<(), SignalError> {
        info!("Connecting to trade feed: {}", self.url);

        let (ws_stream, _response) = connect_async(self.url.as_str()).await?;
        info!("WebSocket connection opened");

        let (mut write, mut read) = ws_stream.split();

        let subscribe = self.subscribe_message()?;
        debug!("Sending subscription message: {}", subscribe);
        write.send(Message::Text(subscribe)).await?;

        while let Some(msg) = read.next().await {
            match msg? {
                Message::Text(text) => match parse_message(&text) {
                    Ok(FeedFrame::Trade(trade)) => {
                        if sender.send(trade).await.is_err() {
                            info!("Trade receiver dropped, closing feed");
                            return Ok(());
                        }
                    }
                    Ok(FeedFrame::Ignored) => {}
                    Ok(FeedFrame::ServerError(reason)) => {
                        warn!("Trade feed reported an error: {}", reason);
                        return Err(SignalError::FeedDisruption(reason));
                    }
                    Err(e) => warn!("Skipping malformed feed message: {}", e),
                },
                Message::Ping(payload) => {
                    write.send(Message::Pong(payload)).await?;
                }
                Message::Close(frame) => {
                    info!("WebSocket closed: {:?}", frame);
                    return Ok(());
                }
                _ => {}
            }
        }

        info!("WebSocket stream ended");
        Ok(())
    }

    fn name(&self) -> &str {
        "coinbase-matches"
    }
}
