use crate::models::Candle;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Duration};

const COINBASE_EXCHANGE_API_BASE: &str = "https://api.exchange.coinbase.com";
const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 1000;
/// One-minute candles
const GRANULARITY_SECS: i64 = 60;

/// Candle source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CandleConfig {
    pub api_url: String,
    pub product_id: String,
    pub lookback_minutes: i64,
}

impl Default for CandleConfig {
    fn default() -> Self {
        Self {
            api_url: COINBASE_EXCHANGE_API_BASE.to_string(),
            product_id: "XRP-USD".to_string(),
            lookback_minutes: 250,
        }
    }
}

/// Which span of 1-minute candles to fetch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lookback {
    pub end: DateTime<Utc>,
    pub minutes: i64,
}

impl Lookback {
    /// The `minutes` candles ending now
    pub fn recent(minutes: i64) -> Self {
        Self {
            end: Utc::now(),
            minutes,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.end - ChronoDuration::minutes(self.minutes)
    }
}

/// Anything that can supply an ordered 1-minute candle series
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Candles in the lookback span, oldest first, unique by start time
    async fn get_candles(&self, lookback: Lookback) -> Result<Vec<Candle>>;
}

/// Client for the public Coinbase Exchange candles endpoint
#[derive(Clone)]
pub struct CoinbaseCandleClient {
    client: Client,
    base_url: String,
    product_id: String,
    initial_backoff_ms: u64,
}

impl CoinbaseCandleClient {
    pub fn new(base_url: impl Into<String>, product_id: impl Into<String>) -> Self {
        // The exchange rejects requests without a user agent
        let client = Client::builder()
            .user_agent(concat!("flowbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            product_id: product_id.into(),
            initial_backoff_ms: INITIAL_BACKOFF_MS,
        }
    }

    pub fn from_config(config: &CandleConfig) -> Self {
        Self::new(config.api_url.clone(), config.product_id.clone())
    }

    pub fn with_backoff_ms(mut self, ms: u64) -> Self {
        self.initial_backoff_ms = ms;
        self
    }

    /// Internal method to fetch candles once (without retry logic)
    async fn fetch_candles_once(&self, lookback: &Lookback) -> Result<Vec<Candle>> {
        let url = format!("{}/products/{}/candles", self.base_url, self.product_id);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("granularity", GRANULARITY_SECS.to_string()),
                ("start", lookback.start().timestamp().to_string()),
                ("end", lookback.end.timestamp().to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Coinbase candles API error ({}): {}", status, body).into());
        }

        // Rows are [time, low, high, open, close, volume], newest first
        let rows: Vec<[f64; 6]> = response.json().await?;
        Ok(rows_to_candles(&rows))
    }
}

/// Convert raw rows into candles sorted by start time, dropping duplicates
pub fn rows_to_candles(rows: &[[f64; 6]]) -> Vec<Candle> {
    let mut candles: Vec<Candle> = rows
        .iter()
        .filter_map(|&[time, low, high, open, close, volume]| {
            DateTime::from_timestamp(time as i64, 0).map(|start_time| Candle {
                start_time,
                open,
                high,
                low,
                close,
                volume,
            })
        })
        .collect();

    candles.sort_by_key(|c| c.start_time);
    candles.dedup_by_key(|c| c.start_time);
    candles
}

#[async_trait]
impl CandleSource for CoinbaseCandleClient {
    /// Includes retry logic with exponential backoff for transient failures
    async fn get_candles(&self, lookback: Lookback) -> Result<Vec<Candle>> {
        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            match self.fetch_candles_once(&lookback).await {
                Ok(candles) => {
                    tracing::debug!(
                        product = %self.product_id,
                        count = candles.len(),
                        "Fetched candles"
                    );
                    return Ok(candles);
                }
                Err(e) => {
                    if attempt < MAX_RETRIES {
                        let backoff_ms = self.initial_backoff_ms * 2_u64.pow(attempt - 1);
                        tracing::warn!(
                            "Attempt {}/{} failed for {} candles: {}. Retrying in {}ms...",
                            attempt,
                            MAX_RETRIES,
                            self.product_id,
                            e,
                            backoff_ms
                        );
                        sleep(Duration::from_millis(backoff_ms)).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        // All retries exhausted
        Err(last_error.unwrap_or_else(|| "All retry attempts failed".into()))
    }
}
