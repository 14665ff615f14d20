//! Configuration types

use serde::{Deserialize, Serialize};

use crate::api::CandleConfig;
use crate::error::SignalError;
use crate::feed::FeedConfig;
use crate::notify::NotifyConfig;
use crate::persistence::DEFAULT_MAX_LINES;
use crate::strategy::{DecisionConfig, SizingConfig};

/// Trade window aggregation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Trailing duration each window covers
    pub window_secs: u64,
    /// Seconds between window ticks
    pub tick_secs: u64,
    pub product_ids: Vec<String>,
    /// Windows at or above this total volume are broadcast
    pub alert_volume: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            window_secs: 60,
            tick_secs: 30,
            product_ids: vec!["XRP-USD".to_string()],
            alert_volume: 1_400_000.0,
        }
    }
}

/// Ratio log location and size cap
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatioLogConfig {
    pub path: String,
    pub max_lines: usize,
}

impl Default for RatioLogConfig {
    fn default() -> Self {
        Self {
            path: "trade_analysis.txt".to_string(),
            max_lines: DEFAULT_MAX_LINES,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub aggregator: AggregatorConfig,
    pub decision: DecisionConfig,
    pub sizing: SizingConfig,
    pub feed: FeedConfig,
    pub ratio_log: RatioLogConfig,
    pub candles: CandleConfig,
    pub notify: NotifyConfig,
}

impl AppConfig {
    /// Reject values the loops cannot run with
    pub fn validate(&self) -> Result<(), SignalError> {
        let checks = [
            (self.aggregator.window_secs == 0, "aggregator.window_secs must be > 0"),
            (self.aggregator.tick_secs == 0, "aggregator.tick_secs must be > 0"),
            (self.aggregator.product_ids.is_empty(), "aggregator.product_ids must not be empty"),
            (self.decision.poll_secs == 0, "decision.poll_secs must be > 0"),
            (self.decision.min_streak == 0, "decision.min_streak must be > 0"),
            (self.decision.volume_threshold < 0.0, "decision.volume_threshold must be >= 0"),
            (self.feed.cycle_secs == 0, "feed.cycle_secs must be > 0"),
            (self.feed.channel_capacity == 0, "feed.channel_capacity must be > 0"),
            (self.ratio_log.max_lines == 0, "ratio_log.max_lines must be > 0"),
            (self.candles.lookback_minutes < 20, "candles.lookback_minutes must be >= 20"),
        ];

        match checks.iter().find(|(failed, _)| *failed) {
            Some((_, message)) => Err(SignalError::Config(message.to_string())),
            None => Ok(()),
        }
    }
}
