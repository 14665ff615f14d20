use super::trade_buffer::TradeBuffer;
use crate::models::{TradeEvent, TradeWindow};
use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

/// Windows kept in memory by default; matches the on-disk ratio log cap
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// Turns the live trade buffer into periodic buy/sell volume windows
pub struct TradeWindowAggregator {
    buffer: TradeBuffer,
    window: Duration,
    history: VecDeque<TradeWindow>,
    history_limit: usize,
}

impl TradeWindowAggregator {
    /// # Arguments
    /// * `window` - Trailing duration each window covers (60s by default)
    pub fn new(window: Duration) -> Self {
        Self {
            buffer: TradeBuffer::new(),
            window,
            history: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    /// Handle for the feed side; appends through it are visible to the next tick
    pub fn buffer(&self) -> TradeBuffer {
        self.buffer.clone()
    }

    /// Push interface for a single trade
    pub fn on_trade(&self, trade: TradeEvent) -> bool {
        self.buffer.push(trade)
    }

    /// Close the window ending at `now`.
    ///
    /// Sums trades in `[now - window, now]`, prunes older ones, and appends the
    /// result to the history. A tick with no trades yields an all-zero window.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TradeWindow {
        let window_start = now - self.window;
        let volumes = self.buffer.sum_and_prune(window_start);

        let window = TradeWindow::from_volumes(window_start, now, volumes.buy, volumes.sell);

        tracing::debug!(
            trades = volumes.trades,
            buy = window.buy_volume,
            sell = window.sell_volume,
            ratio = window.ratio,
            "Window closed"
        );

        self.history.push_back(window.clone());
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }

        window
    }

    /// Completed windows, oldest first. Empty until the first tick.
    pub fn history(&self) -> Vec<TradeWindow> {
        self.history.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&TradeWindow> {
        self.history.back()
    }
}
