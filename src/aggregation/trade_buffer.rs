use crate::models::{TradeEvent, TradeSide};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Volumes summed by side over the retained trades
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SideVolumes {
    pub buy: f64,
    pub sell: f64,
    pub trades: usize,
}

/// Thread-safe buffer of live trades shared between the feed and the aggregator
///
/// The feed side only appends; the aggregator reads and prunes in one
/// critical section so a concurrent append can never tear a sum.
#[derive(Clone, Default)]
pub struct TradeBuffer {
    data: Arc<Mutex<VecDeque<TradeEvent>>>,
}

impl TradeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic in another holder leaves the deque intact, so keep using it.
    fn lock(&self) -> MutexGuard<'_, VecDeque<TradeEvent>> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a trade.
    ///
    /// Returns `false` and drops the event if its size is not a positive number.
    pub fn push(&self, trade: TradeEvent) -> bool {
        if !(trade.size.is_finite() && trade.size > 0.0) {
            tracing::warn!(
                product = %trade.product_id,
                size = trade.size,
                "Dropping trade with non-positive size"
            );
            return false;
        }

        self.lock().push_back(trade);
        true
    }

    /// Sum volumes of trades at or after `window_start`, then discard older trades.
    pub fn sum_and_prune(&self, window_start: DateTime<Utc>) -> SideVolumes {
        let mut data = self.lock();

        let mut volumes = SideVolumes::default();
        for trade in data.iter().filter(|t| t.timestamp >= window_start) {
            match trade.side {
                TradeSide::Buy => volumes.buy += trade.size,
                TradeSide::Sell => volumes.sell += trade.size,
            }
            volumes.trades += 1;
        }

        data.retain(|t| t.timestamp >= window_start);

        volumes
    }

    /// Number of retained trades
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
