use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candlestick, one per fixed-duration bucket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub start_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Aggressor side of an executed trade
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A single execution delivered by the trade feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeEvent {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub size: f64,
    pub side: TradeSide,
    pub product_id: String,
}

/// Buy/sell volume summary over one trailing window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeWindow {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub buy_volume: f64,
    pub sell_volume: f64,
    pub total_volume: f64,
    pub ratio: f64,
}

impl TradeWindow {
    /// Build a window from side volumes, deriving total and ratio
    pub fn from_volumes(
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        buy_volume: f64,
        sell_volume: f64,
    ) -> Self {
        Self {
            window_start,
            window_end,
            buy_volume,
            sell_volume,
            total_volume: buy_volume + sell_volume,
            ratio: calculate_ratio(buy_volume, sell_volume),
        }
    }

    /// True when no trades landed in the window
    pub fn is_empty(&self) -> bool {
        self.total_volume == 0.0
    }
}

/// The two fields of a window the decision policies look at.
///
/// Built from an in-memory [`TradeWindow`] or parsed back from a ratio log line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RatioPoint {
    pub total_volume: f64,
    pub ratio: f64,
}

impl RatioPoint {
    pub fn new(total_volume: f64, ratio: f64) -> Self {
        Self {
            total_volume,
            ratio,
        }
    }

    /// Buyers dominated the window
    pub fn is_positive(&self) -> bool {
        self.ratio > 0.0
    }
}

impl From<&TradeWindow> for RatioPoint {
    fn from(window: &TradeWindow) -> Self {
        Self::new(window.total_volume, window.ratio)
    }
}

/// Imbalance between buy and sell volume, as a percentage of the weaker side.
///
/// Positive when buyers dominate, negative when sellers dominate. Zero when
/// the volumes are equal or the weaker side has no volume at all.
pub fn calculate_ratio(buy_volume: f64, sell_volume: f64) -> f64 {
    if buy_volume > sell_volume && sell_volume != 0.0 {
        ((buy_volume - sell_volume) / sell_volume) * 100.0
    } else if sell_volume > buy_volume && buy_volume != 0.0 {
        -((sell_volume - buy_volume) / buy_volume) * 100.0
    } else {
        0.0
    }
}

/// Golden/death cross marker on an indicator row
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CrossSignal {
    Golden,
    Death,
    #[default]
    None,
}

impl CrossSignal {
    /// Numeric form used in reports: 1, -1 or 0
    pub fn as_i8(self) -> i8 {
        match self {
            CrossSignal::Golden => 1,
            CrossSignal::Death => -1,
            CrossSignal::None => 0,
        }
    }
}

/// Trading action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
            Action::Hold => write!(f, "HOLD"),
        }
    }
}

/// Action plus the share (0-100) of cash or position it applies to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub percentage: f64,
}

impl Decision {
    pub fn hold() -> Self {
        Self {
            action: Action::Hold,
            percentage: 0.0,
        }
    }

    pub fn buy(percentage: f64) -> Self {
        Self {
            action: Action::Buy,
            percentage: percentage.clamp(0.0, 100.0),
        }
    }

    pub fn sell(percentage: f64) -> Self {
        Self {
            action: Action::Sell,
            percentage: percentage.clamp(0.0, 100.0),
        }
    }

    pub fn is_hold(&self) -> bool {
        self.action == Action::Hold || self.percentage <= 0.0
    }
}
