use crate::models::Decision;
use serde::{Deserialize, Serialize};

/// Parameters of the %B sizing rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    /// Continuous rule: buy fraction = (%B + buy_offset) * buy_scale
    pub buy_offset: f64,
    pub buy_scale: f64,
    /// Continuous rule: sell fraction = min((1 - %B) * sell_scale, 1)
    pub sell_scale: f64,
    /// Threshold rule: buy above this %B
    pub threshold_upper: f64,
    /// Threshold rule: sell below this %B
    pub threshold_lower: f64,
    pub threshold_buy_pct: f64,
    pub threshold_sell_pct: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            buy_offset: 0.3,
            buy_scale: 0.20,
            sell_scale: 0.40,
            threshold_upper: 0.94,
            threshold_lower: 0.06,
            threshold_buy_pct: 30.0,
            threshold_sell_pct: 60.0,
        }
    }
}

/// Both %B sizing rules evaluated for one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizingReport {
    pub percent_b: Option<f64>,
    /// Fraction of cash the continuous rule would spend
    pub buy_fraction: Option<f64>,
    /// Fraction of the position the continuous rule would sell
    pub sell_fraction: Option<f64>,
    pub threshold: Decision,
}

/// Maps %B or a streak length to a trade size
#[derive(Debug, Clone, Default)]
pub struct PositionSizer {
    config: SizingConfig,
}

impl PositionSizer {
    pub fn new(config: SizingConfig) -> Self {
        Self { config }
    }

    /// Fraction of available cash to spend. Not bounded to [0, 1]; callers
    /// clamp against the real balance.
    pub fn buy_fraction(&self, percent_b: f64) -> f64 {
        (percent_b + self.config.buy_offset) * self.config.buy_scale
    }

    /// Fraction of the held position to sell, capped at 1
    pub fn sell_fraction(&self, percent_b: f64) -> f64 {
        ((1.0 - percent_b) * self.config.sell_scale).min(1.0)
    }

    /// Fixed-size decision from %B thresholds.
    ///
    /// An undefined %B (zero-width band) carries no signal and holds.
    pub fn threshold_decision(&self, percent_b: Option<f64>) -> Decision {
        match percent_b {
            Some(pb) if pb > self.config.threshold_upper => {
                Decision::buy(self.config.threshold_buy_pct)
            }
            Some(pb) if pb < self.config.threshold_lower => {
                Decision::sell(self.config.threshold_sell_pct)
            }
            _ => Decision::hold(),
        }
    }
}

impl PositionSizer {
    /// Continuous fractions (when %B is defined) and the threshold decision
    pub fn report(&self, percent_b: Option<f64>) -> SizingReport {
        SizingReport {
            percent_b,
            buy_fraction: percent_b.map(|pb| self.buy_fraction(pb)),
            sell_fraction: percent_b.map(|pb| self.sell_fraction(pb)),
            threshold: self.threshold_decision(percent_b),
        }
    }
}

/// Percentage for a streak: `base` at `min_streak`, one point per extra window, capped
pub fn streak_percentage(streak: usize, min_streak: usize, base: f64, cap: f64) -> f64 {
    let extra = streak.saturating_sub(min_streak) as f64;
    (base + extra).min(cap)
}
