use super::moving_average::{calculate_sma, calculate_std_dev};

/// Bollinger Bands at a single point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
    pub std_dev: f64,
}

impl BollingerBands {
    /// Band width; zero when every price in the window was identical
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// %B: 0 at the lower band, 1 at the upper band.
    ///
    /// `None` for a zero-width band, where the position is undefined.
    pub fn percent_b(&self, close: f64) -> Option<f64> {
        percent_b(close, self.lower, self.upper)
    }
}

/// Calculate Bollinger Bands over the most recent `period` prices
///
/// Middle band is the SMA, upper/lower are `k` sample standard deviations away.
pub fn calculate_bollinger(prices: &[f64], period: usize, k: f64) -> Option<BollingerBands> {
    let middle = calculate_sma(prices, period)?;
    let std_dev = calculate_std_dev(prices, period)?;

    Some(BollingerBands {
        middle,
        upper: middle + k * std_dev,
        lower: middle - k * std_dev,
        std_dev,
    })
}

/// Position of `close` inside `[lower, upper]`, guarded against a zero-width band
pub fn percent_b(close: f64, lower: f64, upper: f64) -> Option<f64> {
    let width = upper - lower;
    if width == 0.0 || !width.is_finite() {
        return None;
    }
    Some((close - lower) / width)
}
