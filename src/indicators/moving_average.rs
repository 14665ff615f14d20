/// The shared value of a window whose prices are all identical
fn flat_value(window: &[f64]) -> Option<f64> {
    let first = *window.first()?;
    window.iter().all(|&p| p == first).then_some(first)
}

/// Calculate Simple Moving Average (SMA) over the most recent `period` prices
///
/// A flat window returns its price exactly, so averages of different
/// lengths agree on a constant series.
pub fn calculate_sma(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let window = &prices[prices.len() - period..];
    if let Some(price) = flat_value(window) {
        return Some(price);
    }

    let sum: f64 = window.iter().sum();
    Some(sum / period as f64)
}

/// Rolling SMA aligned with the input.
///
/// Entry `i` is `None` until `period` prices ending at `i` are available.
pub fn sma_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    (0..prices.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                None
            } else {
                calculate_sma(&prices[..=i], period)
            }
        })
        .collect()
}

/// Sample standard deviation (n - 1 denominator) of the last `period` prices
pub fn calculate_std_dev(prices: &[f64], period: usize) -> Option<f64> {
    if period < 2 || prices.len() < period {
        return None;
    }

    let window = &prices[prices.len() - period..];
    // Rounding in the mean would leave a tiny non-zero spread
    if flat_value(window).is_some() {
        return Some(0.0);
    }

    let mean = window.iter().sum::<f64>() / period as f64;
    let variance = window.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (period - 1) as f64;

    Some(variance.sqrt())
}
