/// Calculate Relative Strength Index (RSI)
///
/// Average gain and average loss are simple means of the positive and
/// negative close-to-close changes over the last `period` deltas.
///
/// Values:
/// - RSI > 70: Overbought
/// - RSI < 30: Oversold
///
/// When there is no loss in the window RS is unbounded and the RSI
/// saturates at 100.
pub fn calculate_rsi(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period + 1 {
        return None;
    }

    Some(rsi_from_window(&prices[prices.len() - period - 1..]))
}

/// Rolling RSI aligned with the input; the first `period` entries are `None`
pub fn rsi_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; prices.len()];
    }

    (0..prices.len())
        .map(|i| (i >= period).then(|| rsi_from_window(&prices[i - period..=i])))
        .collect()
}

/// RSI over every close-to-close change in `window`
fn rsi_from_window(window: &[f64]) -> f64 {
    let period = (window.len() - 1) as f64;

    let (gain, loss) = window
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold((0.0, 0.0), |(gain, loss), change| {
            if change > 0.0 {
                (gain + change, loss)
            } else {
                (gain, loss - change)
            }
        });

    let avg_gain = gain / period;
    let avg_loss = loss / period;

    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}
