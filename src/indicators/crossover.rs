use super::engine::IndicatorRow;
use crate::models::CrossSignal;

/// Golden/death cross detection between the short and long moving averages
pub struct CrossoverDetector;

impl CrossoverDetector {
    /// Signal for row `i` given its predecessor.
    ///
    /// Golden when the short MA moves above the long MA, death when it moves
    /// below. Rows without both averages on both sides never signal.
    pub fn cross_between(previous: &IndicatorRow, current: &IndicatorRow) -> CrossSignal {
        let (Some(prev_short), Some(prev_long), Some(short), Some(long)) =
            (previous.ma5, previous.ma10, current.ma5, current.ma10)
        else {
            return CrossSignal::None;
        };

        if short > long && prev_short <= prev_long {
            CrossSignal::Golden
        } else if short < long && prev_short >= prev_long {
            CrossSignal::Death
        } else {
            CrossSignal::None
        }
    }

    /// Overwrite `cross_signal` on every row. Running it twice gives the same result.
    pub fn detect(rows: &mut [IndicatorRow]) {
        if let Some(first) = rows.first_mut() {
            first.cross_signal = CrossSignal::None;
        }

        for i in 1..rows.len() {
            rows[i].cross_signal = Self::cross_between(&rows[i - 1], &rows[i]);
        }
    }

    /// Signal on the newest row, `None` for an empty series
    pub fn latest(rows: &[IndicatorRow]) -> CrossSignal {
        rows.last().map(|r| r.cross_signal).unwrap_or_default()
    }
}
