use chrono::{DateTime, Utc};
use serde::Serialize;

use super::bollinger::{calculate_bollinger, BollingerBands};
use super::crossover::CrossoverDetector;
use super::moving_average::sma_series;
use super::rsi::rsi_series;
use crate::error::SignalError;
use crate::models::{Candle, CrossSignal};

/// Hard floor on the number of candles an analysis call accepts
pub const MIN_CANDLES: usize = 20;

/// Periods used by the indicator engine
#[derive(Debug, Clone)]
pub struct IndicatorConfig {
    pub short_ma_period: usize,
    pub long_ma_period: usize,
    pub band_period: usize,
    pub band_k: f64,
    pub rsi_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            short_ma_period: 5,
            long_ma_period: 10,
            band_period: 20,
            band_k: 2.0,
            rsi_period: 14,
        }
    }
}

impl IndicatorConfig {
    /// Minimum candles for every indicator to be populated on the last row
    pub fn min_candles_required(&self) -> usize {
        MIN_CANDLES
            .max(self.band_period)
            .max(self.long_ma_period)
            .max(self.rsi_period + 1)
    }
}

/// Indicators derived for one candle. Fields stay `None` until their
/// lookback window is fully populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub start_time: DateTime<Utc>,
    pub close: f64,
    pub ma5: Option<f64>,
    pub ma10: Option<f64>,
    pub middle_band: Option<f64>,
    pub upper_band: Option<f64>,
    pub lower_band: Option<f64>,
    pub std_dev: Option<f64>,
    pub rsi: Option<f64>,
    pub percent_b: Option<f64>,
    pub cross_signal: CrossSignal,
}

/// Latest-row summary consumed by sizing and reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub start_time: DateTime<Utc>,
    pub close: f64,
    pub signal: CrossSignal,
    pub rsi: Option<f64>,
    pub percent_b: Option<f64>,
    pub ma5: Option<f64>,
    pub ma10: Option<f64>,
    pub upper_band: Option<f64>,
    pub middle_band: Option<f64>,
    pub lower_band: Option<f64>,
}

impl From<&IndicatorRow> for IndicatorSnapshot {
    fn from(row: &IndicatorRow) -> Self {
        Self {
            start_time: row.start_time,
            close: row.close,
            signal: row.cross_signal,
            rsi: row.rsi,
            percent_b: row.percent_b,
            ma5: row.ma5,
            ma10: row.ma10,
            upper_band: row.upper_band,
            middle_band: row.middle_band,
            lower_band: row.lower_band,
        }
    }
}

/// Computes moving averages, Bollinger Bands, RSI and %B over a candle series
#[derive(Debug, Clone, Default)]
pub struct CandleIndicatorEngine {
    config: IndicatorConfig,
}

impl CandleIndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    /// Annotate every candle with its indicator row.
    ///
    /// Fails with `InsufficientHistory` below the minimum candle count and
    /// with `DegenerateInput` if start times are not strictly increasing.
    /// Cross signals are left at `None`; see [`CrossoverDetector`].
    pub fn compute(&self, candles: &[Candle]) -> Result<Vec<IndicatorRow>, SignalError> {
        let required = self.config.min_candles_required();
        if candles.len() < required {
            return Err(SignalError::InsufficientHistory {
                required,
                actual: candles.len(),
            });
        }

        if let Some(pair) = candles
            .windows(2)
            .find(|pair| pair[1].start_time <= pair[0].start_time)
        {
            return Err(SignalError::DegenerateInput(format!(
                "candles not strictly increasing: {} followed by {}",
                pair[0].start_time, pair[1].start_time
            )));
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let ma_short = sma_series(&closes, self.config.short_ma_period);
        let ma_long = sma_series(&closes, self.config.long_ma_period);
        let rsi = rsi_series(&closes, self.config.rsi_period);
        let bands: Vec<Option<BollingerBands>> = (0..closes.len())
            .map(|i| {
                calculate_bollinger(&closes[..=i], self.config.band_period, self.config.band_k)
            })
            .collect();

        let rows = candles
            .iter()
            .enumerate()
            .map(|(i, candle)| {
                let band = bands[i];

                IndicatorRow {
                    start_time: candle.start_time,
                    close: candle.close,
                    ma5: ma_short[i],
                    ma10: ma_long[i],
                    middle_band: band.map(|b| b.middle),
                    upper_band: band.map(|b| b.upper),
                    lower_band: band.map(|b| b.lower),
                    std_dev: band.map(|b| b.std_dev),
                    rsi: rsi[i],
                    percent_b: band.and_then(|b| b.percent_b(candle.close)),
                    cross_signal: CrossSignal::None,
                }
            })
            .collect();

        Ok(rows)
    }

    /// Compute indicators and cross signals for the whole series
    pub fn analyze(&self, candles: &[Candle]) -> Result<Vec<IndicatorRow>, SignalError> {
        let mut rows = self.compute(candles)?;
        CrossoverDetector::detect(&mut rows);
        Ok(rows)
    }

    /// Indicators and cross signal of the newest candle
    pub fn analyze_latest(&self, candles: &[Candle]) -> Result<IndicatorSnapshot, SignalError> {
        let rows = self.analyze(candles)?;
        let latest = rows.last().ok_or(SignalError::InsufficientHistory {
            required: self.config.min_candles_required(),
            actual: 0,
        })?;

        let snapshot = IndicatorSnapshot::from(latest);
        tracing::debug!(
            time = %snapshot.start_time,
            close = snapshot.close,
            signal = snapshot.signal.as_i8(),
            rsi = ?snapshot.rsi,
            percent_b = ?snapshot.percent_b,
            "Latest indicators"
        );

        Ok(snapshot)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    pub(crate) fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        let base = Utc.with_ymd_and_hms(2024, 11, 27, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                start_time: base + Duration::minutes(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn test_insufficient_history() {
        let engine = CandleIndicatorEngine::default();
        for n in [0, 1, 10, 19] {
            let candles = candles_from_closes(&vec![1.0; n]);
            let err = engine.compute(&candles).unwrap_err();
            assert!(matches!(
                err,
                SignalError::InsufficientHistory { required: 20, actual } if actual == n
            ));
        }
    }

    #[test]
    fn test_exactly_twenty_candles_populates_last_row() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect();
        let rows = CandleIndicatorEngine::default()
            .compute(&candles_from_closes(&closes))
            .unwrap();

        let last = rows.last().unwrap();
        assert!(last.ma5.is_some());
        assert!(last.ma10.is_some());
        assert!(last.middle_band.is_some());
        assert!(last.rsi.is_some());
        assert!(last.percent_b.is_some());
    }

    #[test]
    fn test_warmup_rows_are_undefined() {
        let closes: Vec<f64> = (0..30).map(|i| 50.0 + i as f64).collect();
        let rows = CandleIndicatorEngine::default()
            .compute(&candles_from_closes(&closes))
            .unwrap();

        assert!(rows[3].ma5.is_none());
        assert!(rows[4].ma5.is_some());
        assert!(rows[8].ma10.is_none());
        assert!(rows[9].ma10.is_some());
        assert!(rows[18].upper_band.is_none());
        assert!(rows[19].upper_band.is_some());
        assert!(rows[13].rsi.is_none());
        assert!(rows[14].rsi.is_some());
    }

    #[test]
    fn test_constant_price_degenerate_guards() {
        let rows = CandleIndicatorEngine::default()
            .analyze(&candles_from_closes(&[42.0; 25]))
            .unwrap();
        let last = rows.last().unwrap();

        assert_eq!(last.std_dev, Some(0.0));
        assert_eq!(last.rsi, Some(100.0));
        assert!(last.percent_b.is_none());
        assert!(rows.iter().all(|r| r.cross_signal == CrossSignal::None));
    }

    #[test]
    fn test_flat_realistic_prices_leave_percent_b_undefined() {
        for close in [1.4093, 0.1, 2.3456] {
            let rows = CandleIndicatorEngine::default()
                .analyze(&candles_from_closes(&[close; 25]))
                .unwrap();
            let last = rows.last().unwrap();

            assert_eq!(last.std_dev, Some(0.0), "close {}", close);
            assert_eq!(last.upper_band, last.lower_band);
            assert_eq!(last.middle_band, Some(close));
            assert!(last.percent_b.is_none(), "close {}", close);
            assert_eq!(last.ma5, last.ma10);
            assert!(rows.iter().all(|r| r.cross_signal == CrossSignal::None));
        }
    }

    #[test]
    fn test_rejects_unordered_candles() {
        let mut candles = candles_from_closes(&[1.0; 20]);
        candles.swap(5, 6);
        let err = CandleIndicatorEngine::default().compute(&candles).unwrap_err();
        assert!(matches!(err, SignalError::DegenerateInput(_)));
    }

    #[test]
    fn test_analyze_latest_matches_last_row() {
        let closes: Vec<f64> = (0..40).map(|i| 10.0 + ((i as f64) / 3.0).cos()).collect();
        let candles = candles_from_closes(&closes);
        let engine = CandleIndicatorEngine::default();

        let rows = engine.analyze(&candles).unwrap();
        let snapshot = engine.analyze_latest(&candles).unwrap();

        assert_eq!(snapshot, IndicatorSnapshot::from(rows.last().unwrap()));
        assert_eq!(snapshot.close, *closes.last().unwrap());
    }
}
