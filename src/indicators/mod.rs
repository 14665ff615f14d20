// Technical indicators module
// Moving averages, Bollinger Bands, RSI and %B over 1-minute candles

pub mod bollinger;
pub mod crossover;
pub mod engine;
pub mod moving_average;
pub mod rsi;

pub use bollinger::{calculate_bollinger, percent_b, BollingerBands};
pub use crossover::CrossoverDetector;
pub use engine::{
    CandleIndicatorEngine, IndicatorConfig, IndicatorRow, IndicatorSnapshot, MIN_CANDLES,
};
pub use moving_average::{calculate_sma, calculate_std_dev, sma_series};
pub use rsi::{calculate_rsi, rsi_series};
