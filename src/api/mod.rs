pub mod coinbase;

pub use coinbase::{CandleConfig, CandleSource, CoinbaseCandleClient, Lookback};
