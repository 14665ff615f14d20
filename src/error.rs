//! Error types for signal generation and its boundaries

use thiserror::Error;

/// Failure modes of the signal core.
///
/// None of these are fatal to the running process: callers turn every
/// variant into a HOLD decision or a skipped cycle.
#[derive(Error, Debug)]
pub enum SignalError {
    /// Fewer candles or windows than the computation requires
    #[error("insufficient history: need at least {required}, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    /// Input that makes a computation undefined (zero-width band, zero volume)
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// Trade feed connection dropped or delivered an unusable message
    #[error("feed disruption: {0}")]
    FeedDisruption(String),

    /// A persisted ratio log line did not match the expected format
    #[error("ratio log format error: {0}")]
    LogFormat(String),

    /// Invalid configuration value
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for SignalError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        SignalError::FeedDisruption(err.to_string())
    }
}

impl From<serde_json::Error> for SignalError {
    fn from(err: serde_json::Error) -> Self {
        SignalError::FeedDisruption(format!("malformed message: {}", err))
    }
}
