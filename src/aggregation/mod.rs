// Sliding-window aggregation of the live trade feed
pub mod liveness;
pub mod trade_buffer;
pub mod window;

pub use liveness::{Alert, LivenessMonitor, LivenessStatus};
pub use trade_buffer::{SideVolumes, TradeBuffer};
pub use window::{TradeWindowAggregator, DEFAULT_HISTORY_LIMIT};
