// Live trade feed: source abstraction, connection supervisor, Coinbase source
pub mod coinbase;
pub mod source;
pub mod supervisor;

pub use coinbase::{parse_message, CoinbaseMatchesSource, FeedFrame};
pub use source::{create_trade_channel, TradeSource, DEFAULT_CHANNEL_SIZE};
pub use supervisor::{FeedConfig, FeedSupervisor, SupervisorStats};
