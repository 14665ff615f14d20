//! Trade source abstraction

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::SignalError;
use crate::models::TradeEvent;

/// Default capacity of the channel between a source and the aggregator
pub const DEFAULT_CHANNEL_SIZE: usize = 1000;

/// A restartable producer of trade events.
///
/// Each call to [`TradeSource::run`] opens one session (for a websocket, one
/// connection) and forwards trades in arrival order until the session ends.
/// The supervisor decides when to call it again.
#[async_trait]
pub trait TradeSource: Send {
    /// Stream trades into `sender` until the session ends.
    ///
    /// `Ok` means the remote side closed or the receiver went away;
    /// `Err` means the session was disrupted.
    async fn run(&mut self, sender: mpsc::Sender<TradeEvent>) -> Result<(), SignalError>;

    /// Get the name of the source
    fn name(&self) -> &str;
}

/// Create the bounded trade channel
pub fn create_trade_channel(
    size: usize,
) -> (mpsc::Sender<TradeEvent>, mpsc::Receiver<TradeEvent>) {
    mpsc::channel(size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TradeSide;
    use chrono::Utc;

    fn event(size: f64) -> TradeEvent {
        TradeEvent {
            timestamp: Utc::now(),
            price: 0.5,
            size,
            side: TradeSide::Sell,
            product_id: "XRP-USD".to_string(),
        }
    }

    #[test]
    fn test_channel_is_bounded() {
        let (tx, mut rx) = create_trade_channel(0);

        assert!(tx.try_send(event(1.0)).is_ok());
        // Zero is raised to a capacity of one
        assert!(tx.try_send(event(2.0)).is_err());

        let received = tokio_test::block_on(rx.recv()).unwrap();
        assert_eq!(received.size, 1.0);
    }

    #[test]
    fn test_channel_preserves_order() {
        let (tx, mut rx) = create_trade_channel(DEFAULT_CHANNEL_SIZE);
        tokio_test::block_on(async {
            for size in [1.0, 2.0, 3.0] {
                tx.send(event(size)).await.unwrap();
            }
            drop(tx);

            let mut sizes = Vec::new();
            while let Some(trade) = rx.recv().await {
                sizes.push(trade.size);
            }
            assert_eq!(sizes, vec![1.0, 2.0, 3.0]);
        });
    }
}
