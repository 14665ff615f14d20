use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use super::source::TradeSource;
use crate::models::TradeEvent;

/// Feed connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub url: String,
    /// Delay before the first reconnect attempt
    pub reconnect_delay_secs: u64,
    /// Ceiling for the doubling reconnect delay
    pub max_reconnect_delay_secs: u64,
    /// Force a fresh connection after this long, even if still healthy
    pub cycle_secs: u64,
    pub channel_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "wss://ws-feed.exchange.coinbase.com".to_string(),
            reconnect_delay_secs: 1,
            max_reconnect_delay_secs: 30,
            cycle_secs: 50 * 60,
            channel_capacity: 1000,
        }
    }
}

/// Counters reported when the supervisor stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisorStats {
    pub sessions: u64,
    pub failures: u64,
    pub forced_cycles: u64,
}

/// Owns the lifecycle of a trade source connection.
///
/// Runs one session at a time, tears it down after `cycle` to avoid a
/// silently stale connection, and reconnects after failures with a doubling
/// delay bounded by `max_delay`. Stops when the shutdown flag flips to true
/// or every receiver of the trade channel is gone.
pub struct FeedSupervisor<S: TradeSource> {
    source: S,
    reconnect_delay: Duration,
    max_delay: Duration,
    cycle: Duration,
}

enum SessionEnd {
    Closed,
    Failed,
    Cycled,
    Shutdown,
}

impl<S: TradeSource> FeedSupervisor<S> {
    pub fn new(source: S, reconnect_delay: Duration, max_delay: Duration, cycle: Duration) -> Self {
        Self {
            source,
            reconnect_delay,
            max_delay: max_delay.max(reconnect_delay),
            cycle,
        }
    }

    pub fn from_config(source: S, config: &FeedConfig) -> Self {
        Self::new(
            source,
            Duration::from_secs(config.reconnect_delay_secs),
            Duration::from_secs(config.max_reconnect_delay_secs),
            Duration::from_secs(config.cycle_secs),
        )
    }

    /// Run sessions until shutdown
    pub async fn run(
        mut self,
        sender: mpsc::Sender<TradeEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) -> SupervisorStats {
        let mut stats = SupervisorStats::default();
        let mut delay = self.reconnect_delay;
        let name = self.source.name().to_string();

        loop {
            if *shutdown.borrow() || sender.is_closed() {
                break;
            }

            stats.sessions += 1;
            tracing::info!(
                source = %name,
                session = stats.sessions,
                "Starting trade feed session"
            );

            let end = {
                let session = self.source.run(sender.clone());
                tokio::pin!(session);

                tokio::select! {
                    result = &mut session => match result {
                        Ok(()) => SessionEnd::Closed,
                        Err(e) => {
                            tracing::warn!(source = %name, "Trade feed disrupted: {}", e);
                            SessionEnd::Failed
                        }
                    },
                    _ = tokio::time::sleep(self.cycle) => SessionEnd::Cycled,
                    _ = shutdown.changed() => SessionEnd::Shutdown,
                }
            };

            match end {
                SessionEnd::Shutdown => break,
                SessionEnd::Cycled => {
                    stats.forced_cycles += 1;
                    delay = self.reconnect_delay;
                    tracing::info!(
                        "Closing trade feed after {}s, reconnecting",
                        self.cycle.as_secs()
                    );
                }
                SessionEnd::Closed => {
                    delay = self.reconnect_delay;
                    tracing::info!("Trade feed closed, restarting in {:?}", delay);
                }
                SessionEnd::Failed => {
                    stats.failures += 1;
                    tracing::info!("Restarting trade feed in {:?}", delay);
                }
            }

            let wait = delay;
            if matches!(end, SessionEnd::Failed) {
                delay = (delay * 2).min(self.max_delay);
            }

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = shutdown.changed() => break,
            }
        }

        tracing::info!(
            sessions = stats.sessions,
            failures = stats.failures,
            forced_cycles = stats.forced_cycles,
            "Trade feed supervisor stopped"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SignalError;
    use crate::models::TradeSide;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn trade() -> TradeEvent {
        TradeEvent {
            timestamp: Utc::now(),
            price: 0.5,
            size: 1.0,
            side: TradeSide::Buy,
            product_id: "XRP-USD".to_string(),
        }
    }

    /// Sends one trade per session, then fails or hangs
    struct ScriptedSource {
        runs: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl TradeSource for ScriptedSource {
        async fn run(&mut self, sender: mpsc::Sender<TradeEvent>) -> Result<(), SignalError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            let _ = sender.send(trade()).await;
            if self.fail {
                Err(SignalError::FeedDisruption("connection reset".to_string()))
            } else {
                std::future::pending::<()>().await;
                Ok(())
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn test_reconnects_after_failure() {
        let runs = Arc::new(AtomicUsize::new(0));
        let source = ScriptedSource {
            runs: runs.clone(),
            fail: true,
        };
        let supervisor = FeedSupervisor::new(
            source,
            Duration::from_millis(5),
            Duration::from_millis(10),
            Duration::from_secs(60),
        );

        let (tx, mut rx) = mpsc::channel(100);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(supervisor.run(tx, shutdown_rx));

        for _ in 0..3 {
            rx.recv().await.unwrap();
        }
        shutdown_tx.send(true).unwrap();

        let stats = handle.await.unwrap();
        assert!(stats.sessions >= 3);
        assert!(stats.failures >= 2);
        assert!(runs.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn test_forced_cycle_restarts_healthy_session() {
        let runs = Arc::new(AtomicUsize::new(0));
        let source = ScriptedSource {
            runs: runs.clone(),
            fail: false,
        };
        let supervisor = FeedSupervisor::new(
            source,
            Duration::from_millis(1),
            Duration::from_millis(1),
            Duration::from_millis(20),
        );

        let (tx, mut rx) = mpsc::channel(100);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(supervisor.run(tx, shutdown_rx));

        for _ in 0..2 {
            rx.recv().await.unwrap();
        }
        shutdown_tx.send(true).unwrap();

        let stats = handle.await.unwrap();
        assert!(stats.forced_cycles >= 1);
        assert_eq!(stats.failures, 0);
    }

    #[tokio::test]
    async fn test_shutdown_stops_hanging_session() {
        let source = ScriptedSource {
            runs: Arc::new(AtomicUsize::new(0)),
            fail: false,
        };
        let supervisor = FeedSupervisor::new(
            source,
            Duration::from_millis(1),
            Duration::from_millis(1),
            Duration::from_secs(3600),
        );

        let (tx, mut rx) = mpsc::channel(100);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(supervisor.run(tx, shutdown_rx));

        rx.recv().await.unwrap();
        shutdown_tx.send(true).unwrap();

        let stats = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("supervisor should stop promptly")
            .unwrap();
        assert_eq!(stats.sessions, 1);
    }

    #[test]
    fn test_default_config() {
        let config = FeedConfig::default();
        assert_eq!(config.cycle_secs, 3000);
        assert_eq!(config.reconnect_delay_secs, 1);
    }
}
