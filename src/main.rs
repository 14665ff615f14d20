use chrono::Utc;
use clap::{Parser, Subcommand};
use flowbot::aggregation::{LivenessMonitor, LivenessStatus, TradeWindowAggregator};
use flowbot::api::{CandleSource, CoinbaseCandleClient, Lookback};
use flowbot::config::{load_config, AppConfig};
use flowbot::execution::{DecisionSink, LogSink};
use flowbot::feed::{create_trade_channel, CoinbaseMatchesSource, FeedSupervisor};
use flowbot::indicators::CandleIndicatorEngine;
use flowbot::notify::{build_notifier, Notifier};
use flowbot::persistence::{format_window, RatioLog};
use flowbot::strategy::{build_policy, PolicyKind, PositionSizer};
use flowbot::{CrossSignal, Result};
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Order-flow signal bot for a Coinbase product
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stream trades, close windows and append them to the ratio log
    Monitor,
    /// Poll the ratio log and emit streak decisions
    Trade {
        /// Override the configured policy (trailing_run | sign_flip)
        #[arg(long)]
        policy: Option<PolicyKind>,
    },
    /// Fetch recent candles and print the latest indicator snapshot
    Analyze,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Monitor => run_monitor(config).await,
        Command::Trade { policy } => run_trade(config, policy).await,
        Command::Analyze => run_analyze(config).await,
    }
}

// ============================================================================
// Initialization Functions
// ============================================================================

fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("flowbot=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// ============================================================================
// Monitor: feed -> windows -> ratio log
// ============================================================================

async fn run_monitor(config: AppConfig) -> Result<()> {
    tracing::info!("🚀 Flowbot monitor starting");
    tracing::info!("  Products: {}", config.aggregator.product_ids.join(", "));
    tracing::info!(
        "  Window: {}s, tick every {}s",
        config.aggregator.window_secs,
        config.aggregator.tick_secs
    );
    tracing::info!("  Ratio log: {}", config.ratio_log.path);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (sender, mut receiver) = create_trade_channel(config.feed.channel_capacity);

    // Spawn feed supervisor
    let feed_task = {
        let source = CoinbaseMatchesSource::new(
            config.feed.url.clone(),
            config.aggregator.product_ids.clone(),
        );
        let supervisor = FeedSupervisor::from_config(source, &config.feed);
        tokio::spawn(supervisor.run(sender, shutdown_rx))
    };

    let mut aggregator = TradeWindowAggregator::new(chrono::Duration::seconds(
        config.aggregator.window_secs as i64,
    ));

    // Spawn ingest: channel -> shared trade buffer
    let ingest_task = {
        let buffer = aggregator.buffer();
        tokio::spawn(async move {
            let mut rejected = 0u64;
            while let Some(trade) = receiver.recv().await {
                if !buffer.push(trade) {
                    rejected += 1;
                    tracing::debug!("Dropped unusable trade ({} so far)", rejected);
                }
            }
        })
    };

    let ratio_log = RatioLog::new(&config.ratio_log.path, config.ratio_log.max_lines);
    let notifier = build_notifier(&config.notify);
    let mut liveness = LivenessMonitor::new(config.aggregator.alert_volume);

    let mut ticker = interval(Duration::from_secs(config.aggregator.tick_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // First tick fires immediately; let the buffer fill before closing a window
    ticker.tick().await;

    tracing::info!("\nPress Ctrl+C to stop...\n");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                close_window(&mut aggregator, &ratio_log, &mut liveness, notifier.as_ref()).await;
            }
            _ = &mut ctrl_c => {
                tracing::info!("\n⚠️  Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    match feed_task.await {
        Ok(stats) => tracing::info!(
            "Feed stopped: {} sessions, {} failures, {} forced cycles",
            stats.sessions,
            stats.failures,
            stats.forced_cycles
        ),
        Err(e) => tracing::error!("Feed supervisor exited abnormally: {:?}", e),
    }
    ingest_task.abort();

    tracing::info!("👋 Flowbot monitor stopped");
    Ok(())
}

async fn close_window(
    aggregator: &mut TradeWindowAggregator,
    ratio_log: &RatioLog,
    liveness: &mut LivenessMonitor,
    notifier: &dyn Notifier,
) {
    let window = aggregator.tick(Utc::now());
    let line = format_window(&window);
    tracing::info!("📊 {}", line);

    if let Err(e) = ratio_log.append(&window).await {
        tracing::error!("Failed to append to ratio log: {}", e);
    }

    for alert in liveness.observe(&window, &line) {
        if let Err(e) = notifier.notify(&alert.message()).await {
            tracing::warn!("Failed to deliver alert: {}", e);
        }
    }

    if LivenessStatus::from_history(&aggregator.history()) == LivenessStatus::Idle {
        tracing::debug!("Feed idle for the last window");
    }
}

// ============================================================================
// Trade: ratio log -> policy -> decision sink
// ============================================================================

async fn run_trade(config: AppConfig, policy_override: Option<PolicyKind>) -> Result<()> {
    let mut decision_config = config.decision.clone();
    if let Some(kind) = policy_override {
        decision_config.policy = kind;
    }

    let policy = build_policy(&decision_config);
    let ratio_log = RatioLog::new(&config.ratio_log.path, config.ratio_log.max_lines);
    let sink = LogSink;

    tracing::info!("💹 Flowbot trader starting");
    tracing::info!("  Policy: {}", policy.name());
    tracing::info!("  Volume threshold: {}", decision_config.volume_threshold);
    tracing::info!("  Poll every {}s", decision_config.poll_secs);

    let mut ticker = interval(Duration::from_secs(decision_config.poll_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match ratio_log.read_points().await {
                    Ok(points) => {
                        if points.len() < policy.min_windows_required() {
                            tracing::info!(
                                "Waiting for windows: {}/{}",
                                points.len(),
                                policy.min_windows_required()
                            );
                        }
                        let decision = policy.decide(&points);
                        sink.emit(&decision);
                    }
                    Err(e) => tracing::error!("Failed to read ratio log: {}", e),
                }
            }
            _ = &mut ctrl_c => {
                tracing::info!("\n⚠️  Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    tracing::info!("👋 Flowbot trader stopped");
    Ok(())
}

// ============================================================================
// Analyze: candles -> indicator snapshot -> sizing
// ============================================================================

async fn run_analyze(config: AppConfig) -> Result<()> {
    let client = CoinbaseCandleClient::from_config(&config.candles);
    let candles = client
        .get_candles(Lookback::recent(config.candles.lookback_minutes))
        .await?;
    tracing::info!(
        "Fetched {} candles for {}",
        candles.len(),
        config.candles.product_id
    );

    let engine = CandleIndicatorEngine::default();
    let snapshot = engine.analyze_latest(&candles)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    match snapshot.signal {
        CrossSignal::Golden => tracing::info!("📈 Golden cross on the latest candle"),
        CrossSignal::Death => tracing::info!("📉 Death cross on the latest candle"),
        CrossSignal::None => tracing::info!("No crossover on the latest candle"),
    }

    let report = PositionSizer::new(config.sizing.clone()).report(snapshot.percent_b);
    println!("{}", serde_json::to_string_pretty(&report)?);

    match (report.buy_fraction, report.sell_fraction) {
        (Some(buy), Some(sell)) => tracing::info!(
            "%B sizing: buy {:.2}% of cash, sell {:.2}% of position",
            buy * 100.0,
            sell * 100.0
        ),
        _ => tracing::info!("Band width is zero, %B undefined"),
    }
    tracing::info!(
        "Threshold rule: {} {}%",
        report.threshold.action,
        report.threshold.percentage
    );

    Ok(())
}
