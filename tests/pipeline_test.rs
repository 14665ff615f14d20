use chrono::{DateTime, Duration, TimeZone, Utc};
use flowbot::aggregation::{Alert, LivenessMonitor, TradeWindowAggregator};
use flowbot::execution::{plan_order, Balances, DecisionSink, ExecutionAction, RecordingSink};
use flowbot::indicators::{CandleIndicatorEngine, CrossoverDetector};
use flowbot::persistence::{format_window, RatioLog};
use flowbot::strategy::{
    build_policy, DecisionConfig, PolicyKind, PositionSizer, SignFlipPolicy, TrailingRunPolicy,
};
use flowbot::*;

fn trade(at: DateTime<Utc>, side: TradeSide, size: f64) -> TradeEvent {
    TradeEvent {
        timestamp: at,
        price: 0.55,
        size,
        side,
        product_id: "XRP-USD".to_string(),
    }
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 27, 1, 0, 0).unwrap()
}

/// Feed one window's worth of trades and close it 60s later
fn close_window(
    aggregator: &mut TradeWindowAggregator,
    window_end: DateTime<Utc>,
    buy: f64,
    sell: f64,
) -> TradeWindow {
    let at = window_end - Duration::seconds(10);
    if buy > 0.0 {
        assert!(aggregator.on_trade(trade(at, TradeSide::Buy, buy)));
    }
    if sell > 0.0 {
        assert!(aggregator.on_trade(trade(at, TradeSide::Sell, sell)));
    }
    aggregator.tick(window_end)
}

#[test]
fn test_trailing_run_example() {
    let history: Vec<RatioPoint> = [10.0, 20.0, 30.0, 15.0]
        .iter()
        .map(|&ratio| RatioPoint::new(1_500_000.0, ratio))
        .collect();

    let policy = TrailingRunPolicy::new(DecisionConfig::default());
    let decision = policy.decide(&history);

    assert_eq!(decision.action, Action::Buy);
    assert_eq!(decision.percentage, 4.0);
}

#[test]
fn test_sign_flip_example() {
    let history = vec![
        RatioPoint::new(900_000.0, 5.0),
        RatioPoint::new(1_500_000.0, 8.0),
        RatioPoint::new(1_500_000.0, 12.0),
        RatioPoint::new(1_500_000.0, -3.0),
    ];

    let policy = SignFlipPolicy::new(DecisionConfig::default());
    let decision = policy.decide(&history);

    assert_eq!(decision.action, Action::Sell);
    assert_eq!(decision.percentage, 3.0);
}

#[tokio::test]
async fn test_windows_flow_through_log_into_policy() {
    let dir = tempfile::tempdir().unwrap();
    let log = RatioLog::new(dir.path().join("trade_analysis.txt"), 1000);
    let mut aggregator = TradeWindowAggregator::new(Duration::seconds(60));

    // Four buyer-dominated windows with 1.5M volume each
    for i in 1..=4 {
        let end = start() + Duration::seconds(60 * i);
        let window = close_window(&mut aggregator, end, 1_000_000.0, 500_000.0);
        assert_eq!(window.ratio, 100.0);
        log.append(&window).await.unwrap();
    }

    let points = log.read_points().await.unwrap();
    assert_eq!(points.len(), 4);
    assert!(points.iter().all(|p| p.total_volume == 1_500_000.0));

    let trailing = build_policy(&DecisionConfig::default());
    let decision = trailing.decide(&points);
    assert_eq!(decision, Decision::buy(4.0));

    // Sellers take over in the fifth window
    let end = start() + Duration::seconds(300);
    let window = close_window(&mut aggregator, end, 500_000.0, 1_000_000.0);
    assert_eq!(window.ratio, -100.0);
    log.append(&window).await.unwrap();

    let points = log.read_points().await.unwrap();
    let flip = build_policy(&DecisionConfig {
        policy: PolicyKind::SignFlip,
        ..DecisionConfig::default()
    });
    assert_eq!(flip.decide(&points), Decision::sell(4.0));

    // A single negative window is below the trailing minimum
    assert!(trailing.decide(&points).is_hold());

    let sink = RecordingSink::new();
    sink.emit(&flip.decide(&points));
    let planned = plan_order(
        &sink.decisions()[0],
        &Balances {
            cash: 100.0,
            position: 1000.0,
        },
        0.55,
    )
    .unwrap();
    match planned.action {
        ExecutionAction::Execute { side, base_size, .. } => {
            assert_eq!(side, TradeSide::Sell);
            assert!((base_size - 40.0).abs() < 1e-9);
        }
        ExecutionAction::Skip => panic!("expected a sell order"),
    }
}

#[tokio::test]
async fn test_quiet_feed_alerts_once() {
    let mut aggregator = TradeWindowAggregator::new(Duration::seconds(60));
    let mut liveness = LivenessMonitor::new(1_400_000.0);

    let first = aggregator.tick(start() + Duration::seconds(30));
    assert!(first.is_empty());
    assert_eq!(liveness.observe(&first, &format_window(&first)), vec![Alert::NoTrades]);

    let second = aggregator.tick(start() + Duration::seconds(60));
    assert!(liveness.observe(&second, &format_window(&second)).is_empty());

    let busy = close_window(
        &mut aggregator,
        start() + Duration::seconds(90),
        1_000_000.0,
        600_000.0,
    );
    let alerts = liveness.observe(&busy, &format_window(&busy));
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].message().contains("Total Volume: 1600000"));
}

#[test]
fn test_indicator_snapshot_drives_sizing() {
    // Falling then sharply rising closes produce a golden cross at the end
    let mut closes: Vec<f64> = (0..25).map(|i| 100.0 - i as f64 * 0.5).collect();
    closes.extend([95.0, 98.0, 102.0]);

    let candles: Vec<Candle> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            start_time: start() + Duration::minutes(i as i64),
            open: close,
            high: close + 0.2,
            low: close - 0.2,
            close,
            volume: 1000.0,
        })
        .collect();

    let engine = CandleIndicatorEngine::default();
    let rows = engine.analyze(&candles).unwrap();
    assert!(rows.iter().any(|r| r.cross_signal == CrossSignal::Golden));
    assert_eq!(CrossoverDetector::latest(&rows[..27]), CrossSignal::Golden);

    let snapshot = engine.analyze_latest(&candles).unwrap();
    let percent_b = snapshot.percent_b.unwrap();
    assert!(percent_b > 0.94);

    let sizer = PositionSizer::default();
    assert!(sizer.buy_fraction(percent_b) > 0.2);
    assert_eq!(sizer.threshold_decision(Some(percent_b)), Decision::buy(30.0));
}

#[test]
fn test_short_candle_history_is_rejected() {
    let candles: Vec<Candle> = (0..10)
        .map(|i| Candle {
            start_time: start() + Duration::minutes(i),
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume: 1.0,
        })
        .collect();

    let result = CandleIndicatorEngine::default().analyze_latest(&candles);
    assert!(matches!(
        result,
        Err(SignalError::InsufficientHistory { required: 20, actual: 10 })
    ));
}
