use std::time::Duration;

use confluence::{ConfluenceError, ExchangeDataSource, Interval, SourceConfig, TimeframeConfig};
use confluence_mock::MockBehavior;

use crate::helpers::{BTC, ETH, seeded_mock, symbols};

fn table() -> Vec<TimeframeConfig> {
    vec![
        TimeframeConfig::new(Interval::M1, 5).unwrap(),
        TimeframeConfig::new(Interval::H1, 3).unwrap(),
    ]
}

#[tokio::test(start_paused = true)]
async fn test_one_session_reused_with_delay_between_symbols() {
    let (mock, controller) = seeded_mock().await;
    let source = ExchangeDataSource::new(mock, SourceConfig::default());

    let started = tokio::time::Instant::now();
    let report = source
        .fetch_multi_timeframe_candles(&symbols(&[BTC, "DOGE/USDT", ETH]), &table())
        .await;
    let elapsed = started.elapsed();

    // two pauses per timeframe at the default 100 ms
    assert!(elapsed >= Duration::from_millis(400));
    assert!(elapsed < Duration::from_millis(500));

    let keys: Vec<Interval> = report.data.iter().map(|(iv, _)| *iv).collect();
    assert_eq!(keys, vec![Interval::M1, Interval::H1]);
    assert_eq!(report.data[0].1.len(), 10);
    assert_eq!(report.data[1].1.len(), 6);
    assert_eq!(report.warnings.len(), 2);

    let log = controller.log().await;
    assert_eq!(log.sessions_opened, 1);
    assert_eq!(log.catalogue_loads, 1);
    assert_eq!(log.sessions_closed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_single_symbol_never_sleeps() {
    let (mock, _controller) = seeded_mock().await;
    let source = ExchangeDataSource::new(mock, SourceConfig::default());

    let started = tokio::time::Instant::now();
    let report = source
        .fetch_multi_timeframe_candles(&symbols(&[BTC]), &table())
        .await;
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_results_keyed_by_requested_interval() {
    let (mock, controller) = seeded_mock().await;
    let source = ExchangeDataSource::new(mock, crate::helpers::source_cfg());
    let table = vec![TimeframeConfig::new(Interval::S1, 4).unwrap()];

    let report = source
        .fetch_multi_timeframe_candles(&symbols(&[ETH]), &table)
        .await;
    assert_eq!(report.data.len(), 1);
    assert_eq!(report.data[0].0, Interval::S1);
    assert!(report.data[0].1.iter().all(|c| c.interval == Interval::M1));
    assert_eq!(controller.log().await.ohlcv_calls[0].interval, Interval::M1);
}

#[tokio::test]
async fn test_catalogue_failure_yields_empty_entries() {
    let (mock, controller) = seeded_mock().await;
    controller
        .set_catalogue_behavior(MockBehavior::Fail(ConfluenceError::Other("503".into())))
        .await;
    let source = ExchangeDataSource::new(mock, crate::helpers::source_cfg());

    let report = source
        .fetch_multi_timeframe_candles(&symbols(&[BTC, ETH]), &table())
        .await;
    assert_eq!(
        report.data,
        vec![(Interval::M1, Vec::new()), (Interval::H1, Vec::new())]
    );
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(report.warnings[0], ConfluenceError::CatalogueLoad { .. }));
    assert!(controller.log().await.ohlcv_calls.is_empty());
}
