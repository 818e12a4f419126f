use std::time::Duration;

use confluence::{ConfluenceError, ExchangeDataSource, Interval, SourceConfig};
use confluence_mock::{MockBehavior, MockController};

use crate::helpers::{
    BTC, BTC_SWAP, ETH, ETH_SWAP, MOCK, seeded_mock, seeded_source, source_cfg, symbols,
};

/// Seeded source whose exchange calls expire after one second.
async fn bounded_source() -> (ExchangeDataSource, MockController) {
    let (mock, controller) = seeded_mock().await;
    let cfg = SourceConfig {
        call_timeout: Some(Duration::from_secs(1)),
        ..source_cfg()
    };
    (ExchangeDataSource::new(mock, cfg), controller)
}

#[tokio::test]
async fn test_session_closed_after_each_call() {
    let (source, controller) = seeded_source().await;
    source
        .fetch_candles(&symbols(&[BTC, ETH]), Interval::M1, 5)
        .await;
    source.fetch_snapshot(&symbols(&[BTC])).await;

    let log = controller.log().await;
    assert_eq!(log.sessions_opened, 2);
    assert_eq!(log.sessions_closed, 2);
    assert_eq!(log.catalogue_loads, 2);
    assert_eq!(log.max_open_sessions, 1);
}

#[tokio::test]
async fn test_catalogue_failure_aborts_and_closes_session() {
    let (source, controller) = seeded_source().await;
    controller
        .set_catalogue_behavior(MockBehavior::Fail(ConfluenceError::Other("503".into())))
        .await;

    let report = source
        .fetch_candles(&symbols(&[BTC, ETH]), Interval::M1, 5)
        .await;
    assert!(report.data.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        &report.warnings[0],
        ConfluenceError::CatalogueLoad { exchange, .. } if exchange == MOCK
    ));

    let snapshot = source.fetch_snapshot(&symbols(&[BTC])).await;
    assert!(snapshot.data.is_empty());
    assert_eq!(snapshot.warnings.len(), 1);

    let log = controller.log().await;
    assert_eq!(log.sessions_opened, 2);
    assert_eq!(log.sessions_closed, 2);
    assert!(log.ohlcv_calls.is_empty());
    assert!(log.ticker_calls.is_empty());
}

#[tokio::test]
async fn test_open_failure_is_reported_as_catalogue_load() {
    let (source, controller) = seeded_source().await;
    controller
        .set_open_session_behavior(MockBehavior::Fail(ConfluenceError::connector(
            MOCK, "refused",
        )))
        .await;

    let report = source.fetch_candles(&symbols(&[BTC]), Interval::H1, 5).await;
    assert!(report.data.is_empty());
    assert!(matches!(
        &report.warnings[..],
        [ConfluenceError::CatalogueLoad { msg, .. }] if msg.contains("refused")
    ));
    assert_eq!(controller.log().await.sessions_opened, 0);
}

#[tokio::test(start_paused = true)]
async fn test_hung_candle_fetch_is_a_symbol_warning_and_session_closes() {
    let (source, controller) = bounded_source().await;
    controller.set_ohlcv_behavior(BTC_SWAP, MockBehavior::Hang).await;

    let report = source
        .fetch_candles(&symbols(&[BTC, ETH]), Interval::M1, 5)
        .await;
    assert_eq!(report.data.len(), 5);
    assert!(report.data.iter().all(|c| c.instrument.symbol == ETH));
    assert!(matches!(
        &report.warnings[..],
        [ConfluenceError::Fetch { symbol, capability, msg }]
            if symbol == BTC && capability == "ohlcv" && msg.contains("timed out")
    ));

    let log = controller.log().await;
    assert_eq!(log.sessions_opened, 1);
    assert_eq!(log.sessions_closed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_hung_catalogue_load_closes_session() {
    let (source, controller) = bounded_source().await;
    controller.set_catalogue_behavior(MockBehavior::Hang).await;

    let report = source.fetch_candles(&symbols(&[BTC]), Interval::M1, 5).await;
    assert!(report.data.is_empty());
    assert!(matches!(
        &report.warnings[..],
        [ConfluenceError::CatalogueLoad { msg, .. }] if msg.contains("timed out")
    ));

    let log = controller.log().await;
    assert_eq!(log.sessions_opened, 1);
    assert_eq!(log.sessions_closed, 1);
    assert!(log.ohlcv_calls.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_hung_optional_field_keeps_ticker() {
    let (source, controller) = bounded_source().await;
    controller
        .set_open_interest_behavior(ETH_SWAP, MockBehavior::Hang)
        .await;

    let report = source.fetch_snapshot(&symbols(&[ETH, BTC])).await;
    assert_eq!(report.data.len(), 2);
    let eth = report.data.get(ETH).unwrap();
    assert!(eth.price().is_some());
    assert!(!eth.contains(confluence::SnapshotField::OpenInterest));
    assert!(matches!(
        &report.warnings[..],
        [ConfluenceError::OptionalField { symbol, field, .. }]
            if symbol == ETH && field == "open_interest"
    ));

    let log = controller.log().await;
    assert_eq!(log.sessions_closed, log.sessions_opened);
}
