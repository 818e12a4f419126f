use confluence_core::{ConfluenceError, ExchangeSession, Interval};
use httpmock::prelude::*;
use serde_json::json;

use crate::helpers::{ok, swap_session};

#[tokio::test]
async fn non_zero_code_maps_to_connector_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v5/market/candles");
            then.status(200)
                .json_body(json!({ "code": "50011", "msg": "Too Many Requests", "data": [] }));
        })
        .await;

    let session = swap_session(&server).await;
    let err = session
        .fetch_ohlcv("BTC/USDT:USDT", Interval::H1, 10)
        .await
        .unwrap_err();
    match err {
        ConfluenceError::Connector { connector, msg } => {
            assert_eq!(connector, "okx");
            assert!(msg.contains("50011"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unknown_instrument_code_maps_to_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v5/market/ticker");
            then.status(400).json_body(json!({
                "code": "51001",
                "msg": "Instrument ID does not exist",
                "data": []
            }));
        })
        .await;

    let session = swap_session(&server).await;
    let err = session.fetch_ticker("NOPE/USDT:USDT").await.unwrap_err();
    assert!(matches!(err, ConfluenceError::NotFound { .. }));
}

#[tokio::test]
async fn empty_ticker_data_maps_to_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v5/market/ticker");
            then.status(200).json_body(ok(json!([])));
        })
        .await;

    let session = swap_session(&server).await;
    let err = session.fetch_ticker("BTC/USDT:USDT").await.unwrap_err();
    assert_eq!(err, ConfluenceError::not_found("ticker for BTC/USDT:USDT"));
}

#[tokio::test]
async fn non_json_error_status_maps_to_connector_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v5/market/ticker");
            then.status(502).body("bad gateway");
        })
        .await;

    let session = swap_session(&server).await;
    let err = session.fetch_ticker("BTC/USDT:USDT").await.unwrap_err();
    assert!(matches!(err, ConfluenceError::Connector { .. }));
}

#[tokio::test]
async fn calls_after_close_fail_without_network() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v5/market/ticker");
            then.status(200).json_body(ok(json!([{ "last": "1" }])));
        })
        .await;

    let mut session = swap_session(&server).await;
    session.close().await.unwrap();
    session.close().await.unwrap();
    let err = session.fetch_ticker("BTC/USDT:USDT").await.unwrap_err();
    assert_eq!(err, ConfluenceError::connector("okx", "session closed"));
}

#[tokio::test]
async fn second_bars_are_rejected_before_any_request() {
    let server = MockServer::start_async().await;
    let session = swap_session(&server).await;
    let err = session
        .fetch_ohlcv("BTC/USDT:USDT", Interval::S1, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, ConfluenceError::InvalidArg(_)));
}
