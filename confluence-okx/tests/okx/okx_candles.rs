use confluence_core::{ExchangeSession, Interval};
use httpmock::prelude::*;
use serde_json::Value;

use crate::helpers::{candle_rows, ok, swap_session};

const NEWEST: i64 = 1_704_067_200_000;

#[tokio::test]
async fn candles_are_returned_oldest_first_with_translated_bar() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v5/market/candles")
                .query_param("instId", "BTC-USDT-SWAP")
                .query_param("bar", "4H")
                .query_param("limit", "3");
            then.status(200)
                .json_body(ok(Value::Array(candle_rows(NEWEST, 3))));
        })
        .await;

    let session = swap_session(&server).await;
    let rows = session
        .fetch_ohlcv("BTC/USDT:USDT", Interval::H4, 3)
        .await
        .unwrap();
    m.assert_async().await;

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].ts, NEWEST);
    assert!(rows.windows(2).all(|w| w[0].ts < w[1].ts));
    assert!((rows[2].close - 100.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn large_limits_page_backwards_with_after_cursor() {
    let server = MockServer::start_async().await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v5/market/candles")
                .query_param("bar", "1m")
                .query_param("limit", "300");
            then.status(200)
                .json_body(ok(Value::Array(candle_rows(NEWEST, 300))));
        })
        .await;
    let oldest_first_page = NEWEST - 299 * 60_000;
    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v5/market/candles")
                .query_param("limit", "100")
                .query_param("after", oldest_first_page.to_string());
            then.status(200).json_body(ok(Value::Array(candle_rows(
                oldest_first_page - 60_000,
                100,
            ))));
        })
        .await;

    let session = swap_session(&server).await;
    let rows = session
        .fetch_ohlcv("BTC/USDT:USDT", Interval::M1, 400)
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(rows.len(), 400);
    assert_eq!(rows[399].ts, NEWEST);
    assert!(rows.windows(2).all(|w| w[0].ts < w[1].ts));
}

#[tokio::test]
async fn short_page_stops_pagination() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v5/market/candles");
            then.status(200)
                .json_body(ok(Value::Array(candle_rows(NEWEST, 12))));
        })
        .await;

    let session = swap_session(&server).await;
    let rows = session
        .fetch_ohlcv("ETH/USDT:USDT", Interval::M15, 500)
        .await
        .unwrap();
    m.assert_async().await;
    assert_eq!(rows.len(), 12);
}

#[tokio::test]
async fn daily_candles_request_utc_aligned_bars() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v5/market/candles")
                .query_param("instId", "ETH-USDT-SWAP")
                .query_param("bar", "1Dutc")
                .query_param("limit", "2");
            then.status(200)
                .json_body(ok(Value::Array(candle_rows(NEWEST, 2))));
        })
        .await;

    let session = swap_session(&server).await;
    let rows = session
        .fetch_ohlcv("ETH/USDT:USDT", Interval::D1, 2)
        .await
        .unwrap();
    m.assert_async().await;
    assert_eq!(rows.len(), 2);
}
