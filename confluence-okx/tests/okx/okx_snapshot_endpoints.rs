use confluence_core::ExchangeSession;
use httpmock::prelude::*;
use serde_json::json;

use crate::helpers::{ok, swap_session};

#[tokio::test]
async fn ticker_returns_first_data_item() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v5/market/ticker")
                .query_param("instId", "BTC-USDT-SWAP");
            then.status(200).json_body(ok(json!([
                { "instId": "BTC-USDT-SWAP", "last": "43000.1", "ts": "1704067200000" }
            ])));
        })
        .await;

    let session = swap_session(&server).await;
    let ticker = session.fetch_ticker("BTC/USDT:USDT").await.unwrap();
    assert_eq!(ticker["last"], "43000.1");
}

#[tokio::test]
async fn funding_rate_and_open_interest_hit_public_endpoints() {
    let server = MockServer::start_async().await;
    let funding = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v5/public/funding-rate")
                .query_param("instId", "ETH-USDT-SWAP");
            then.status(200).json_body(ok(json!([
                { "instId": "ETH-USDT-SWAP", "fundingRate": "0.0001" }
            ])));
        })
        .await;
    let oi = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v5/public/open-interest")
                .query_param("instType", "SWAP")
                .query_param("instId", "ETH-USDT-SWAP");
            then.status(200).json_body(ok(json!([
                { "instId": "ETH-USDT-SWAP", "oi": "5000", "oiCcy": "50" }
            ])));
        })
        .await;

    let session = swap_session(&server).await;
    let fr = session.fetch_funding_rate("ETH/USDT:USDT").await.unwrap();
    let open = session.fetch_open_interest("ETH/USDT:USDT").await.unwrap();
    funding.assert_async().await;
    oi.assert_async().await;
    assert_eq!(fr["fundingRate"], "0.0001");
    assert_eq!(open["oi"], "5000");
}
