use confluence_core::{ExchangeConnector, ExchangeSession, MarketType};
use httpmock::prelude::*;
use serde_json::json;

use crate::helpers::{connector, ok, swap_session};

#[tokio::test]
async fn swap_catalogue_maps_native_ids_to_unified_symbols() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v5/public/instruments")
                .query_param("instType", "SWAP");
            then.status(200).json_body(ok(json!([
                { "instId": "BTC-USDT-SWAP", "settleCcy": "USDT", "state": "live" },
                { "instId": "ETH-USD-SWAP", "settleCcy": "ETH", "state": "live" },
                { "instId": "DOGE-USDT-SWAP", "settleCcy": "USDT", "state": "suspend" }
            ])));
        })
        .await;

    let mut session = swap_session(&server).await;
    let catalogue = session.load_markets().await.unwrap();
    m.assert_async().await;

    assert_eq!(catalogue.len(), 2);
    assert_eq!(catalogue.get("BTC/USDT:USDT").unwrap().native_id, "BTC-USDT-SWAP");
    assert_eq!(catalogue.get("ETH/USD:ETH").unwrap().native_id, "ETH-USD-SWAP");
    assert!(!catalogue.contains("DOGE/USDT:USDT"));
}

#[tokio::test]
async fn spot_catalogue_uses_spot_inst_type() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v5/public/instruments")
                .query_param("instType", "SPOT");
            then.status(200).json_body(ok(json!([
                { "instId": "BTC-USDT", "state": "live" }
            ])));
        })
        .await;

    let mut session = connector(&server)
        .open_session(MarketType::Spot)
        .await
        .unwrap();
    let catalogue = session.load_markets().await.unwrap();
    m.assert_async().await;
    assert!(catalogue.contains("BTC/USDT"));
}

#[tokio::test]
async fn okx_does_not_advertise_second_bars() {
    let server = MockServer::start_async().await;
    let c = connector(&server);
    assert_eq!(c.name(), "okx");
    assert!(!c.supported_intervals().contains(&confluence_core::Interval::S1));
    assert!(c.supported_intervals().contains(&confluence_core::Interval::M1));
}
