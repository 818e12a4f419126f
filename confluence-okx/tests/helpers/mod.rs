use confluence_core::{ExchangeConnector, ExchangeSession, MarketType, ProxySetting};
use confluence_okx::{OkxConnector, OkxOptions};
use httpmock::MockServer;
use serde_json::{Value, json};

/// Connector pointed at the mock server, bypassing any proxy from the environment.
pub fn connector(server: &MockServer) -> OkxConnector {
    OkxConnector::new(
        OkxOptions::default()
            .base_url(server.base_url())
            .proxy(ProxySetting::Disabled),
    )
    .expect("valid base url")
}

pub async fn swap_session(server: &MockServer) -> Box<dyn ExchangeSession> {
    connector(server)
        .open_session(MarketType::Swap)
        .await
        .expect("session opens")
}

/// Successful envelope.
pub fn ok(data: Value) -> Value {
    json!({ "code": "0", "msg": "", "data": data })
}

/// `n` candle rows ending at `newest_ts`, newest first, one minute apart.
pub fn candle_rows(newest_ts: i64, n: usize) -> Vec<Value> {
    (0..n as i64)
        .map(|i| {
            let ts = newest_ts - i * 60_000;
            let px = 100.0 - i as f64;
            json!([
                ts.to_string(),
                px.to_string(),
                (px + 1.0).to_string(),
                (px - 1.0).to_string(),
                (px + 0.5).to_string(),
                "10",
                "1000",
                "1000",
                "1"
            ])
        })
        .collect()
}
