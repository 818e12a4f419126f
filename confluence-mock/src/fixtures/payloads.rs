use serde_json::{Value, json};

/// Ticker payload shaped like a unified exchange ticker.
#[must_use]
pub fn ticker(symbol: &str, last: f64) -> Value {
    json!({
        "symbol": symbol,
        "last": last,
        "bid": last - 0.5,
        "ask": last + 0.5,
        "baseVolume": 12_345.0,
        "percentage": 1.25,
    })
}

/// Funding-rate payload.
#[must_use]
pub fn funding_rate(symbol: &str, rate: f64) -> Value {
    json!({
        "symbol": symbol,
        "fundingRate": rate,
        "nextFundingRate": rate,
    })
}

/// Open-interest payload.
#[must_use]
pub fn open_interest(symbol: &str, contracts: f64) -> Value {
    json!({
        "symbol": symbol,
        "openInterestAmount": contracts,
    })
}
