use chrono::{DateTime, Utc};
use confluence_core::{
    ConfluenceError, FeatureVector, InstrumentRef, MarketSnapshot, SnapshotFeatureComputer,
    SnapshotField, SymbolSnapshot,
};
use serde_json::{Value, json};

// Unified payloads use the first key of each list; raw OKX payloads the second.
const LAST_KEYS: &[&str] = &["last", "lastPx"];
const BID_KEYS: &[&str] = &["bid", "bidPx"];
const ASK_KEYS: &[&str] = &["ask", "askPx"];
const VOLUME_KEYS: &[&str] = &["baseVolume", "vol24h"];
const OPEN_KEYS: &[&str] = &["open", "open24h"];
const TS_KEYS: &[&str] = &["timestamp", "ts"];
const FUNDING_KEYS: &[&str] = &["fundingRate"];
const OPEN_INTEREST_KEYS: &[&str] = &["openInterestAmount", "oi"];

/// Numeric field by the first matching key. Exchanges send numbers either as JSON
/// numbers or as decimal strings.
fn number(payload: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| match payload.get(*k)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Default snapshot feature computer: one vector per symbol with a price.
///
/// Values: `price`, and when present `bid`, `ask`, `spread_bps`, `volume_24h`,
/// `change_pct_24h`, `funding_rate`, `open_interest`. The vector timestamp is the
/// ticker timestamp, or the build time when the ticker carries none.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotFeatureBuilder;

impl SnapshotFeatureBuilder {
    /// New builder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn symbol_features(
        symbol: &str,
        entry: &SymbolSnapshot,
        exchange_id: &str,
        now: DateTime<Utc>,
    ) -> Option<FeatureVector> {
        let ticker = entry.price()?;
        let Some(last) = number(ticker, LAST_KEYS) else {
            tracing::debug!(symbol, "ticker without last price; skipping");
            return None;
        };
        #[allow(clippy::cast_possible_truncation)]
        let ts = number(ticker, TS_KEYS).map_or_else(|| now.timestamp_millis(), |t| t as i64);

        let mut fv = FeatureVector::for_snapshot(InstrumentRef::new(symbol, exchange_id), ts)
            .with_value("price", last);
        let bid = number(ticker, BID_KEYS);
        let ask = number(ticker, ASK_KEYS);
        if let Some(b) = bid {
            fv = fv.with_value("bid", b);
        }
        if let Some(a) = ask {
            fv = fv.with_value("ask", a);
        }
        if let (Some(b), Some(a)) = (bid, ask)
            && last > 0.0
        {
            fv = fv.with_value("spread_bps", (a - b) / last * 10_000.0);
        }
        if let Some(v) = number(ticker, VOLUME_KEYS) {
            fv = fv.with_value("volume_24h", v);
        }
        if let Some(pct) = ticker.get("percentage").and_then(Value::as_f64) {
            fv = fv.with_value("change_pct_24h", pct);
        } else if let Some(open) = number(ticker, OPEN_KEYS)
            && open != 0.0
        {
            fv = fv.with_value("change_pct_24h", (last - open) / open * 100.0);
        }
        if let Some(rate) = entry
            .get(SnapshotField::FundingRate)
            .and_then(|p| number(p, FUNDING_KEYS))
        {
            fv = fv.with_value("funding_rate", rate);
        }
        if let Some(oi) = entry
            .get(SnapshotField::OpenInterest)
            .and_then(|p| number(p, OPEN_INTEREST_KEYS))
        {
            fv = fv.with_value("open_interest", oi);
        }

        let fields: Vec<&str> = entry.iter().map(|(f, _)| f.as_str()).collect();
        Some(fv.with_meta(json!({
            "exchange": exchange_id,
            "observed_at": now.to_rfc3339(),
            "fields": fields,
        })))
    }
}

impl SnapshotFeatureComputer for SnapshotFeatureBuilder {
    fn build(
        &self,
        snapshot: &MarketSnapshot,
        exchange_id: &str,
    ) -> Result<Vec<FeatureVector>, ConfluenceError> {
        let now = Utc::now();
        Ok(snapshot
            .iter()
            .filter_map(|(symbol, entry)| Self::symbol_features(symbol, entry, exchange_id, now))
            .collect())
    }
}
