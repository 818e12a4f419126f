//! Response shapes and the mapping between OKX-native and unified identifiers.

use confluence_core::{Interval, MarketType, OhlcvRow};
use serde::Deserialize;

use crate::error::OkxError;

/// Maximum rows `/api/v5/market/candles` returns per request.
pub const CANDLES_PAGE_LIMIT: u32 = 300;

/// Standard `{code, msg, data}` envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentRow {
    pub inst_id: String,
    #[serde(default)]
    pub settle_ccy: String,
    #[serde(default)]
    pub state: String,
}

/// `instType` query value.
pub const fn inst_type(market_type: MarketType) -> &'static str {
    match market_type {
        MarketType::Spot => "SPOT",
        _ => "SWAP",
    }
}

/// OKX `bar` parameter. Minutes stay lower case, larger units are upper case.
///
/// Bars of six hours and longer use the `utc` variants; the plain labels are aligned
/// to Hong Kong time.
pub fn bar(interval: Interval) -> Option<&'static str> {
    Some(match interval {
        Interval::M1 => "1m",
        Interval::M3 => "3m",
        Interval::M5 => "5m",
        Interval::M15 => "15m",
        Interval::M30 => "30m",
        Interval::H1 => "1H",
        Interval::H2 => "2H",
        Interval::H4 => "4H",
        Interval::H6 => "6Hutc",
        Interval::H12 => "12Hutc",
        Interval::D1 => "1Dutc",
        Interval::W1 => "1Wutc",
        _ => return None,
    })
}

/// Unified symbol for a catalogue row, or `None` for rows that are not live
/// `BASE-QUOTE[-SWAP]` instruments.
pub fn unified_symbol(row: &InstrumentRow, market_type: MarketType) -> Option<String> {
    if !row.state.is_empty() && row.state != "live" {
        return None;
    }
    let parts: Vec<&str> = row.inst_id.split('-').collect();
    match (market_type, parts.as_slice()) {
        (MarketType::Spot, [base, quote]) => Some(format!("{base}/{quote}")),
        (MarketType::Swap, [base, quote, "SWAP"]) => {
            let settle = if row.settle_ccy.is_empty() {
                *quote
            } else {
                row.settle_ccy.as_str()
            };
            Some(format!("{base}/{quote}:{settle}"))
        }
        _ => None,
    }
}

/// Native instrument id derived from a unified symbol, used when the catalogue
/// has not been loaded.
pub fn native_id(unified: &str) -> String {
    match unified.split_once(':') {
        Some((pair, _settle)) => format!("{}-SWAP", pair.replace('/', "-")),
        None => unified.replace('/', "-"),
    }
}

/// Parse one `[ts, o, h, l, c, vol, ...]` candle row. OKX sends every column as a string.
pub fn parse_candle(row: &[String]) -> Result<OhlcvRow, OkxError> {
    if row.len() < 6 {
        return Err(OkxError::Decode(format!(
            "candle row has {} columns, expected at least 6",
            row.len()
        )));
    }
    let num = |i: usize| -> Result<f64, OkxError> {
        row[i]
            .parse::<f64>()
            .map_err(|e| OkxError::Decode(format!("column {i} '{}': {e}", row[i])))
    };
    let ts = row[0]
        .parse::<i64>()
        .map_err(|e| OkxError::Decode(format!("timestamp '{}': {e}", row[0])))?;
    Ok(OhlcvRow {
        ts,
        open: num(1)?,
        high: num(2)?,
        low: num(3)?,
        close: num(4)?,
        volume: num(5)?,
    })
}
