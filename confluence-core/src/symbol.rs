use std::collections::HashSet;

use confluence_types::MarketType;

/// Translate a caller symbol into unified exchange notation for `market_type`.
///
/// Dashes become slashes (`BTC-USDT` → `BTC/USDT`). For swaps a two-part pair gains the
/// settle suffix (`BTC/USDT` → `BTC/USDT:USDT`); input already containing `:` and
/// anything that is not exactly `BASE/QUOTE` is returned as is.
#[must_use]
pub fn normalize_symbol(symbol: &str, market_type: MarketType) -> String {
    let base = symbol.replace('-', "/");
    if market_type != MarketType::Swap || base.contains(':') {
        return base;
    }
    let mut parts = base.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(b), Some(q), None) if !b.is_empty() && !q.is_empty() => format!("{b}/{q}:{q}"),
        _ => base,
    }
}

/// Drop repeated symbols, keeping the first occurrence and the original order.
pub fn dedup_symbols<I, S>(symbols: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for s in symbols {
        let s = s.as_ref();
        if seen.insert(s.to_string()) {
            out.push(s.to_string());
        }
    }
    out
}
