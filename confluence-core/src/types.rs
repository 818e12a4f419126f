//! Domain types exchanged between connectors, the data source, and the pipeline.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use confluence_types::{
    Capability, ConfluenceError, FetchReport, Interval, LOCAL_PROXY_FALLBACK, MarketType,
    PipelineConfig, ProxySetting, SourceConfig, TimeframeConfig, TimeframeMode,
};

/// Identifies a tradable instrument on one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstrumentRef {
    /// Canonical, exchange-agnostic symbol as requested by the caller (e.g. `BTC/USDT`).
    pub symbol: String,
    /// Exchange identifier (e.g. `okx`).
    pub exchange_id: String,
}

impl InstrumentRef {
    /// Build a reference from a symbol and exchange id.
    pub fn new(symbol: impl Into<String>, exchange_id: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            exchange_id: exchange_id.into(),
        }
    }
}

impl fmt::Display for InstrumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.exchange_id)
    }
}

/// Raw exchange row: `(timestamp_ms, open, high, low, close, volume)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcvRow {
    /// Bar open time in epoch milliseconds.
    pub ts: i64,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Base volume.
    pub volume: f64,
}

/// One OHLCV bar for an instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time in epoch milliseconds.
    pub ts: i64,
    /// Instrument the bar belongs to.
    pub instrument: InstrumentRef,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Base volume.
    pub volume: f64,
    /// Interval the bar was fetched at.
    pub interval: Interval,
}

impl Candle {
    /// Build a candle from a raw exchange row.
    #[must_use]
    pub fn from_row(row: OhlcvRow, instrument: InstrumentRef, interval: Interval) -> Self {
        Self {
            ts: row.ts,
            instrument,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
            interval,
        }
    }
}

/// Named field of a per-symbol snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SnapshotField {
    /// Ticker payload. Required: a symbol without it is absent from the snapshot.
    Price,
    /// Funding-rate payload. Optional.
    FundingRate,
    /// Open-interest payload. Optional.
    OpenInterest,
}

impl SnapshotField {
    /// Stable snake_case identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::FundingRate => "funding_rate",
            Self::OpenInterest => "open_interest",
        }
    }
}

impl fmt::Display for SnapshotField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot payloads for one symbol. Payloads are opaque exchange JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolSnapshot(BTreeMap<SnapshotField, Value>);

impl SymbolSnapshot {
    /// Empty snapshot.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Set a field, replacing any previous payload.
    pub fn insert(&mut self, field: SnapshotField, payload: Value) {
        self.0.insert(field, payload);
    }

    /// Payload for `field`, if present.
    #[must_use]
    pub fn get(&self, field: SnapshotField) -> Option<&Value> {
        self.0.get(&field)
    }

    /// True when `field` is present.
    #[must_use]
    pub fn contains(&self, field: SnapshotField) -> bool {
        self.0.contains_key(&field)
    }

    /// Ticker payload.
    #[must_use]
    pub fn price(&self) -> Option<&Value> {
        self.get(SnapshotField::Price)
    }

    /// Iterate fields in `SnapshotField` order.
    pub fn iter(&self) -> impl Iterator<Item = (SnapshotField, &Value)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    /// Number of fields present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Instantaneous market state keyed by the caller's symbol, in insertion order.
///
/// Partial by design: symbols whose ticker could not be fetched are absent, and present
/// symbols may lack optional fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketSnapshot(Vec<(String, SymbolSnapshot)>);

impl MarketSnapshot {
    /// Empty snapshot.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert the entry for `symbol`. An existing entry is replaced in place and keeps
    /// its position.
    pub fn insert(&mut self, symbol: impl Into<String>, entry: SymbolSnapshot) {
        let symbol = symbol.into();
        match self.0.iter_mut().find(|(s, _)| *s == symbol) {
            Some((_, slot)) => *slot = entry,
            None => self.0.push((symbol, entry)),
        }
    }

    /// Entry for `symbol`, if present.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&SymbolSnapshot> {
        self.0.iter().find(|(s, _)| s == symbol).map(|(_, e)| e)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SymbolSnapshot)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Symbols present, in insertion order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    /// Number of symbols present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no symbol is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Directional label a feature computer may attach to a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Upward bias.
    Bullish,
    /// Downward bias.
    Bearish,
    /// No clear bias.
    Neutral,
}

impl Trend {
    /// Stable snake_case identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
        }
    }
}

/// Label used for snapshot-derived vectors wherever an interval label is expected.
pub const SNAPSHOT_LABEL: &str = "snapshot";

/// Per-symbol, per-interval feature payload.
///
/// The pipeline only looks at `interval` (for grouping and ordering) and `trend` (for
/// the alignment summary); everything else is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Instrument the features describe.
    pub instrument: InstrumentRef,
    /// Source interval; `None` marks a snapshot-derived vector.
    pub interval: Option<Interval>,
    /// Reference time in epoch milliseconds.
    pub ts: i64,
    /// Named numeric features.
    pub values: BTreeMap<String, f64>,
    /// Optional directional label.
    pub trend: Option<Trend>,
    /// Free-form metadata.
    #[serde(default)]
    pub meta: Value,
}

impl FeatureVector {
    /// Empty candle-derived vector.
    #[must_use]
    pub const fn for_interval(instrument: InstrumentRef, interval: Interval, ts: i64) -> Self {
        Self {
            instrument,
            interval: Some(interval),
            ts,
            values: BTreeMap::new(),
            trend: None,
            meta: Value::Null,
        }
    }

    /// Empty snapshot-derived vector.
    #[must_use]
    pub const fn for_snapshot(instrument: InstrumentRef, ts: i64) -> Self {
        Self {
            instrument,
            interval: None,
            ts,
            values: BTreeMap::new(),
            trend: None,
            meta: Value::Null,
        }
    }

    /// Builder-style: set a numeric feature.
    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Builder-style: set the trend label.
    #[must_use]
    pub const fn with_trend(mut self, trend: Trend) -> Self {
        self.trend = Some(trend);
        self
    }

    /// Builder-style: set the metadata payload.
    #[must_use]
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = meta;
        self
    }

    /// True for snapshot-derived vectors.
    #[must_use]
    pub const fn is_snapshot(&self) -> bool {
        self.interval.is_none()
    }

    /// Interval label, or [`SNAPSHOT_LABEL`] for snapshot-derived vectors.
    #[must_use]
    pub fn interval_label(&self) -> &'static str {
        self.interval.map_or(SNAPSHOT_LABEL, Interval::as_str)
    }

    /// Numeric feature by name.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

/// Catalogue entry for one tradable market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketInfo {
    /// Exchange-native instrument id (e.g. `BTC-USDT-SWAP`).
    pub native_id: String,
    /// Market the instrument trades on.
    pub market_type: MarketType,
}

/// Instrument catalogue keyed by unified symbol (e.g. `BTC/USDT:USDT`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarketCatalogue {
    markets: HashMap<String, MarketInfo>,
}

impl MarketCatalogue {
    /// Empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a market under its unified symbol.
    pub fn insert(&mut self, unified: impl Into<String>, info: MarketInfo) {
        self.markets.insert(unified.into(), info);
    }

    /// True when `unified` is listed.
    #[must_use]
    pub fn contains(&self, unified: &str) -> bool {
        self.markets.contains_key(unified)
    }

    /// Catalogue entry for `unified`.
    #[must_use]
    pub fn get(&self, unified: &str) -> Option<&MarketInfo> {
        self.markets.get(unified)
    }

    /// Number of listed markets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markets.len()
    }

    /// True when nothing is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, MarketInfo)> for MarketCatalogue {
    fn from_iter<I: IntoIterator<Item = (S, MarketInfo)>>(iter: I) -> Self {
        Self {
            markets: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Final output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Candle-derived vectors in timeframe-table order, then snapshot-derived vectors.
    pub features: Vec<FeatureVector>,
    /// Cross-timeframe trend summary, when computed.
    pub trend_summary: Option<TrendSummary>,
}

impl PipelineResult {
    /// Number of vectors per interval label, in first-seen order.
    #[must_use]
    pub fn counts_by_interval(&self) -> Vec<(&'static str, usize)> {
        let mut out: Vec<(&'static str, usize)> = Vec::new();
        for f in &self.features {
            let label = f.interval_label();
            match out.iter_mut().find(|(l, _)| *l == label) {
                Some((_, n)) => *n += 1,
                None => out.push((label, 1)),
            }
        }
        out
    }
}

/// Overall direction across timeframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendAlignment {
    /// Bullish votes exceed twice the bearish votes.
    StrongBullish,
    /// Bearish votes exceed twice the bullish votes.
    StrongBearish,
    /// More bullish than bearish votes.
    Bullish,
    /// More bearish than bullish votes.
    Bearish,
    /// Tie.
    Neutral,
}

impl TrendAlignment {
    /// Stable snake_case identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StrongBullish => "strong_bullish",
            Self::StrongBearish => "strong_bearish",
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for TrendAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic summary of trend votes across candle-derived features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSummary {
    /// Intervals that contributed at least one vector, in first-seen order.
    pub timeframes_analyzed: Vec<Interval>,
    /// Number of bullish vectors across all intervals.
    pub bullish: usize,
    /// Number of bearish vectors across all intervals.
    pub bearish: usize,
    /// Classification of the tallies.
    pub alignment: TrendAlignment,
}
