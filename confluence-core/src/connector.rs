use async_trait::async_trait;
use serde_json::Value;

use crate::types::{Candle, MarketCatalogue, MarketSnapshot, OhlcvRow};
use confluence_types::{Capability, ConfluenceError, Interval, MarketType};

/// A live connection to one exchange, scoped to a single fetch call.
///
/// Sessions are opened by [`ExchangeConnector::open_session`], used sequentially, and
/// must be released with [`close`](ExchangeSession::close) on every exit path. Symbols
/// passed to the fetch methods are unified symbols as listed in the catalogue.
#[async_trait]
pub trait ExchangeSession: Send + Sync {
    /// Load the instrument catalogue. Fetch methods may rely on it having been loaded.
    async fn load_markets(&mut self) -> Result<MarketCatalogue, ConfluenceError>;

    /// Fetch up to `limit` most recent OHLCV rows, oldest first.
    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        interval: Interval,
        limit: u32,
    ) -> Result<Vec<OhlcvRow>, ConfluenceError>;

    /// Fetch the current ticker payload.
    async fn fetch_ticker(&self, symbol: &str) -> Result<Value, ConfluenceError>;

    /// Fetch the current funding-rate payload.
    async fn fetch_funding_rate(&self, _symbol: &str) -> Result<Value, ConfluenceError> {
        Err(ConfluenceError::unsupported(Capability::FundingRate.as_str()))
    }

    /// Fetch the current open-interest payload.
    async fn fetch_open_interest(&self, _symbol: &str) -> Result<Value, ConfluenceError> {
        Err(ConfluenceError::unsupported(Capability::OpenInterest.as_str()))
    }

    /// Release the session's resources. Further calls may fail.
    async fn close(&mut self) -> Result<(), ConfluenceError>;
}

/// Factory for [`ExchangeSession`]s plus static facts about the exchange.
#[async_trait]
pub trait ExchangeConnector: Send + Sync {
    /// Exchange identifier (e.g. `okx`).
    fn name(&self) -> &'static str;

    /// REQUIRED: candle intervals the exchange serves natively, finest first.
    fn supported_intervals(&self) -> &'static [Interval];

    /// Open a fresh session against `market_type`.
    async fn open_session(
        &self,
        market_type: MarketType,
    ) -> Result<Box<dyn ExchangeSession>, ConfluenceError>;
}

impl std::fmt::Debug for dyn ExchangeConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeConnector").field("name", &self.name()).finish()
    }
}

/// Source of candles and snapshots consumed by the features pipeline.
///
/// Implementations are expected to absorb per-symbol failures themselves; an `Err`
/// means the whole call produced nothing usable.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Exchange identifier the data comes from.
    fn exchange_id(&self) -> &str;

    /// Most recent `lookback` candles at `interval` for every symbol that could be fetched.
    async fn recent_candles(
        &self,
        symbols: &[String],
        interval: Interval,
        lookback: u32,
    ) -> Result<Vec<Candle>, ConfluenceError>;

    /// Snapshot for every symbol whose ticker could be fetched.
    async fn market_snapshot(&self, symbols: &[String]) -> Result<MarketSnapshot, ConfluenceError>;
}
