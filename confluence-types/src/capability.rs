use core::fmt;
use serde::{Deserialize, Serialize};

/// Capability labels for exchange calls, errors, and telemetry.
///
/// The first group maps one-to-one onto `ExchangeSession` methods; the second labels
/// the market data source operations built on top of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Capability {
    /// Instrument catalogue load.
    LoadMarkets,
    /// OHLCV candle rows for one symbol.
    Ohlcv,
    /// Point-in-time ticker for one symbol.
    Ticker,
    /// Current funding rate of a perpetual swap.
    FundingRate,
    /// Current open interest of a derivative.
    OpenInterest,

    /// Candles for many symbols at one interval.
    Candles,
    /// Candles for many symbols across a timeframe table.
    MultiTimeframeCandles,
    /// Market snapshot for many symbols.
    Snapshot,
}

impl Capability {
    /// Stable, kebab-case identifier for logs/errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoadMarkets => "load-markets",
            Self::Ohlcv => "ohlcv",
            Self::Ticker => "ticker",
            Self::FundingRate => "funding-rate",
            Self::OpenInterest => "open-interest",
            Self::Candles => "candles",
            Self::MultiTimeframeCandles => "candles:multi-timeframe",
            Self::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
