//! Configuration types shared by the data source, connectors, and the pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ConfluenceError, Interval};

/// Local proxy address used by deployments that tunnel exchange traffic through a
/// desktop proxy client.
pub const LOCAL_PROXY_FALLBACK: &str = "http://127.0.0.1:7890";

/// Environment variables consulted by [`ProxySetting::FromEnv`], in priority order.
const PROXY_ENV_VARS: [&str; 4] = ["HTTPS_PROXY", "HTTP_PROXY", "https_proxy", "http_proxy"];

/// Market an exchange session is opened against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum MarketType {
    /// Spot pairs, e.g. `BTC/USDT`.
    Spot,
    /// Perpetual swaps, e.g. `BTC/USDT:USDT`.
    #[default]
    Swap,
}

impl MarketType {
    /// Stable lowercase identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spot => "spot",
            Self::Swap => "swap",
        }
    }
}

/// One row of the timeframe table: which interval to fetch and how many candles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeframeConfig")]
pub struct TimeframeConfig {
    interval: Interval,
    lookback: u32,
}

#[derive(Deserialize)]
struct RawTimeframeConfig {
    interval: Interval,
    lookback: u32,
}

impl TryFrom<RawTimeframeConfig> for TimeframeConfig {
    type Error = ConfluenceError;

    fn try_from(raw: RawTimeframeConfig) -> Result<Self, Self::Error> {
        Self::new(raw.interval, raw.lookback)
    }
}

impl TimeframeConfig {
    /// Multi-horizon table: entry timing, short, medium, main, and long-term trend.
    pub const MULTI_TIMEFRAME: [Self; 5] = [
        Self::unchecked(Interval::M1, 120),
        Self::unchecked(Interval::M15, 96),
        Self::unchecked(Interval::H1, 168),
        Self::unchecked(Interval::H4, 180),
        Self::unchecked(Interval::D1, 90),
    ];

    /// Two-entry legacy table.
    pub const LEGACY: [Self; 2] = [
        Self::unchecked(Interval::S1, 60 * 3),
        Self::unchecked(Interval::M1, 60 * 4),
    ];

    /// Create a validated timeframe entry.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `lookback` is zero.
    pub fn new(interval: Interval, lookback: u32) -> Result<Self, ConfluenceError> {
        if lookback == 0 {
            return Err(ConfluenceError::InvalidArg(format!(
                "lookback for {interval} must be positive"
            )));
        }
        Ok(Self { interval, lookback })
    }

    // Callers guarantee `lookback > 0`.
    const fn unchecked(interval: Interval, lookback: u32) -> Self {
        Self { interval, lookback }
    }

    /// Candle interval.
    #[must_use]
    pub const fn interval(&self) -> Interval {
        self.interval
    }

    /// Number of most recent candles to request.
    #[must_use]
    pub const fn lookback(&self) -> u32 {
        self.lookback
    }
}

/// Which timeframe table the pipeline runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum TimeframeMode {
    /// The built-in five-horizon table, plus the trend-alignment summary.
    #[default]
    MultiTimeframe,
    /// A caller-supplied table, or [`TimeframeConfig::LEGACY`] when none is given.
    Legacy,
}

/// Outbound proxy selection for exchange HTTP clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ProxySetting {
    /// Connect directly.
    Disabled,
    /// Read `HTTPS_PROXY`/`HTTP_PROXY` (either case); use `fallback` when none is set.
    FromEnv {
        /// Proxy URL used when no environment variable is set.
        fallback: Option<String>,
    },
    /// Always use this proxy URL.
    Url(String),
}

impl Default for ProxySetting {
    fn default() -> Self {
        Self::FromEnv { fallback: None }
    }
}

impl ProxySetting {
    /// Environment lookup that falls back to [`LOCAL_PROXY_FALLBACK`].
    #[must_use]
    pub fn from_env_or_local() -> Self {
        Self::FromEnv {
            fallback: Some(LOCAL_PROXY_FALLBACK.to_string()),
        }
    }

    /// Resolve the proxy URL against the process environment.
    #[must_use]
    pub fn resolve(&self) -> Option<String> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve the proxy URL using `lookup` in place of the process environment.
    ///
    /// Empty variables are treated as unset.
    pub fn resolve_with<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            Self::Disabled => None,
            Self::Url(url) => Some(url.clone()),
            Self::FromEnv { fallback } => PROXY_ENV_VARS
                .iter()
                .filter_map(|key| lookup(key))
                .find(|v| !v.trim().is_empty())
                .or_else(|| fallback.clone()),
        }
    }
}

/// Configuration for the exchange-backed market data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Market sessions are opened against; drives symbol normalization.
    pub market_type: MarketType,
    /// Pause between per-symbol fetches in the sequential multi-timeframe fetch.
    pub symbol_delay: Duration,
    /// Timeout applied by connectors to each HTTP request.
    pub request_timeout: Duration,
    /// Upper bound on each exchange call made by the source (catalogue load, candle
    /// fetch, ticker and optional fields). An expired call counts as a failed call, so
    /// the session is still closed. `None` disables the bound.
    pub call_timeout: Option<Duration>,
    /// Outbound proxy for exchange traffic.
    pub proxy: ProxySetting,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            market_type: MarketType::Swap,
            symbol_delay: Duration::from_millis(100),
            request_timeout: Duration::from_secs(60),
            call_timeout: Some(Duration::from_secs(10)),
            proxy: ProxySetting::default(),
        }
    }
}

/// Global configuration for the features pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Timeframe table selection.
    pub mode: TimeframeMode,
    /// Caller-supplied table; only consulted in [`TimeframeMode::Legacy`].
    pub timeframes: Option<Vec<TimeframeConfig>>,
    /// Upper bound on each fetch-and-compute task. `None` disables the bound.
    pub task_timeout: Option<Duration>,
    /// Data source settings used when the pipeline builds its own source.
    pub source: SourceConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: TimeframeMode::MultiTimeframe,
            timeframes: None,
            task_timeout: Some(Duration::from_secs(30)),
            source: SourceConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// The timeframe table the pipeline will run, in fetch order.
    #[must_use]
    pub fn timeframe_table(&self) -> Vec<TimeframeConfig> {
        match self.mode {
            TimeframeMode::MultiTimeframe => TimeframeConfig::MULTI_TIMEFRAME.to_vec(),
            TimeframeMode::Legacy => self
                .timeframes
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| TimeframeConfig::LEGACY.to_vec()),
        }
    }
}
