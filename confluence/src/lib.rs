//! Confluence builds multi-timeframe feature vectors from exchange market data.
//!
//! Overview
//! - Resolves an exchange connector through the [`ExchangeRegistry`] and wraps it in an
//!   [`ExchangeDataSource`], which normalizes symbols, falls back to a served interval,
//!   and isolates failures per symbol.
//! - [`FeaturesPipeline`] issues one task per timeframe plus one snapshot task, runs them
//!   concurrently, and merges whatever succeeded. `build()` never fails.
//! - Candle and snapshot features are computed by pluggable computers; the defaults are
//!   [`EmaTrendFeatureComputer`] and [`SnapshotFeatureBuilder`].
//! - In multi-timeframe mode the result carries a [`TrendSummary`] of bullish and
//!   bearish votes across timeframes.
//!
//! Key behaviors and trade-offs
//! - Partial results: a failing timeframe, a hung exchange call, or an unknown symbol
//!   shrinks the result instead of failing it. Failures are logged through `tracing`;
//!   the source's `fetch_*` methods also return them as warnings.
//! - Timeouts: the source bounds every exchange call by `SourceConfig::call_timeout` and
//!   still closes its session; the pipeline's task timeout is an outer backstop that
//!   drops the whole task.
//! - Sessions: each candle task opens its own exchange session, so a build holds up to
//!   one session per timeframe plus one for the snapshot at once.
//! - Ordering: candle features follow the timeframe table, snapshot features come last,
//!   regardless of which task finished first.
//!
//! Examples
//! ```rust,ignore
//! use confluence::{ExchangeRegistry, FeaturesPipeline, PipelineConfig, PipelineRequest};
//!
//! let request = PipelineRequest::new(["BTC/USDT", "ETH/USDT"]);
//! let pipeline = FeaturesPipeline::from_request(
//!     request,
//!     &ExchangeRegistry::with_defaults(),
//!     PipelineConfig::default(),
//! )?;
//! let result = pipeline.build().await;
//! if let Some(summary) = &result.trend_summary {
//!     println!("alignment: {}", summary.alignment);
//! }
//! ```
//!
//! See `confluence/examples/` for a runnable demonstration against the mock exchange.
#![warn(missing_docs)]

pub mod features;
mod pipeline;
mod registry;
mod source;
pub mod trend;
mod util;

pub use features::{EmaTrendFeatureComputer, SnapshotFeatureBuilder};
pub use pipeline::{
    DEFAULT_EXCHANGE_ID, FeaturesPipeline, FeaturesPipelineBuilder, PipelineRequest,
};
pub use registry::{ConnectorFactory, ExchangeRegistry};
pub use source::ExchangeDataSource;
pub use trend::{classify, summarize};
pub use util::{join_or_empty, with_task_timeout};

// Re-export core types for convenience
pub use confluence_core::{
    Candle, CandleFeatureComputer, Capability, ConfluenceError, ExchangeConnector,
    ExchangeSession, FeatureVector, FetchReport, InstrumentRef, Interval, MarketCatalogue,
    MarketDataSource, MarketInfo, MarketSnapshot, MarketType, OhlcvRow, PipelineConfig,
    PipelineResult, ProxySetting, SNAPSHOT_LABEL, SnapshotFeatureComputer, SnapshotField,
    SourceConfig, SymbolSnapshot, TimeframeConfig, TimeframeMode, Trend, TrendAlignment,
    TrendSummary,
};
