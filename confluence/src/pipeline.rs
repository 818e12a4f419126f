use std::sync::Arc;
use std::time::Duration;

use confluence_core::{
    CandleFeatureComputer, ConfluenceError, FeatureVector, MarketDataSource, PipelineConfig,
    PipelineResult, SnapshotFeatureComputer, TimeframeConfig, TimeframeMode, dedup_symbols,
    SNAPSHOT_LABEL,
};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::features::{EmaTrendFeatureComputer, SnapshotFeatureBuilder};
use crate::registry::ExchangeRegistry;
use crate::source::ExchangeDataSource;
use crate::trend;
use crate::util::{join_or_empty, with_task_timeout};

/// Exchange used when a request does not name one.
pub const DEFAULT_EXCHANGE_ID: &str = "okx";

fn default_exchange_id() -> String {
    DEFAULT_EXCHANGE_ID.to_string()
}

/// What to build features for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRequest {
    /// Symbols in caller notation (`BTC/USDT`, `BTC-USDT`, ...). Duplicates are dropped.
    pub symbols: Vec<String>,
    /// Exchange identifier resolved through the [`ExchangeRegistry`].
    #[serde(default = "default_exchange_id")]
    pub exchange_id: String,
}

impl PipelineRequest {
    /// Request for `symbols` on the default exchange.
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
            exchange_id: default_exchange_id(),
        }
    }

    /// Builder-style: set the exchange.
    #[must_use]
    pub fn exchange(mut self, id: impl Into<String>) -> Self {
        self.exchange_id = id.into();
        self
    }
}

/// Multi-timeframe features pipeline.
///
/// Each [`build`](Self::build) issues one task per timeframe plus one snapshot task,
/// runs them concurrently, and merges what succeeded. The timeframe table and the
/// symbol list are fixed at construction.
pub struct FeaturesPipeline {
    symbols: Vec<String>,
    source: Arc<dyn MarketDataSource>,
    candle_computer: Arc<dyn CandleFeatureComputer>,
    snapshot_computer: Arc<dyn SnapshotFeatureComputer>,
    mode: TimeframeMode,
    timeframes: Vec<TimeframeConfig>,
    task_timeout: Option<Duration>,
}

impl std::fmt::Debug for FeaturesPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeaturesPipeline")
            .field("exchange_id", &self.source.exchange_id())
            .field("symbols", &self.symbols)
            .field("mode", &self.mode)
            .field("timeframes", &self.timeframes)
            .field("task_timeout", &self.task_timeout)
            .finish_non_exhaustive()
    }
}

/// Builder for [`FeaturesPipeline`].
pub struct FeaturesPipelineBuilder {
    request: Option<PipelineRequest>,
    source: Option<Arc<dyn MarketDataSource>>,
    candle_computer: Option<Arc<dyn CandleFeatureComputer>>,
    snapshot_computer: Option<Arc<dyn SnapshotFeatureComputer>>,
    cfg: PipelineConfig,
}

impl Default for FeaturesPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FeaturesPipelineBuilder {
    /// Builder with the default configuration: multi-timeframe table, 30 s task timeout,
    /// default feature computers. A data source must be supplied.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request: None,
            source: None,
            candle_computer: None,
            snapshot_computer: None,
            cfg: PipelineConfig::default(),
        }
    }

    /// Symbols (and exchange id) to build features for.
    #[must_use]
    pub fn request(mut self, request: PipelineRequest) -> Self {
        self.request = Some(request);
        self
    }

    /// Market data source the tasks fetch from.
    #[must_use]
    pub fn data_source(mut self, source: Arc<dyn MarketDataSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Replace the candle feature computer.
    #[must_use]
    pub fn candle_computer(mut self, computer: Arc<dyn CandleFeatureComputer>) -> Self {
        self.candle_computer = Some(computer);
        self
    }

    /// Replace the snapshot feature computer.
    #[must_use]
    pub fn snapshot_computer(mut self, computer: Arc<dyn SnapshotFeatureComputer>) -> Self {
        self.snapshot_computer = Some(computer);
        self
    }

    /// Select the timeframe table.
    #[must_use]
    pub const fn mode(mut self, mode: TimeframeMode) -> Self {
        self.cfg.mode = mode;
        self
    }

    /// Caller table, used in [`TimeframeMode::Legacy`]. The multi-timeframe mode always
    /// runs the built-in table.
    #[must_use]
    pub fn timeframes(mut self, table: Vec<TimeframeConfig>) -> Self {
        self.cfg.timeframes = Some(table);
        self
    }

    /// Bound each fetch-and-compute task.
    #[must_use]
    pub const fn task_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.task_timeout = Some(timeout);
        self
    }

    /// Let tasks run unbounded.
    #[must_use]
    pub const fn no_task_timeout(mut self) -> Self {
        self.cfg.task_timeout = None;
        self
    }

    /// Replace mode, table, and timeout from a configuration. Source settings are only
    /// used by [`FeaturesPipeline::from_request`].
    #[must_use]
    pub fn config(mut self, cfg: PipelineConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Build the pipeline.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no data source has been set via [`data_source`](Self::data_source).
    pub fn build(self) -> Result<FeaturesPipeline, ConfluenceError> {
        let source = self.source.ok_or_else(|| {
            ConfluenceError::InvalidArg(
                "no data source configured; set one via data_source(...)".to_string(),
            )
        })?;
        let symbols = self
            .request
            .map(|r| dedup_symbols(r.symbols))
            .unwrap_or_default();
        Ok(FeaturesPipeline {
            symbols,
            source,
            candle_computer: self
                .candle_computer
                .unwrap_or_else(|| Arc::new(EmaTrendFeatureComputer::default())),
            snapshot_computer: self
                .snapshot_computer
                .unwrap_or_else(|| Arc::new(SnapshotFeatureBuilder::new())),
            mode: self.cfg.mode,
            timeframes: self.cfg.timeframe_table(),
            task_timeout: self.cfg.task_timeout,
        })
    }
}

type TaskFuture<'a> = BoxFuture<'a, Result<Vec<FeatureVector>, ConfluenceError>>;

impl FeaturesPipeline {
    /// Start building a pipeline.
    #[must_use]
    pub fn builder() -> FeaturesPipelineBuilder {
        FeaturesPipelineBuilder::new()
    }

    /// Default pipeline for a request: the exchange is resolved through `registry` and
    /// wrapped in an [`ExchangeDataSource`]; the default computers are used.
    ///
    /// # Errors
    /// Returns `UnknownExchange` when the request names an exchange the registry lacks.
    pub fn from_request(
        request: PipelineRequest,
        registry: &ExchangeRegistry,
        cfg: PipelineConfig,
    ) -> Result<Self, ConfluenceError> {
        let source =
            ExchangeDataSource::from_registry(registry, &request.exchange_id, cfg.source.clone())?;
        FeaturesPipelineBuilder::new()
            .request(request)
            .data_source(Arc::new(source))
            .config(cfg)
            .build()
    }

    /// Distinct symbols in first-seen order.
    #[must_use]
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Timeframe table in fetch order.
    #[must_use]
    pub fn timeframes(&self) -> &[TimeframeConfig] {
        &self.timeframes
    }

    /// Selected table mode.
    #[must_use]
    pub const fn mode(&self) -> TimeframeMode {
        self.mode
    }

    async fn timeframe_features(
        &self,
        tf: TimeframeConfig,
    ) -> Result<Vec<FeatureVector>, ConfluenceError> {
        let candles = self
            .source
            .recent_candles(&self.symbols, tf.interval(), tf.lookback())
            .await?;
        if candles.is_empty() {
            tracing::warn!(interval = %tf.interval(), "no candles; skipping feature computation");
            return Ok(Vec::new());
        }
        let features = self.candle_computer.compute_features(&candles)?;
        tracing::info!(
            interval = %tf.interval(),
            candles = candles.len(),
            features = features.len(),
            "timeframe features computed"
        );
        Ok(features)
    }

    async fn snapshot_features(&self) -> Result<Vec<FeatureVector>, ConfluenceError> {
        let snapshot = self.source.market_snapshot(&self.symbols).await?;
        let features = self
            .snapshot_computer
            .build(&snapshot, self.source.exchange_id())?;
        tracing::info!(
            symbols = snapshot.len(),
            features = features.len(),
            "snapshot features computed"
        );
        Ok(features)
    }

    /// Fetch, compute, and merge features for every timeframe plus the snapshot.
    ///
    /// Never fails: a task that errors or exceeds the task timeout contributes nothing.
    /// Candle features come first in table order, snapshot features last.
    #[tracing::instrument(
        name = "confluence::pipeline::build",
        skip_all,
        fields(
            exchange = %self.source.exchange_id(),
            symbols = self.symbols.len(),
            timeframes = self.timeframes.len(),
        )
    )]
    pub async fn build(&self) -> PipelineResult {
        let mut tasks: Vec<(String, TaskFuture<'_>)> = self
            .timeframes
            .iter()
            .map(|tf| {
                let label = tf.interval().as_str();
                let fut = with_task_timeout(label, self.task_timeout, self.timeframe_features(*tf));
                (label.to_string(), fut.boxed())
            })
            .collect();
        tasks.push((
            SNAPSHOT_LABEL.to_string(),
            with_task_timeout(SNAPSHOT_LABEL, self.task_timeout, self.snapshot_features()).boxed(),
        ));

        let mut outcomes = join_or_empty(tasks).await;
        let snapshot = outcomes.pop().unwrap_or_default();
        let mut features: Vec<FeatureVector> = outcomes.into_iter().flatten().collect();

        let trend_summary = if self.mode == TimeframeMode::MultiTimeframe && !features.is_empty() {
            let summary = trend::summarize(&features);
            tracing::info!(
                alignment = %summary.alignment,
                bullish = summary.bullish,
                bearish = summary.bearish,
                timeframes = ?summary.timeframes_analyzed,
                "multi-timeframe summary"
            );
            Some(summary)
        } else {
            None
        };

        features.extend(snapshot);
        let result = PipelineResult {
            features,
            trend_summary,
        };
        tracing::info!(
            total = result.features.len(),
            by_interval = ?result.counts_by_interval(),
            "features built"
        );
        result
    }
}
