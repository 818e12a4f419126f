use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use confluence_core::{
    Candle, Capability, ConfluenceError, ExchangeConnector, ExchangeSession, FetchReport,
    InstrumentRef, Interval, MarketCatalogue, MarketDataSource, MarketSnapshot, SnapshotField,
    SourceConfig, SymbolSnapshot, TimeframeConfig, choose_effective_interval, normalize_symbol,
};

use crate::registry::ExchangeRegistry;

/// Market data source backed by one exchange connector.
///
/// Every fetch call opens its own session, loads the instrument catalogue once, and
/// closes the session before returning. Each exchange call is bounded by
/// [`SourceConfig::call_timeout`]; an expired call fails like any other. Failures are
/// isolated per symbol (and per optional snapshot field) and reported as warnings; none
/// of the fetch methods returns an error.
pub struct ExchangeDataSource {
    exchange_id: String,
    connector: Arc<dyn ExchangeConnector>,
    cfg: SourceConfig,
}

impl std::fmt::Debug for ExchangeDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeDataSource")
            .field("exchange_id", &self.exchange_id)
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}

impl ExchangeDataSource {
    /// Wrap `connector`; the exchange id is the connector's name.
    #[must_use]
    pub fn new(connector: Arc<dyn ExchangeConnector>, cfg: SourceConfig) -> Self {
        Self {
            exchange_id: connector.name().to_string(),
            connector,
            cfg,
        }
    }

    /// Resolve the connector for `exchange_id` once and wrap it.
    ///
    /// # Errors
    /// Returns `UnknownExchange` when the registry has no factory for `exchange_id`, or
    /// the factory's error.
    pub fn from_registry(
        registry: &ExchangeRegistry,
        exchange_id: &str,
        cfg: SourceConfig,
    ) -> Result<Self, ConfluenceError> {
        let connector = registry.resolve(exchange_id, &cfg)?;
        Ok(Self {
            exchange_id: exchange_id.to_ascii_lowercase(),
            connector,
            cfg,
        })
    }

    /// Settings this source was built with.
    #[must_use]
    pub const fn config(&self) -> &SourceConfig {
        &self.cfg
    }

    fn effective_interval(&self, requested: Interval) -> Interval {
        let effective = choose_effective_interval(self.connector.supported_intervals(), requested);
        if effective != requested {
            tracing::warn!(
                exchange = %self.exchange_id,
                requested = %requested,
                effective = %effective,
                "interval not served by exchange; falling back"
            );
        }
        effective
    }

    /// Await one exchange call under the configured call timeout.
    async fn bounded<T, F>(&self, call: &str, fut: F) -> Result<T, ConfluenceError>
    where
        F: Future<Output = Result<T, ConfluenceError>>,
    {
        match self.cfg.call_timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await.unwrap_or_else(|_| {
                Err(ConfluenceError::connector(
                    &self.exchange_id,
                    format!("{call} timed out after {limit:?}"),
                ))
            }),
            None => fut.await,
        }
    }

    /// Open a session and load its catalogue. The session is closed again when the
    /// catalogue cannot be loaded.
    async fn open(
        &self,
    ) -> Result<(Box<dyn ExchangeSession>, MarketCatalogue), ConfluenceError> {
        let mut session = self
            .bounded("open session", self.connector.open_session(self.cfg.market_type))
            .await
            .map_err(|e| ConfluenceError::catalogue_load(&self.exchange_id, e.to_string()))?;
        let loaded = self
            .bounded(Capability::LoadMarkets.as_str(), session.load_markets())
            .await;
        match loaded {
            Ok(catalogue) => {
                tracing::debug!(
                    capability = Capability::LoadMarkets.as_str(),
                    markets = catalogue.len(),
                    "catalogue loaded"
                );
                Ok((session, catalogue))
            }
            Err(e) => {
                self.close(session).await;
                Err(ConfluenceError::catalogue_load(&self.exchange_id, e.to_string()))
            }
        }
    }

    async fn close(&self, mut session: Box<dyn ExchangeSession>) {
        if let Err(e) = self.bounded("close session", session.close()).await {
            tracing::warn!(exchange = %self.exchange_id, error = %e, "failed to close session");
        }
    }

    async fn symbol_candles(
        &self,
        session: &dyn ExchangeSession,
        catalogue: &MarketCatalogue,
        symbol: &str,
        interval: Interval,
        lookback: u32,
    ) -> Result<Vec<Candle>, ConfluenceError> {
        let unified = normalize_symbol(symbol, self.cfg.market_type);
        if !catalogue.contains(&unified) {
            return Err(ConfluenceError::symbol_not_found(unified, &self.exchange_id));
        }
        let rows = self
            .bounded(
                Capability::Ohlcv.as_str(),
                session.fetch_ohlcv(&unified, interval, lookback),
            )
            .await
            .map_err(|e| ConfluenceError::fetch(symbol, Capability::Ohlcv.as_str(), e.to_string()))?;
        let instrument = InstrumentRef::new(symbol, &self.exchange_id);
        Ok(rows
            .into_iter()
            .map(|row| Candle::from_row(row, instrument.clone(), interval))
            .collect())
    }

    /// Most recent `lookback` candles at `interval` for each symbol, concatenated in
    /// input order.
    ///
    /// Candles carry the interval actually fetched, which differs from `interval` when
    /// the exchange does not serve it.
    #[tracing::instrument(
        name = "confluence::source::fetch_candles",
        skip_all,
        fields(
            exchange = %self.exchange_id,
            capability = Capability::Candles.as_str(),
            interval = %interval,
            symbols = symbols.len(),
            lookback = lookback,
        )
    )]
    pub async fn fetch_candles(
        &self,
        symbols: &[String],
        interval: Interval,
        lookback: u32,
    ) -> FetchReport<Vec<Candle>> {
        let effective = self.effective_interval(interval);
        let mut report = FetchReport::new(Vec::new());
        let (session, catalogue) = match self.open().await {
            Ok(opened) => opened,
            Err(e) => {
                tracing::error!(error = %e, "markets load failed");
                report.warn(e);
                return report;
            }
        };

        for symbol in symbols {
            match self
                .symbol_candles(session.as_ref(), &catalogue, symbol, effective, lookback)
                .await
            {
                Ok(candles) => {
                    tracing::debug!(symbol = %symbol, count = candles.len(), "fetched candles");
                    report.data.extend(candles);
                }
                Err(e) => {
                    tracing::debug!(symbol = %symbol, error = %e, "skipping symbol");
                    report.warn(e);
                }
            }
        }
        self.close(session).await;

        tracing::info!(
            total = report.data.len(),
            skipped = report.warnings.len(),
            "candles fetched"
        );
        report
    }

    /// Candles for every entry of `table`, fetched sequentially over one session.
    ///
    /// Sleeps [`SourceConfig::symbol_delay`] between successive symbols of a timeframe.
    /// The result holds one entry per table row, keyed by the requested interval, in
    /// table order.
    #[tracing::instrument(
        name = "confluence::source::fetch_multi_timeframe_candles",
        skip_all,
        fields(
            exchange = %self.exchange_id,
            capability = Capability::MultiTimeframeCandles.as_str(),
            symbols = symbols.len(),
            timeframes = table.len(),
        )
    )]
    pub async fn fetch_multi_timeframe_candles(
        &self,
        symbols: &[String],
        table: &[TimeframeConfig],
    ) -> FetchReport<Vec<(Interval, Vec<Candle>)>> {
        let mut report = FetchReport::new(
            table
                .iter()
                .map(|tf| (tf.interval(), Vec::new()))
                .collect::<Vec<_>>(),
        );
        let (session, catalogue) = match self.open().await {
            Ok(opened) => opened,
            Err(e) => {
                tracing::error!(error = %e, "markets load failed");
                report.warn(e);
                return report;
            }
        };

        for (slot, tf) in table.iter().enumerate() {
            let effective = self.effective_interval(tf.interval());
            for (i, symbol) in symbols.iter().enumerate() {
                if i > 0 && !self.cfg.symbol_delay.is_zero() {
                    tokio::time::sleep(self.cfg.symbol_delay).await;
                }
                match self
                    .symbol_candles(session.as_ref(), &catalogue, symbol, effective, tf.lookback())
                    .await
                {
                    Ok(candles) => report.data[slot].1.extend(candles),
                    Err(e) => {
                        tracing::debug!(symbol = %symbol, interval = %tf.interval(), error = %e, "skipping symbol");
                        report.warn(e);
                    }
                }
            }
            tracing::debug!(
                interval = %tf.interval(),
                count = report.data[slot].1.len(),
                "timeframe fetched"
            );
        }
        self.close(session).await;
        report
    }

    /// Ticker, funding rate, and open interest per symbol.
    ///
    /// A symbol whose ticker cannot be fetched is absent from the snapshot. Funding rate
    /// and open interest are optional: a failure omits only that field.
    #[tracing::instrument(
        name = "confluence::source::fetch_snapshot",
        skip_all,
        fields(
            exchange = %self.exchange_id,
            capability = Capability::Snapshot.as_str(),
            symbols = symbols.len(),
        )
    )]
    pub async fn fetch_snapshot(&self, symbols: &[String]) -> FetchReport<MarketSnapshot> {
        let mut report = FetchReport::new(MarketSnapshot::new());
        let (session, catalogue) = match self.open().await {
            Ok(opened) => opened,
            Err(e) => {
                tracing::error!(error = %e, "markets load failed");
                report.warn(e);
                return report;
            }
        };

        for symbol in symbols {
            let unified = normalize_symbol(symbol, self.cfg.market_type);
            if !catalogue.contains(&unified) {
                report.warn(ConfluenceError::symbol_not_found(unified, &self.exchange_id));
                continue;
            }
            let ticker = match self
                .bounded(Capability::Ticker.as_str(), session.fetch_ticker(&unified))
                .await
            {
                Ok(t) => t,
                Err(e) => {
                    tracing::debug!(symbol = %symbol, error = %e, "ticker failed; skipping symbol");
                    report.warn(ConfluenceError::fetch(
                        symbol.as_str(),
                        Capability::Ticker.as_str(),
                        e.to_string(),
                    ));
                    continue;
                }
            };
            let mut entry = SymbolSnapshot::new();
            entry.insert(SnapshotField::Price, ticker);

            match self
                .bounded(
                    Capability::FundingRate.as_str(),
                    session.fetch_funding_rate(&unified),
                )
                .await
            {
                Ok(v) => entry.insert(SnapshotField::FundingRate, v),
                Err(e) => report.warn(ConfluenceError::optional_field(
                    symbol.as_str(),
                    SnapshotField::FundingRate.as_str(),
                    e.to_string(),
                )),
            }
            match self
                .bounded(
                    Capability::OpenInterest.as_str(),
                    session.fetch_open_interest(&unified),
                )
                .await
            {
                Ok(v) => entry.insert(SnapshotField::OpenInterest, v),
                Err(e) => report.warn(ConfluenceError::optional_field(
                    symbol.as_str(),
                    SnapshotField::OpenInterest.as_str(),
                    e.to_string(),
                )),
            }
            report.data.insert(symbol.as_str(), entry);
        }
        self.close(session).await;

        tracing::info!(
            ok = report.data.len(),
            requested = symbols.len(),
            "snapshot fetched"
        );
        report
    }

    fn log_warnings(&self, what: &str, warnings: &[ConfluenceError]) {
        for w in warnings {
            tracing::warn!(exchange = %self.exchange_id, what, warning = %w, "partial fetch");
        }
    }
}

#[async_trait]
impl MarketDataSource for ExchangeDataSource {
    fn exchange_id(&self) -> &str {
        &self.exchange_id
    }

    async fn recent_candles(
        &self,
        symbols: &[String],
        interval: Interval,
        lookback: u32,
    ) -> Result<Vec<Candle>, ConfluenceError> {
        let (data, warnings) = self
            .fetch_candles(symbols, interval, lookback)
            .await
            .into_parts();
        self.log_warnings(interval.as_str(), &warnings);
        Ok(data)
    }

    async fn market_snapshot(&self, symbols: &[String]) -> Result<MarketSnapshot, ConfluenceError> {
        let (data, warnings) = self.fetch_snapshot(symbols).await.into_parts();
        self.log_warnings(Capability::Snapshot.as_str(), &warnings);
        Ok(data)
    }
}
