#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use confluence::{
    Candle, CandleFeatureComputer, ConfluenceError, ExchangeConnector, ExchangeDataSource,
    FeatureVector, InstrumentRef, Interval, MarketDataSource, MarketSnapshot, SnapshotField,
    SourceConfig, SymbolSnapshot,
};
use confluence_mock::fixtures::{falling_rows, rising_rows, ticker};
use confluence_mock::{MockController, MockExchange};

pub const BTC: &str = "BTC/USDT";
pub const ETH: &str = "ETH/USDT";
pub const BTC_SWAP: &str = "BTC/USDT:USDT";
pub const ETH_SWAP: &str = "ETH/USDT:USDT";
pub const MOCK: &str = "mockex";

/// Swap settings without the inter-symbol pause.
pub fn source_cfg() -> SourceConfig {
    SourceConfig {
        symbol_delay: Duration::ZERO,
        ..SourceConfig::default()
    }
}

/// Mock exchange with `BTC` and `ETH` swaps seeded with 300 rising bars each.
pub async fn seeded_mock() -> (Arc<dyn ExchangeConnector>, MockController) {
    let (mock, controller) = MockExchange::new_with_controller(MOCK);
    controller.seed_symbol(BTC_SWAP, 300, 400.0).await;
    controller.seed_symbol(ETH_SWAP, 300, 350.0).await;
    (mock, controller)
}

/// Seeded mock wrapped in a data source.
pub async fn seeded_source() -> (ExchangeDataSource, MockController) {
    let (mock, controller) = seeded_mock().await;
    (ExchangeDataSource::new(mock, source_cfg()), controller)
}

pub fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

pub fn candles(symbol: &str, interval: Interval, n: usize, rising: bool) -> Vec<Candle> {
    let rows = if rising {
        rising_rows(n, interval, 100.0)
    } else {
        falling_rows(n, interval, 400.0)
    };
    let inst = InstrumentRef::new(symbol, MOCK);
    rows.into_iter()
        .map(|r| Candle::from_row(r, inst.clone(), interval))
        .collect()
}

/// Snapshot with a ticker for every symbol.
pub fn snapshot_of(symbols: &[&str]) -> MarketSnapshot {
    let mut snap = MarketSnapshot::new();
    for (i, s) in symbols.iter().enumerate() {
        let mut entry = SymbolSnapshot::new();
        #[allow(clippy::cast_precision_loss)]
        entry.insert(SnapshotField::Price, ticker(s, 100.0 + i as f64));
        snap.insert(*s, entry);
    }
    snap
}

/// How a [`ScriptedSource`] answers one call.
#[derive(Clone)]
pub enum Script<T> {
    Ok(T),
    Delay(Duration, T),
    Fail(ConfluenceError),
    Hang,
}

impl<T> Script<T> {
    async fn run(self) -> Result<T, ConfluenceError> {
        match self {
            Self::Ok(v) => Ok(v),
            Self::Delay(d, v) => {
                tokio::time::sleep(d).await;
                Ok(v)
            }
            Self::Fail(e) => Err(e),
            Self::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

/// `MarketDataSource` with per-interval scripted outcomes. Unscripted intervals return
/// rising candles for every requested symbol.
pub struct ScriptedSource {
    candles: HashMap<Interval, Script<Vec<Candle>>>,
    snapshot: Script<MarketSnapshot>,
    pub candle_calls: AtomicUsize,
    pub snapshot_calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            candles: HashMap::new(),
            snapshot: Script::Ok(snapshot_of(&[BTC, ETH])),
            candle_calls: AtomicUsize::new(0),
            snapshot_calls: AtomicUsize::new(0),
        }
    }

    pub fn interval(mut self, interval: Interval, script: Script<Vec<Candle>>) -> Self {
        self.candles.insert(interval, script);
        self
    }

    pub fn snapshot(mut self, script: Script<MarketSnapshot>) -> Self {
        self.snapshot = script;
        self
    }

    pub fn calls(&self) -> usize {
        self.candle_calls.load(Ordering::SeqCst) + self.snapshot_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataSource for ScriptedSource {
    fn exchange_id(&self) -> &str {
        MOCK
    }

    async fn recent_candles(
        &self,
        symbols: &[String],
        interval: Interval,
        lookback: u32,
    ) -> Result<Vec<Candle>, ConfluenceError> {
        self.candle_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.candles.get(&interval).cloned().unwrap_or_else(|| {
            let n = usize::try_from(lookback).unwrap().min(50);
            Script::Ok(
                symbols
                    .iter()
                    .flat_map(|s| candles(s, interval, n, true))
                    .collect(),
            )
        });
        script.run().await
    }

    async fn market_snapshot(&self, _symbols: &[String]) -> Result<MarketSnapshot, ConfluenceError> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        self.snapshot.clone().run().await
    }
}

/// Candle computer that counts invocations and emits one bullish vector per symbol run.
#[derive(Default)]
pub struct CountingComputer {
    pub calls: AtomicUsize,
}

impl CandleFeatureComputer for CountingComputer {
    fn compute_features(&self, candles: &[Candle]) -> Result<Vec<FeatureVector>, ConfluenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(candles
            .chunk_by(|a, b| a.instrument == b.instrument)
            .filter_map(|run| run.last())
            .map(|c| {
                FeatureVector::for_interval(c.instrument.clone(), c.interval, c.ts)
                    .with_value("close", c.close)
                    .with_trend(confluence::Trend::Bullish)
            })
            .collect())
    }
}

pub fn labels(features: &[FeatureVector]) -> Vec<&'static str> {
    features.iter().map(FeatureVector::interval_label).collect()
}
