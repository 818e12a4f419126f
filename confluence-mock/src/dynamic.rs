use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use confluence_core::{
    ConfluenceError, ExchangeConnector, ExchangeSession, Interval, MarketCatalogue, MarketInfo,
    MarketType, OhlcvRow,
};

use crate::fixtures;

/// Instruction for how a method should behave for a given input.
#[derive(Clone, Debug)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Sleep, then return the provided value.
    Delay(Duration, T),
    /// Fail immediately with the provided error.
    Fail(ConfluenceError),
    /// Hang indefinitely (simulate a stalled network call).
    Hang,
}

impl<T> MockBehavior<T> {
    async fn resolve(self) -> Result<T, ConfluenceError> {
        match self {
            Self::Return(v) => Ok(v),
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

/// One OHLCV request that reached the mock exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OhlcvCall {
    /// Unified symbol requested.
    pub symbol: String,
    /// Interval requested.
    pub interval: Interval,
    /// Row limit requested.
    pub limit: u32,
}

/// Counters and request log kept by the mock exchange.
#[derive(Clone, Debug, Default)]
pub struct CallLog {
    /// Sessions successfully opened.
    pub sessions_opened: usize,
    /// Sessions closed.
    pub sessions_closed: usize,
    /// Highest number of sessions open at the same time.
    pub max_open_sessions: usize,
    /// Market types sessions were opened against, in order.
    pub market_types: Vec<MarketType>,
    /// `load_markets` calls.
    pub catalogue_loads: usize,
    /// OHLCV requests in arrival order.
    pub ohlcv_calls: Vec<OhlcvCall>,
    /// Ticker requests in arrival order.
    pub ticker_calls: Vec<String>,
}

#[derive(Default)]
struct InternalState {
    listed: Vec<String>,
    open_session_rule: Option<MockBehavior<()>>,
    catalogue_rule: Option<MockBehavior<()>>,
    ohlcv_rules: HashMap<String, MockBehavior<Vec<OhlcvRow>>>,
    ohlcv_interval_rules: HashMap<Interval, MockBehavior<Vec<OhlcvRow>>>,
    ohlcv_pair_rules: HashMap<(String, Interval), MockBehavior<Vec<OhlcvRow>>>,
    ticker_rules: HashMap<String, MockBehavior<Value>>,
    funding_rules: HashMap<String, MockBehavior<Value>>,
    open_interest_rules: HashMap<String, MockBehavior<Value>>,
    open_sessions: usize,
    log: CallLog,
}

/// Controller handle used by tests to drive the mock exchange from the outside.
///
/// Symbols are unified symbols as the data source sends them (e.g. `BTC/USDT:USDT`
/// for swaps).
#[derive(Clone)]
pub struct MockController {
    state: Arc<Mutex<InternalState>>,
}

impl MockController {
    /// List `symbol` in the catalogue returned by `load_markets`.
    pub async fn list_symbol(&self, symbol: &str) {
        let mut guard = self.state.lock().await;
        if !guard.listed.iter().any(|s| s == symbol) {
            guard.listed.push(symbol.to_string());
        }
    }

    /// List `symbol` and script it with `n` rising candles at every interval, a ticker,
    /// a funding rate, and open interest.
    pub async fn seed_symbol(&self, symbol: &str, n: usize, last_price: f64) {
        self.list_symbol(symbol).await;
        #[allow(clippy::cast_precision_loss)]
        let start = last_price - n as f64;
        let mut guard = self.state.lock().await;
        guard.ohlcv_rules.insert(
            symbol.to_string(),
            MockBehavior::Return(fixtures::rising_rows(n, Interval::M1, start)),
        );
        guard.ticker_rules.insert(
            symbol.to_string(),
            MockBehavior::Return(fixtures::ticker(symbol, last_price)),
        );
        guard.funding_rules.insert(
            symbol.to_string(),
            MockBehavior::Return(fixtures::funding_rate(symbol, 0.0001)),
        );
        guard.open_interest_rules.insert(
            symbol.to_string(),
            MockBehavior::Return(fixtures::open_interest(symbol, 42_000.0)),
        );
    }

    /// Set the behavior of `open_session`.
    pub async fn set_open_session_behavior(&self, behavior: MockBehavior<()>) {
        self.state.lock().await.open_session_rule = Some(behavior);
    }

    /// Set the behavior of `load_markets`. The default lists every symbol registered via
    /// [`list_symbol`](Self::list_symbol) or [`seed_symbol`](Self::seed_symbol).
    pub async fn set_catalogue_behavior(&self, behavior: MockBehavior<()>) {
        self.state.lock().await.catalogue_rule = Some(behavior);
    }

    /// Set the behavior of `fetch_ohlcv` for a symbol at every interval.
    pub async fn set_ohlcv_behavior(&self, symbol: &str, behavior: MockBehavior<Vec<OhlcvRow>>) {
        let mut guard = self.state.lock().await;
        guard.ohlcv_rules.insert(symbol.to_string(), behavior);
    }

    /// Set the behavior of `fetch_ohlcv` for every symbol at one interval.
    ///
    /// Takes precedence over per-symbol rules.
    pub async fn set_interval_behavior(
        &self,
        interval: Interval,
        behavior: MockBehavior<Vec<OhlcvRow>>,
    ) {
        let mut guard = self.state.lock().await;
        guard.ohlcv_interval_rules.insert(interval, behavior);
    }

    /// Set the behavior of `fetch_ohlcv` for one symbol at one interval.
    ///
    /// Takes precedence over interval-wide and per-symbol rules.
    pub async fn set_pair_behavior(
        &self,
        symbol: &str,
        interval: Interval,
        behavior: MockBehavior<Vec<OhlcvRow>>,
    ) {
        let mut guard = self.state.lock().await;
        guard
            .ohlcv_pair_rules
            .insert((symbol.to_string(), interval), behavior);
    }

    /// Set the behavior of `fetch_ticker` for a symbol.
    pub async fn set_ticker_behavior(&self, symbol: &str, behavior: MockBehavior<Value>) {
        let mut guard = self.state.lock().await;
        guard.ticker_rules.insert(symbol.to_string(), behavior);
    }

    /// Set the behavior of `fetch_funding_rate` for a symbol.
    pub async fn set_funding_rate_behavior(&self, symbol: &str, behavior: MockBehavior<Value>) {
        let mut guard = self.state.lock().await;
        guard.funding_rules.insert(symbol.to_string(), behavior);
    }

    /// Set the behavior of `fetch_open_interest` for a symbol.
    pub async fn set_open_interest_behavior(&self, symbol: &str, behavior: MockBehavior<Value>) {
        let mut guard = self.state.lock().await;
        guard.open_interest_rules.insert(symbol.to_string(), behavior);
    }

    /// Copy of the call log.
    pub async fn log(&self) -> CallLog {
        self.state.lock().await.log.clone()
    }

    /// Distinct symbols that received OHLCV requests, in first-request order.
    pub async fn ohlcv_symbols(&self) -> Vec<String> {
        let guard = self.state.lock().await;
        let mut seen = HashSet::new();
        guard
            .log
            .ohlcv_calls
            .iter()
            .filter(|c| seen.insert(c.symbol.clone()))
            .map(|c| c.symbol.clone())
            .collect()
    }

    /// Clear all scripted behaviors, listed symbols, and the call log.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        *guard = InternalState::default();
    }
}

/// Exchange connector that defers all behavior to a [`MockController`].
pub struct MockExchange {
    name: &'static str,
    intervals: &'static [Interval],
    state: Arc<Mutex<InternalState>>,
}

/// Intervals served by default: everything except second bars.
const DEFAULT_INTERVALS: &[Interval] = &[
    Interval::M1,
    Interval::M3,
    Interval::M5,
    Interval::M15,
    Interval::M30,
    Interval::H1,
    Interval::H2,
    Interval::H4,
    Interval::H6,
    Interval::H12,
    Interval::D1,
    Interval::W1,
];

impl MockExchange {
    /// Create a mock exchange serving every interval except `1s`, and its controller.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Arc<dyn ExchangeConnector>, MockController) {
        Self::with_intervals(name, DEFAULT_INTERVALS)
    }

    /// Create a mock exchange serving exactly `intervals`, and its controller.
    #[must_use]
    pub fn with_intervals(
        name: &'static str,
        intervals: &'static [Interval],
    ) -> (Arc<dyn ExchangeConnector>, MockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = MockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self {
            name,
            intervals,
            state,
        });
        (me as Arc<dyn ExchangeConnector>, controller)
    }
}

#[async_trait]
impl ExchangeConnector for MockExchange {
    fn name(&self) -> &'static str {
        self.name
    }

    fn supported_intervals(&self) -> &'static [Interval] {
        self.intervals
    }

    async fn open_session(
        &self,
        market_type: MarketType,
    ) -> Result<Box<dyn ExchangeSession>, ConfluenceError> {
        let rule = self.state.lock().await.open_session_rule.clone();
        if let Some(rule) = rule {
            rule.resolve().await?;
        }
        {
            let mut guard = self.state.lock().await;
            guard.open_sessions += 1;
            guard.log.sessions_opened += 1;
            guard.log.max_open_sessions = guard.log.max_open_sessions.max(guard.open_sessions);
            guard.log.market_types.push(market_type);
        }
        Ok(Box::new(MockSession {
            name: self.name,
            market_type,
            state: Arc::clone(&self.state),
            closed: false,
        }))
    }
}

struct MockSession {
    name: &'static str,
    market_type: MarketType,
    state: Arc<Mutex<InternalState>>,
    closed: bool,
}

impl MockSession {
    fn ensure_open(&self) -> Result<(), ConfluenceError> {
        if self.closed {
            return Err(ConfluenceError::connector(self.name, "session closed"));
        }
        Ok(())
    }

    async fn value_call(
        &self,
        symbol: &str,
        what: &str,
        pick: fn(&InternalState) -> &HashMap<String, MockBehavior<Value>>,
    ) -> Result<Value, ConfluenceError> {
        self.ensure_open()?;
        // Acquire behavior snapshot without holding the lock across await points
        let behavior = {
            let guard = self.state.lock().await;
            pick(&guard).get(symbol).cloned()
        };
        match behavior {
            Some(b) => b.resolve().await,
            None => Err(ConfluenceError::not_found(format!("{what} for {symbol}"))),
        }
    }
}

#[async_trait]
impl ExchangeSession for MockSession {
    async fn load_markets(&mut self) -> Result<MarketCatalogue, ConfluenceError> {
        self.ensure_open()?;
        let (rule, listed) = {
            let mut guard = self.state.lock().await;
            guard.log.catalogue_loads += 1;
            (guard.catalogue_rule.clone(), guard.listed.clone())
        };
        if let Some(rule) = rule {
            rule.resolve().await?;
        }
        let market_type = self.market_type;
        Ok(listed
            .into_iter()
            .map(|s| {
                let native_id = s.replace(['/', ':'], "-");
                (s, MarketInfo {
                    native_id,
                    market_type,
                })
            })
            .collect())
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        interval: Interval,
        limit: u32,
    ) -> Result<Vec<OhlcvRow>, ConfluenceError> {
        self.ensure_open()?;
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.log.ohlcv_calls.push(OhlcvCall {
                symbol: symbol.to_string(),
                interval,
                limit,
            });
            guard
                .ohlcv_pair_rules
                .get(&(symbol.to_string(), interval))
                .or_else(|| guard.ohlcv_interval_rules.get(&interval))
                .or_else(|| guard.ohlcv_rules.get(symbol))
                .cloned()
        };
        let Some(behavior) = behavior else {
            return Err(ConfluenceError::not_found(format!("ohlcv for {symbol}")));
        };
        let mut rows = behavior.resolve().await?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        if rows.len() > limit {
            rows.drain(..rows.len() - limit);
        }
        Ok(rows)
    }

    async fn fetch_ticker(&self, symbol: &str) -> Result<Value, ConfluenceError> {
        self.state
            .lock()
            .await
            .log
            .ticker_calls
            .push(symbol.to_string());
        self.value_call(symbol, "ticker", |s| &s.ticker_rules).await
    }

    async fn fetch_funding_rate(&self, symbol: &str) -> Result<Value, ConfluenceError> {
        self.value_call(symbol, "funding rate", |s| &s.funding_rules)
            .await
    }

    async fn fetch_open_interest(&self, symbol: &str) -> Result<Value, ConfluenceError> {
        self.value_call(symbol, "open interest", |s| &s.open_interest_rules)
            .await
    }

    async fn close(&mut self) -> Result<(), ConfluenceError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let mut guard = self.state.lock().await;
        guard.open_sessions = guard.open_sessions.saturating_sub(1);
        guard.log.sessions_closed += 1;
        Ok(())
    }
}
