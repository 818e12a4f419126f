//! Mock exchange for CI-safe tests and demos.
//!
//! [`MockExchange`] implements `ExchangeConnector` and hands out sessions whose every
//! call is scripted through a [`MockController`]: per-symbol (and optionally
//! per-interval) return values, failures, delays, and hangs. The controller also keeps
//! a call log so tests can assert how many sessions were opened and closed and which
//! OHLCV requests reached the exchange.

mod dynamic;
pub mod fixtures;

pub use dynamic::{CallLog, MockBehavior, MockController, MockExchange, OhlcvCall};
