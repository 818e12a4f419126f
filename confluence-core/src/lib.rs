//! confluence-core
//!
//! Core types, traits, and utilities shared across the confluence workspace.
//!
//! - `types`: candles, snapshots, feature vectors, and the instrument catalogue.
//! - `connector`: the `ExchangeConnector`/`ExchangeSession` pair every exchange
//!   integration implements, and the `MarketDataSource` seam the pipeline consumes.
//! - `features`: contracts for the candle and snapshot feature computers.
//! - `symbol` and `interval`: normalization and fallback policies applied before
//!   talking to an exchange.
//!
//! Async runtime
//! -------------
//! Traits are declared with `async_trait` and carry `Send` futures so that
//! implementations can be driven from a multi-threaded Tokio runtime.
#![warn(missing_docs)]

/// Exchange connector/session traits and the market data source seam.
pub mod connector;
/// Feature computer contracts.
pub mod features;
/// Interval fallback policy.
pub mod interval;
/// Symbol normalization and de-duplication.
pub mod symbol;
pub mod types;

pub use connector::{ExchangeConnector, ExchangeSession, MarketDataSource};
pub use features::{CandleFeatureComputer, SnapshotFeatureComputer};
pub use interval::choose_effective_interval;
pub use symbol::{dedup_symbols, normalize_symbol};
pub use types::*;
