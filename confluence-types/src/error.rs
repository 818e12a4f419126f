use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the confluence workspace.
///
/// Besides the usual connector, argument, and not-found conditions, this carries the
/// recoverable failure kinds of the market data source (catalogue, symbol, optional
/// field) and of the pipeline's fan-out (task failure, task timeout). The source and
/// the pipeline never surface these to callers as `Err`; they end up in report warnings
/// or in logs.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfluenceError {
    /// The requested capability is not implemented by the target exchange.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// Capability label (e.g. "funding-rate").
        capability: String,
    },

    /// Issues with the returned or expected data (missing fields, bad numbers, etc.).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// An exchange client returned an error.
    #[error("{connector} failed: {msg}")]
    Connector {
        /// Connector name that failed.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A resource could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of missing resource, e.g. "ticker for BTC/USDT:USDT".
        what: String,
    },

    /// Loading the instrument catalogue failed; the whole fetch call was abandoned.
    #[error("failed to load markets on {exchange}: {msg}")]
    CatalogueLoad {
        /// Exchange identifier.
        exchange: String,
        /// Human-readable error message.
        msg: String,
    },

    /// The symbol is absent from the exchange's instrument catalogue.
    #[error("symbol {symbol} not found on {exchange}")]
    SymbolNotFound {
        /// Exchange-native symbol that was looked up.
        symbol: String,
        /// Exchange identifier.
        exchange: String,
    },

    /// Fetching a required payload for a symbol failed; the symbol was skipped.
    #[error("{capability} for {symbol} failed: {msg}")]
    Fetch {
        /// Input symbol.
        symbol: String,
        /// Capability label (e.g. "ohlcv", "ticker").
        capability: String,
        /// Human-readable error message.
        msg: String,
    },

    /// Fetching an optional snapshot field failed; only that field was omitted.
    #[error("optional field {field} for {symbol} omitted: {msg}")]
    OptionalField {
        /// Input symbol.
        symbol: String,
        /// Snapshot field name (e.g. "funding_rate").
        field: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A pipeline task exceeded its timeout.
    #[error("task timed out: {task}")]
    TaskTimeout {
        /// Task label (interval label or "snapshot").
        task: String,
    },

    /// A pipeline task failed.
    #[error("task {task} failed: {msg}")]
    Task {
        /// Task label (interval label or "snapshot").
        task: String,
        /// Human-readable error message.
        msg: String,
    },

    /// No connector factory is registered under the requested exchange id.
    #[error("unknown exchange: {id}")]
    UnknownExchange {
        /// The requested exchange identifier.
        id: String,
    },

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl ConfluenceError {
    /// Helper: build an `Unsupported` error for a capability string.
    pub fn unsupported(cap: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: cap.into(),
        }
    }

    /// Helper: build a `Connector` error with the connector name and message.
    pub fn connector(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Connector {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `CatalogueLoad` error.
    pub fn catalogue_load(exchange: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::CatalogueLoad {
            exchange: exchange.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `SymbolNotFound` error.
    pub fn symbol_not_found(symbol: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self::SymbolNotFound {
            symbol: symbol.into(),
            exchange: exchange.into(),
        }
    }

    /// Helper: build a `Fetch` error.
    pub fn fetch(
        symbol: impl Into<String>,
        capability: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Fetch {
            symbol: symbol.into(),
            capability: capability.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `OptionalField` error.
    pub fn optional_field(
        symbol: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::OptionalField {
            symbol: symbol.into(),
            field: field.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `TaskTimeout` error.
    pub fn task_timeout(task: impl Into<String>) -> Self {
        Self::TaskTimeout { task: task.into() }
    }

    /// Helper: build a `Task` error.
    pub fn task(task: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Task {
            task: task.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `UnknownExchange` error.
    pub fn unknown_exchange(id: impl Into<String>) -> Self {
        Self::UnknownExchange { id: id.into() }
    }

    /// Returns true when the error only cost a single symbol or field, not the whole call.
    #[must_use]
    pub const fn is_symbol_scoped(&self) -> bool {
        matches!(
            self,
            Self::SymbolNotFound { .. } | Self::Fetch { .. } | Self::OptionalField { .. }
        )
    }
}
