//! Report envelopes produced by the market data source.

use serde::{Deserialize, Serialize};

use crate::error::ConfluenceError;

/// Outcome of a best-effort fetch.
///
/// `data` holds whatever succeeded; `warnings` lists every symbol, field, or catalogue
/// failure that was absorbed on the way. An empty `warnings` vector means every
/// requested item was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FetchReport<T> {
    /// Successfully fetched payload.
    pub data: T,
    /// Non-fatal issues encountered while fetching.
    pub warnings: Vec<ConfluenceError>,
}

impl<T> FetchReport<T> {
    /// Report with no warnings.
    pub const fn new(data: T) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    /// Record a non-fatal issue.
    pub fn warn(&mut self, e: ConfluenceError) {
        self.warnings.push(e);
    }

    /// True when nothing was absorbed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Transform the payload, keeping the warnings.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FetchReport<U> {
        FetchReport {
            data: f(self.data),
            warnings: self.warnings,
        }
    }

    /// Split into payload and warnings.
    pub fn into_parts(self) -> (T, Vec<ConfluenceError>) {
        (self.data, self.warnings)
    }
}
