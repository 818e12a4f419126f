//! confluence-okx
//!
//! Public connector that implements `ExchangeConnector` on top of the OKX v5 REST
//! API. Exposes the instrument catalogue, candles, tickers, funding rates, and open
//! interest for spot and perpetual swap markets.
//!
//! Every session owns its own HTTP client, built with the configured proxy and request
//! timeout, and drops it on `close`.
#![warn(missing_docs)]

mod builder;
mod error;
mod session;
mod wire;

use async_trait::async_trait;
use confluence_core::{ConfluenceError, ExchangeConnector, ExchangeSession, Interval, MarketType};
use url::Url;

pub use builder::{DEFAULT_BASE_URL, OkxOptions};
pub use error::OkxError;
use session::OkxSession;

/// Candle intervals served by `/api/v5/market/candles`. OKX has no second bars.
pub const SUPPORTED_INTERVALS: &[Interval] = &[
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

/// Public connector type. Construct with [`OkxConnector::new`] or
/// [`OkxConnector::from_source_config`].
#[derive(Debug, Clone)]
pub struct OkxConnector {
    base_url: Url,
    options: OkxOptions,
}

impl OkxConnector {
    /// Registry identifier.
    pub const NAME: &'static str = "okx";

    /// Build a connector from options.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `options.base_url` is not an absolute URL.
    pub fn new(options: OkxOptions) -> Result<Self, ConfluenceError> {
        let base_url = Url::parse(&options.base_url).map_err(|e| {
            ConfluenceError::InvalidArg(format!("invalid OKX base url '{}': {e}", options.base_url))
        })?;
        Ok(Self { base_url, options })
    }

    /// Options this connector was built with.
    #[must_use]
    pub const fn options(&self) -> &OkxOptions {
        &self.options
    }
}

#[async_trait]
impl ExchangeConnector for OkxConnector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn supported_intervals(&self) -> &'static [Interval] {
        SUPPORTED_INTERVALS
    }

    async fn open_session(
        &self,
        market_type: MarketType,
    ) -> Result<Box<dyn ExchangeSession>, ConfluenceError> {
        let client = self.options.http_client()?;
        tracing::debug!(market_type = market_type.as_str(), "opened okx session");
        Ok(Box::new(OkxSession::new(
            self.base_url.clone(),
            client,
            market_type,
        )))
    }
}
