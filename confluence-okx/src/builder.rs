use std::time::Duration;

use confluence_core::{ProxySetting, SourceConfig};

use crate::OkxConnector;
use crate::error::OkxError;

/// Production REST origin.
pub const DEFAULT_BASE_URL: &str = "https://www.okx.com";

/// Settings used to build each session's HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OkxOptions {
    /// REST origin; endpoint paths are joined onto it.
    pub base_url: String,
    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,
    /// Outbound proxy.
    pub proxy: ProxySetting,
}

impl Default for OkxOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(60),
            proxy: ProxySetting::default(),
        }
    }
}

impl OkxOptions {
    /// Options derived from the data source configuration.
    #[must_use]
    pub fn from_source_config(cfg: &SourceConfig) -> Self {
        Self {
            request_timeout: cfg.request_timeout,
            proxy: cfg.proxy.clone(),
            ..Self::default()
        }
    }

    /// Point the connector at another origin (e.g. a local mock server).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the outbound proxy.
    #[must_use]
    pub fn proxy(mut self, proxy: ProxySetting) -> Self {
        self.proxy = proxy;
        self
    }

    /// Build a fresh HTTP client with the configured proxy and timeout.
    pub(crate) fn http_client(&self) -> Result<reqwest::Client, OkxError> {
        let mut builder = reqwest::Client::builder().timeout(self.request_timeout);
        builder = match self.proxy.resolve() {
            Some(url) => {
                tracing::debug!(proxy = %url, "okx client using proxy");
                builder.proxy(reqwest::Proxy::all(url.as_str())?)
            }
            None => builder.no_proxy(),
        };
        Ok(builder.build()?)
    }
}

impl OkxConnector {
    /// Connector with the default origin, a 60 s timeout, and environment proxies.
    ///
    /// # Errors
    /// Never fails with the default base URL; the `Result` mirrors [`OkxConnector::new`].
    pub fn new_default() -> Result<Self, confluence_core::ConfluenceError> {
        Self::new(OkxOptions::default())
    }

    /// Connector configured from the data source settings.
    ///
    /// # Errors
    /// Never fails with the default base URL; the `Result` mirrors [`OkxConnector::new`].
    pub fn from_source_config(
        cfg: &SourceConfig,
    ) -> Result<Self, confluence_core::ConfluenceError> {
        Self::new(OkxOptions::from_source_config(cfg))
    }
}
