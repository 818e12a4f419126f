use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use confluence_core::{ConfluenceError, ExchangeConnector, SourceConfig};
use confluence_okx::OkxConnector;

/// Builds a connector for one exchange from the data source settings.
pub type ConnectorFactory =
    Arc<dyn Fn(&SourceConfig) -> Result<Arc<dyn ExchangeConnector>, ConfluenceError> + Send + Sync>;

/// Maps exchange identifiers to connector factories.
///
/// Identifiers are matched case-insensitively (`OKX` and `okx` resolve alike).
#[derive(Clone, Default)]
pub struct ExchangeRegistry {
    factories: HashMap<String, ConnectorFactory>,
}

impl fmt::Debug for ExchangeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeRegistry")
            .field("exchanges", &self.ids())
            .finish()
    }
}

impl ExchangeRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every bundled connector (`okx`).
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new().register(OkxConnector::NAME, |cfg: &SourceConfig| {
            let c: Arc<dyn ExchangeConnector> = Arc::new(OkxConnector::from_source_config(cfg)?);
            Ok(c)
        })
    }

    /// Add or replace the factory for `id`.
    #[must_use]
    pub fn register<F>(mut self, id: &str, factory: F) -> Self
    where
        F: Fn(&SourceConfig) -> Result<Arc<dyn ExchangeConnector>, ConfluenceError>
            + Send
            + Sync
            + 'static,
    {
        self.factories
            .insert(id.to_ascii_lowercase(), Arc::new(factory));
        self
    }

    /// Register an already-built connector under `id`; every resolve returns it.
    #[must_use]
    pub fn register_connector(self, id: &str, connector: Arc<dyn ExchangeConnector>) -> Self {
        self.register(id, move |_cfg: &SourceConfig| Ok(Arc::clone(&connector)))
    }

    /// Build the connector registered under `id`.
    ///
    /// # Errors
    /// Returns `UnknownExchange` when nothing is registered under `id`, or whatever the
    /// factory returns.
    pub fn resolve(
        &self,
        id: &str,
        cfg: &SourceConfig,
    ) -> Result<Arc<dyn ExchangeConnector>, ConfluenceError> {
        let factory = self
            .factories
            .get(&id.to_ascii_lowercase())
            .ok_or_else(|| ConfluenceError::unknown_exchange(id))?;
        factory(cfg)
    }

    /// True when `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(&id.to_ascii_lowercase())
    }

    /// Registered identifiers, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
