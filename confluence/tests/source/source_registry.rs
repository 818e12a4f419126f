use std::sync::Arc;

use confluence::{ConfluenceError, ExchangeConnector, ExchangeDataSource, ExchangeRegistry};
use confluence_mock::MockExchange;

use crate::helpers::{MOCK, source_cfg};

#[test]
fn test_defaults_register_okx_case_insensitively() {
    let registry = ExchangeRegistry::with_defaults();
    assert!(registry.contains("okx"));
    assert!(registry.contains("OKX"));
    assert_eq!(registry.ids(), vec!["okx"]);

    let connector = registry.resolve("Okx", &source_cfg()).unwrap();
    assert_eq!(connector.name(), "okx");
}

#[test]
fn test_unknown_exchange_is_an_error() {
    let registry = ExchangeRegistry::with_defaults();
    let err = registry.resolve("kraken", &source_cfg()).unwrap_err();
    assert_eq!(err, ConfluenceError::unknown_exchange("kraken"));

    let err = ExchangeDataSource::from_registry(&ExchangeRegistry::new(), "okx", source_cfg())
        .unwrap_err();
    assert!(matches!(err, ConfluenceError::UnknownExchange { .. }));
}

#[test]
fn test_registered_factories_and_connectors() {
    let (mock, _controller) = MockExchange::new_with_controller(MOCK);
    let registry = ExchangeRegistry::with_defaults()
        .register_connector(MOCK, Arc::clone(&mock))
        .register("broken", |_cfg| Err(ConfluenceError::InvalidArg("no key".into())));
    assert_eq!(registry.ids(), vec!["broken", "mockex", "okx"]);

    let resolved: Arc<dyn ExchangeConnector> = registry.resolve("MOCKEX", &source_cfg()).unwrap();
    assert!(Arc::ptr_eq(&resolved, &mock));
    assert_eq!(
        registry.resolve("broken", &source_cfg()).unwrap_err(),
        ConfluenceError::InvalidArg("no key".into())
    );

    let source = ExchangeDataSource::from_registry(&registry, "MockEx", source_cfg()).unwrap();
    assert_eq!(confluence::MarketDataSource::exchange_id(&source), MOCK);
}
