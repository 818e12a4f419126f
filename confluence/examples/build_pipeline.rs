use std::sync::Arc;
use std::time::Duration;

use confluence::{
    ConfluenceError, ExchangeDataSource, ExchangeRegistry, FeaturesPipeline, Interval,
    PipelineRequest, SourceConfig,
};
use confluence_mock::{MockBehavior, MockExchange};
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,confluence=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .try_init();

    let request = PipelineRequest::new(["BTC/USDT", "ETH/USDT", "BTC/USDT", "DOGE/USDT"]);

    // Hit the live OKX API only when asked to; otherwise script a mock exchange.
    let pipeline = if std::env::var_os("CONFLUENCE_EXAMPLES_USE_OKX").is_some() {
        FeaturesPipeline::from_request(
            request,
            &ExchangeRegistry::with_defaults(),
            confluence::PipelineConfig::default(),
        )?
    } else {
        let (mock, controller) = MockExchange::new_with_controller("mockex");
        controller.seed_symbol("BTC/USDT:USDT", 300, 64_000.0).await;
        controller.seed_symbol("ETH/USDT:USDT", 300, 3_100.0).await;
        // One stalled timeframe and one flaky optional field.
        controller
            .set_interval_behavior(Interval::H4, MockBehavior::Hang)
            .await;
        controller
            .set_funding_rate_behavior(
                "ETH/USDT:USDT",
                MockBehavior::Fail(ConfluenceError::Other("maintenance".into())),
            )
            .await;
        let cfg = SourceConfig {
            call_timeout: Some(Duration::from_secs(1)),
            ..SourceConfig::default()
        };
        let source = ExchangeDataSource::new(mock, cfg);
        FeaturesPipeline::builder()
            .request(request)
            .data_source(Arc::new(source))
            .task_timeout(Duration::from_secs(5))
            .build()?
    };

    println!("symbols: {:?}", pipeline.symbols());
    let result = pipeline.build().await;

    for (label, count) in result.counts_by_interval() {
        println!("{label:>8}: {count} feature vectors");
    }
    for f in &result.features {
        println!(
            "{:>8} {:<10} trend={:<8} close/price={:?}",
            f.interval_label(),
            f.instrument.symbol,
            f.trend.map_or("-", |t| t.as_str()),
            f.value("close").or_else(|| f.value("price")),
        );
    }
    if let Some(summary) = &result.trend_summary {
        println!(
            "alignment: {} ({} bullish / {} bearish over {} timeframes)",
            summary.alignment,
            summary.bullish,
            summary.bearish,
            summary.timeframes_analyzed.len()
        );
    }
    Ok(())
}
