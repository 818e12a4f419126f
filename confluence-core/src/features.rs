use crate::types::{Candle, FeatureVector, MarketSnapshot};
use confluence_types::ConfluenceError;

/// Pure transform from candles to feature vectors.
///
/// Input may mix several symbols; candles of one symbol are contiguous and oldest first.
/// Every produced vector must carry the candles' interval.
pub trait CandleFeatureComputer: Send + Sync {
    /// Compute features for the given candles.
    ///
    /// # Errors
    /// Implementations may fail on malformed input; the pipeline treats a failure as an
    /// empty result for that timeframe.
    fn compute_features(&self, candles: &[Candle]) -> Result<Vec<FeatureVector>, ConfluenceError>;
}

/// Pure transform from a market snapshot to snapshot-derived feature vectors.
pub trait SnapshotFeatureComputer: Send + Sync {
    /// Build features for every symbol in `snapshot`.
    ///
    /// # Errors
    /// Implementations may fail on malformed payloads; the pipeline treats a failure as
    /// an empty snapshot result.
    fn build(
        &self,
        snapshot: &MarketSnapshot,
        exchange_id: &str,
    ) -> Result<Vec<FeatureVector>, ConfluenceError>;
}
