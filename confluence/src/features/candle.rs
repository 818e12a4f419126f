use confluence_core::{Candle, CandleFeatureComputer, ConfluenceError, FeatureVector, Trend};
use serde_json::json;

/// Exponential moving average seeded with the first observation.
///
/// `alpha = 2 / (window + 1)`; bar 0 yields the price itself.
#[derive(Debug, Clone)]
struct Ema {
    alpha: f64,
    value: Option<f64>,
}

impl Ema {
    fn new(window: usize) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let alpha = 2.0 / (window as f64 + 1.0);
        Self { alpha, value: None }
    }

    fn update(&mut self, price: f64) -> f64 {
        let next = match self.value {
            None => price,
            Some(prev) => self.alpha.mul_add(price - prev, prev),
        };
        self.value = Some(next);
        next
    }
}

/// Default candle feature computer: one vector per symbol summarising its series.
///
/// Values: `close`, `ema_fast`, `ema_slow`, `change_pct` (first open to last close),
/// `high`, `low`, `volume` (sum), and `candles` (series length). The trend label
/// compares the fast and slow EMA of closes: a relative spread above `neutral_band`
/// is bullish, below `-neutral_band` bearish, otherwise neutral.
#[derive(Debug, Clone)]
pub struct EmaTrendFeatureComputer {
    fast: usize,
    slow: usize,
    neutral_band: f64,
}

impl Default for EmaTrendFeatureComputer {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            neutral_band: 0.0005,
        }
    }
}

impl EmaTrendFeatureComputer {
    /// Computer with custom EMA windows.
    ///
    /// # Errors
    /// Returns `InvalidArg` unless `0 < fast < slow`.
    pub fn new(fast: usize, slow: usize) -> Result<Self, ConfluenceError> {
        if fast == 0 || fast >= slow {
            return Err(ConfluenceError::InvalidArg(format!(
                "ema windows must satisfy 0 < fast < slow (got {fast}, {slow})"
            )));
        }
        Ok(Self {
            fast,
            slow,
            ..Self::default()
        })
    }

    /// Set the relative EMA spread treated as neutral.
    #[must_use]
    pub const fn neutral_band(mut self, band: f64) -> Self {
        self.neutral_band = band;
        self
    }

    fn classify(&self, fast: f64, slow: f64) -> Trend {
        if slow == 0.0 {
            return Trend::Neutral;
        }
        let spread = (fast - slow) / slow.abs();
        if spread > self.neutral_band {
            Trend::Bullish
        } else if spread < -self.neutral_band {
            Trend::Bearish
        } else {
            Trend::Neutral
        }
    }

    /// Features for one symbol's series. A series with a non-finite close yields
    /// nothing.
    fn series_features(&self, series: &[Candle]) -> Option<FeatureVector> {
        let (first, last) = (series.first()?, series.last()?);
        let mut fast = Ema::new(self.fast);
        let mut slow = Ema::new(self.slow);
        let mut high = f64::MIN;
        let mut low = f64::MAX;
        let mut volume = 0.0;
        for c in series {
            if !c.close.is_finite() {
                tracing::warn!(
                    instrument = %c.instrument,
                    interval = %c.interval,
                    ts = c.ts,
                    "non-finite close; skipping series"
                );
                return None;
            }
            fast.update(c.close);
            slow.update(c.close);
            high = high.max(c.high);
            low = low.min(c.low);
            volume += c.volume;
        }
        let change_pct = if first.open == 0.0 {
            0.0
        } else {
            (last.close - first.open) / first.open * 100.0
        };
        let ema_fast = fast.value.unwrap_or(last.close);
        let ema_slow = slow.value.unwrap_or(last.close);
        #[allow(clippy::cast_precision_loss)]
        let count = series.len() as f64;

        Some(
            FeatureVector::for_interval(last.instrument.clone(), last.interval, last.ts)
                .with_value("close", last.close)
                .with_value("ema_fast", ema_fast)
                .with_value("ema_slow", ema_slow)
                .with_value("change_pct", change_pct)
                .with_value("high", high)
                .with_value("low", low)
                .with_value("volume", volume)
                .with_value("candles", count)
                .with_trend(self.classify(ema_fast, ema_slow))
                .with_meta(json!({
                    "first_ts": first.ts,
                    "ema_windows": [self.fast, self.slow],
                })),
        )
    }
}

/// Split candles into runs of the same instrument, preserving order.
fn runs(candles: &[Candle]) -> impl Iterator<Item = &[Candle]> {
    candles.chunk_by(|a, b| a.instrument == b.instrument)
}

impl CandleFeatureComputer for EmaTrendFeatureComputer {
    fn compute_features(&self, candles: &[Candle]) -> Result<Vec<FeatureVector>, ConfluenceError> {
        Ok(runs(candles)
            .filter_map(|series| self.series_features(series))
            .collect())
    }
}
