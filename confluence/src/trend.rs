//! Cross-timeframe trend alignment.

use confluence_core::{FeatureVector, Interval, Trend, TrendAlignment, TrendSummary};

/// Classify bullish and bearish vote counts.
///
/// More than twice the opposing count is "strong"; a plain majority is directional;
/// a tie (including zero votes) is neutral.
#[must_use]
pub const fn classify(bullish: usize, bearish: usize) -> TrendAlignment {
    if bullish > bearish.saturating_mul(2) {
        TrendAlignment::StrongBullish
    } else if bearish > bullish.saturating_mul(2) {
        TrendAlignment::StrongBearish
    } else if bullish > bearish {
        TrendAlignment::Bullish
    } else if bearish > bullish {
        TrendAlignment::Bearish
    } else {
        TrendAlignment::Neutral
    }
}

/// Tally trend labels across candle-derived vectors. Snapshot vectors are ignored.
#[must_use]
pub fn summarize(features: &[FeatureVector]) -> TrendSummary {
    let mut timeframes_analyzed: Vec<Interval> = Vec::new();
    let (mut bullish, mut bearish) = (0usize, 0usize);
    for f in features {
        let Some(interval) = f.interval else { continue };
        if !timeframes_analyzed.contains(&interval) {
            timeframes_analyzed.push(interval);
        }
        match f.trend {
            Some(Trend::Bullish) => bullish += 1,
            Some(Trend::Bearish) => bearish += 1,
            _ => {}
        }
    }
    TrendSummary {
        timeframes_analyzed,
        bullish,
        bearish,
        alignment: classify(bullish, bearish),
    }
}
