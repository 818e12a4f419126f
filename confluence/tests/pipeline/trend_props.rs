use confluence::{TrendAlignment, classify};
use proptest::prelude::*;

fn mirror(a: TrendAlignment) -> TrendAlignment {
    match a {
        TrendAlignment::StrongBullish => TrendAlignment::StrongBearish,
        TrendAlignment::StrongBearish => TrendAlignment::StrongBullish,
        TrendAlignment::Bullish => TrendAlignment::Bearish,
        TrendAlignment::Bearish => TrendAlignment::Bullish,
        _ => TrendAlignment::Neutral,
    }
}

#[test]
fn documented_examples() {
    assert_eq!(classify(10, 2).as_str(), "strong_bullish");
    assert_eq!(classify(3, 3).as_str(), "neutral");
    assert_eq!(classify(4, 3).as_str(), "bullish");
}

proptest! {
    #[test]
    fn classification_is_symmetric(bull in 0usize..1_000, bear in 0usize..1_000) {
        prop_assert_eq!(classify(bear, bull), mirror(classify(bull, bear)));
    }

    #[test]
    fn strong_iff_more_than_double(bull in 0usize..1_000, bear in 0usize..1_000) {
        let a = classify(bull, bear);
        prop_assert_eq!(a == TrendAlignment::StrongBullish, bull > 2 * bear);
        prop_assert_eq!(a == TrendAlignment::Neutral, bull == bear);
    }

    #[test]
    fn direction_follows_majority(bull in 0usize..1_000, bear in 0usize..1_000) {
        let a = classify(bull, bear);
        let bullish = matches!(a, TrendAlignment::StrongBullish | TrendAlignment::Bullish);
        prop_assert_eq!(bullish, bull > bear);
    }
}
