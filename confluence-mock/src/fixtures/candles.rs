use confluence_core::{Interval, OhlcvRow};

/// Fixed epoch used by every fixture series: 2024-01-01T00:00:00Z.
pub const EPOCH_MS: i64 = 1_704_067_200_000;

/// `n` consecutive bars at `interval`, starting at `start_price` and moving by `step`
/// per bar. Every bar satisfies `low <= min(open, close)` and `high >= max(open, close)`.
#[must_use]
pub fn rows(n: usize, interval: Interval, start_price: f64, step: f64) -> Vec<OhlcvRow> {
    (0..n)
        .map(|i| {
            let open = start_price + step * i as f64;
            let close = open + step;
            let spread = step.abs().max(0.5);
            let ts = EPOCH_MS + interval.millis() * i as i64;
            OhlcvRow {
                ts,
                open,
                high: open.max(close) + spread,
                low: open.min(close) - spread,
                close,
                volume: 1_000.0 + 10.0 * i as f64,
            }
        })
        .collect()
}

/// Steadily rising series.
#[must_use]
pub fn rising_rows(n: usize, interval: Interval, start_price: f64) -> Vec<OhlcvRow> {
    rows(n, interval, start_price, 1.0)
}

/// Steadily falling series.
#[must_use]
pub fn falling_rows(n: usize, interval: Interval, start_price: f64) -> Vec<OhlcvRow> {
    rows(n, interval, start_price, -1.0)
}
