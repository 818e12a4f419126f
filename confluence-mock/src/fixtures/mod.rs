//! Deterministic fixture data.

pub mod candles;
pub mod payloads;

pub use candles::{falling_rows, rising_rows, rows};
pub use payloads::{funding_rate, open_interest, ticker};
