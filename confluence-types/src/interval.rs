use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfluenceError;

/// Candle duration.
///
/// Variants are declared from finest to coarsest so the derived `Ord` follows duration.
/// Serialized as the exchange-agnostic label (`"1m"`, `"4h"`, `"1d"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Interval {
    /// One second.
    #[serde(rename = "1s")]
    S1,
    /// One minute.
    #[serde(rename = "1m")]
    M1,
    /// Three minutes.
    #[serde(rename = "3m")]
    M3,
    /// Five minutes.
    #[serde(rename = "5m")]
    M5,
    /// Fifteen minutes.
    #[serde(rename = "15m")]
    M15,
    /// Thirty minutes.
    #[serde(rename = "30m")]
    M30,
    /// One hour.
    #[serde(rename = "1h")]
    H1,
    /// Two hours.
    #[serde(rename = "2h")]
    H2,
    /// Four hours.
    #[serde(rename = "4h")]
    H4,
    /// Six hours.
    #[serde(rename = "6h")]
    H6,
    /// Twelve hours.
    #[serde(rename = "12h")]
    H12,
    /// One day.
    #[serde(rename = "1d")]
    D1,
    /// One week.
    #[serde(rename = "1w")]
    W1,
}

impl Interval {
    /// Every interval, finest first.
    pub const ALL: &'static [Self] = &[
        Self::S1,
        Self::M1,
        Self::M3,
        Self::M5,
        Self::M15,
        Self::M30,
        Self::H1,
        Self::H2,
        Self::H4,
        Self::H6,
        Self::H12,
        Self::D1,
        Self::W1,
    ];

    /// Canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::S1 => "1s",
            Self::M1 => "1m",
            Self::M3 => "3m",
            Self::M5 => "5m",
            Self::M15 => "15m",
            Self::M30 => "30m",
            Self::H1 => "1h",
            Self::H2 => "2h",
            Self::H4 => "4h",
            Self::H6 => "6h",
            Self::H12 => "12h",
            Self::D1 => "1d",
            Self::W1 => "1w",
        }
    }

    /// Duration of one candle in seconds.
    #[must_use]
    pub const fn seconds(self) -> u64 {
        match self {
            Self::S1 => 1,
            Self::M1 => 60,
            Self::M3 => 3 * 60,
            Self::M5 => 5 * 60,
            Self::M15 => 15 * 60,
            Self::M30 => 30 * 60,
            Self::H1 => 3_600,
            Self::H2 => 2 * 3_600,
            Self::H4 => 4 * 3_600,
            Self::H6 => 6 * 3_600,
            Self::H12 => 12 * 3_600,
            Self::D1 => 86_400,
            Self::W1 => 7 * 86_400,
        }
    }

    /// Duration of one candle in milliseconds.
    #[must_use]
    pub const fn millis(self) -> i64 {
        // seconds() tops out at one week, well inside i64.
        self.seconds() as i64 * 1_000
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ConfluenceError;

    /// Parses canonical labels. Hour, day, and week units are also accepted in upper case
    /// (`"1H"`, `"1D"`), as some exchanges spell them; `"1M"` is rejected because it
    /// means one month elsewhere.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let normalized = match trimmed.char_indices().last() {
            Some((i, unit @ ('H' | 'D' | 'W'))) => {
                format!("{}{}", &trimmed[..i], unit.to_ascii_lowercase())
            }
            _ => trimmed.to_string(),
        };
        Self::ALL
            .iter()
            .copied()
            .find(|iv| iv.as_str() == normalized)
            .ok_or_else(|| ConfluenceError::InvalidArg(format!("unknown interval '{s}'")))
    }
}

impl TryFrom<&str> for Interval {
    type Error = ConfluenceError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}
