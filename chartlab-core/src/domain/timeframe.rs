//! Chart timeframes and the per-timeframe constants the graders scale by.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown timeframe '{0}' (expected one of 1h, 4h, 1d, 1w, 1m)")]
pub struct TimeframeError(pub String);

/// Chart timeframe. `1m` is one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "1w")]
    Week1,
    #[serde(rename = "1m")]
    Month1,
}

impl Timeframe {
    pub fn all() -> &'static [Timeframe] {
        &[
            Timeframe::Hour1,
            Timeframe::Hour4,
            Timeframe::Day1,
            Timeframe::Week1,
            Timeframe::Month1,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Hour1 => "1h",
            Timeframe::Hour4 => "4h",
            Timeframe::Day1 => "1d",
            Timeframe::Week1 => "1w",
            Timeframe::Month1 => "1m",
        }
    }

    /// Nominal candle interval in seconds. A month is 30 days.
    pub fn interval_secs(&self) -> i64 {
        match self {
            Timeframe::Hour1 => 3_600,
            Timeframe::Hour4 => 4 * 3_600,
            Timeframe::Day1 => 86_400,
            Timeframe::Week1 => 7 * 86_400,
            Timeframe::Month1 => 30 * 86_400,
        }
    }

    /// Scales the swing significance threshold: higher timeframes demand
    /// proportionally larger swings.
    pub fn significance_multiplier(&self) -> f64 {
        match self {
            Timeframe::Hour1 => 0.6,
            Timeframe::Hour4 => 1.0,
            Timeframe::Day1 => 1.5,
            Timeframe::Week1 => 2.0,
            Timeframe::Month1 => 3.0,
        }
    }

    /// Fraction of the visible price range accepted as Fibonacci anchor price error.
    pub fn fib_price_tolerance_pct(&self) -> f64 {
        match self {
            Timeframe::Hour1 => 0.01,
            Timeframe::Hour4 => 0.02,
            Timeframe::Day1 => 0.03,
            Timeframe::Week1 => 0.04,
            Timeframe::Month1 => 0.05,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::all()
            .iter()
            .copied()
            .find(|tf| tf.label() == s.trim())
            .ok_or_else(|| TimeframeError(s.to_string()))
    }
}
