//! Swing points and trend anchors: the ground-truth features derived from a series.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingKind {
    High,
    Low,
}

/// Which detection pass produced a swing point.
///
/// `Major` points come from the fixed wide window, `Minor` from the caller's
/// window at indices the wide pass did not already claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    Major,
    Minor,
}

impl Significance {
    /// Grading weight: major swings count double.
    pub fn weight(&self) -> f64 {
        match self {
            Significance::Major => 2.0,
            Significance::Minor => 1.0,
        }
    }
}

impl fmt::Display for Significance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Significance::Major => f.write_str("major"),
            Significance::Minor => f.write_str("minor"),
        }
    }
}

/// A local price extremum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub kind: SwingKind,
    pub time: i64,
    pub price: f64,
    /// Position in the source series.
    pub index: usize,
    pub significance: Significance,
}

/// Detected swing highs and lows, each sorted ascending by time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwingPoints {
    pub highs: Vec<SwingPoint>,
    pub lows: Vec<SwingPoint>,
}

impl SwingPoints {
    pub fn is_empty(&self) -> bool {
        self.highs.is_empty() && self.lows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.highs.len() + self.lows.len()
    }

    /// Sum of significance weights over every point.
    pub fn total_weight(&self) -> f64 {
        self.highs
            .iter()
            .chain(self.lows.iter())
            .map(|p| p.significance.weight())
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
}

impl TrendDirection {
    /// Direction implied by moving from `start_price` to `end_price`.
    /// A flat move has no direction.
    pub fn from_prices(start_price: f64, end_price: f64) -> Option<Self> {
        if end_price > start_price {
            Some(TrendDirection::Up)
        } else if end_price < start_price {
            Some(TrendDirection::Down)
        } else {
            None
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Up => f.write_str("uptrend"),
            TrendDirection::Down => f.write_str("downtrend"),
        }
    }
}

/// The leg a Fibonacci retracement is measured against.
///
/// `start` precedes `end` in time. For an uptrend `start` is a low and `end`
/// a high; a downtrend is the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendAnchor {
    pub direction: TrendDirection,
    pub start: SwingPoint,
    pub end: SwingPoint,
}

impl TrendAnchor {
    pub fn price_span(&self) -> f64 {
        (self.end.price - self.start.price).abs()
    }

    pub fn time_span(&self) -> u64 {
        self.end.time.abs_diff(self.start.time)
    }
}
