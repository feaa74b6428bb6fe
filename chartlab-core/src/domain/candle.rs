//! Candles and the validated series built from them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLC candle for a single chart interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Interval open time, Unix seconds.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
        }
    }

    /// Returns true if every price field is a finite number.
    pub fn is_finite(&self) -> bool {
        self.open.is_finite() && self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }
}

/// Reasons a candle sequence is rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("candle {index}: time {time} does not follow previous time {previous} (times must be strictly ascending)")]
    NotAscending { index: usize, previous: i64, time: i64 },

    #[error("candle {index}: non-finite price")]
    NonFinite { index: usize },

    #[error("candle {index}: high {high} is below low {low}")]
    HighBelowLow { index: usize, high: f64, low: f64 },
}

/// Validated, time-ordered candle sequence.
///
/// Construction enforces strictly ascending, unique `time` values, finite
/// prices and `high >= low`. Once built the series is immutable; every
/// detector and scorer borrows it read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Candle>", into = "Vec<Candle>")]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(candles: Vec<Candle>) -> Result<Self, SeriesError> {
        for (index, candle) in candles.iter().enumerate() {
            if !candle.is_finite() {
                return Err(SeriesError::NonFinite { index });
            }
            if candle.high < candle.low {
                return Err(SeriesError::HighBelowLow {
                    index,
                    high: candle.high,
                    low: candle.low,
                });
            }
            if index > 0 {
                let previous = candles[index - 1].time;
                if candle.time <= previous {
                    return Err(SeriesError::NotAscending {
                        index,
                        previous,
                        time: candle.time,
                    });
                }
            }
        }
        Ok(Self { candles })
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn highest_high(&self) -> Option<f64> {
        self.candles.iter().map(|c| c.high).reduce(f64::max)
    }

    pub fn lowest_low(&self) -> Option<f64> {
        self.candles.iter().map(|c| c.low).reduce(f64::min)
    }

    /// `max(high) - min(low)` over the whole series.
    ///
    /// Falls back to 1.0 for an empty or perfectly flat series so callers can
    /// divide by it unconditionally.
    pub fn price_range(&self) -> f64 {
        match (self.highest_high(), self.lowest_low()) {
            (Some(high), Some(low)) if high - low > 0.0 => high - low,
            _ => 1.0,
        }
    }
}

impl TryFrom<Vec<Candle>> for CandleSeries {
    type Error = SeriesError;

    fn try_from(candles: Vec<Candle>) -> Result<Self, Self::Error> {
        Self::new(candles)
    }
}

impl From<CandleSeries> for Vec<Candle> {
    fn from(series: CandleSeries) -> Self {
        series.candles
    }
}
