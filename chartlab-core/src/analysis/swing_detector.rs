//! Swing point detection: strict local extrema with significance filtering.
//!
//! A candle at index `i` is a swing high when its high is strictly greater
//! than the high of every candle within `lookback` positions on both sides;
//! ties disqualify. Swing lows mirror this on the low with strict less-than.
//!
//! Detection runs at two resolutions: a fixed wide window tagged `Major`,
//! then the caller's window tagged `Minor` at indices the wide pass did not
//! already claim. Each surviving point must also clear a significance filter
//! scaled by the chart timeframe.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Candle, CandleSeries, Significance, SwingKind, SwingPoint, SwingPoints, Timeframe};

/// Window used by the major pass.
pub const MAJOR_LOOKBACK: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingDetector {
    lookback: usize,
    significance_threshold: f64,
    include_minor: bool,
}

impl SwingDetector {
    pub fn new(lookback: usize, significance_threshold: f64) -> Self {
        assert!(lookback >= 1, "swing lookback must be >= 1");
        Self {
            lookback,
            significance_threshold,
            include_minor: true,
        }
    }

    /// Skip the minor pass and report only major swings.
    pub fn with_minor(mut self, include_minor: bool) -> Self {
        self.include_minor = include_minor;
        self
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    pub fn significance_threshold(&self) -> f64 {
        self.significance_threshold
    }

    /// Minimum bars needed before any swing point can be reported.
    pub fn min_series_len(&self) -> usize {
        2 * self.lookback + 1
    }

    pub fn detect(&self, series: &CandleSeries, timeframe: Timeframe) -> SwingPoints {
        let n = series.len();
        if n < self.min_series_len() {
            debug!(
                candles = n,
                required = self.min_series_len(),
                "series too short for swing detection"
            );
            return SwingPoints::default();
        }

        let pass = Pass {
            candles: series.candles(),
            price_range: series.price_range(),
            min_amplitude: self.significance_threshold * timeframe.significance_multiplier(),
        };

        let mut points = SwingPoints::default();
        pass.scan(MAJOR_LOOKBACK, Significance::Major, &mut points);
        if self.include_minor {
            pass.scan(self.lookback, Significance::Minor, &mut points);
        }

        points.highs.sort_by_key(|p| p.time);
        points.lows.sort_by_key(|p| p.time);

        debug!(
            candles = n,
            %timeframe,
            highs = points.highs.len(),
            lows = points.lows.len(),
            "swing detection complete"
        );
        points
    }
}

/// Convenience wrapper: detect with the given window and threshold, both passes enabled.
pub fn detect_swing_points(
    series: &CandleSeries,
    lookback: usize,
    significance_threshold: f64,
    timeframe: Timeframe,
) -> SwingPoints {
    SwingDetector::new(lookback, significance_threshold).detect(series, timeframe)
}

// ─── Single-resolution pass ──────────────────────────────────────────

struct Pass<'a> {
    candles: &'a [Candle],
    price_range: f64,
    min_amplitude: f64,
}

impl Pass<'_> {
    fn scan(&self, lookback: usize, significance: Significance, points: &mut SwingPoints) {
        let n = self.candles.len();
        if n < 2 * lookback + 1 {
            return;
        }

        let claimed_highs: HashSet<usize> = points.highs.iter().map(|p| p.index).collect();
        let claimed_lows: HashSet<usize> = points.lows.iter().map(|p| p.index).collect();

        for i in lookback..n - lookback {
            if !claimed_highs.contains(&i) && self.is_swing_high(i, lookback) {
                if let Some(point) = self.qualify(i, lookback, SwingKind::High, significance) {
                    points.highs.push(point);
                }
            }
            if !claimed_lows.contains(&i) && self.is_swing_low(i, lookback) {
                if let Some(point) = self.qualify(i, lookback, SwingKind::Low, significance) {
                    points.lows.push(point);
                }
            }
        }
    }

    fn is_swing_high(&self, i: usize, lookback: usize) -> bool {
        let high = self.candles[i].high;
        (1..=lookback).all(|j| high > self.candles[i - j].high && high > self.candles[i + j].high)
    }

    fn is_swing_low(&self, i: usize, lookback: usize) -> bool {
        let low = self.candles[i].low;
        (1..=lookback).all(|j| low < self.candles[i - j].low && low < self.candles[i + j].low)
    }

    /// Applies the significance filter and builds the point if it passes.
    fn qualify(
        &self,
        i: usize,
        lookback: usize,
        kind: SwingKind,
        significance: Significance,
    ) -> Option<SwingPoint> {
        let window = &self.candles[i - lookback..=i + lookback];
        let candle = &self.candles[i];
        let (price, amplitude) = match kind {
            SwingKind::High => {
                let opposite = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
                (candle.high, candle.high - opposite)
            }
            SwingKind::Low => {
                let opposite = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
                (candle.low, opposite - candle.low)
            }
        };

        if amplitude / self.price_range < self.min_amplitude {
            return None;
        }

        Some(SwingPoint {
            kind,
            time: candle.time,
            price,
            index: i,
            significance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One candle per hour with a one-unit body around each mid price.
    fn series_from_mids(mids: &[f64]) -> CandleSeries {
        let candles = mids
            .iter()
            .enumerate()
            .map(|(i, &mid)| Candle::new(i as i64 * 3_600, mid, mid + 0.5, mid - 0.5, mid))
            .collect();
        CandleSeries::new(candles).unwrap()
    }

    #[test]
    fn single_peak_is_major_high() {
        let series = series_from_mids(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
        let points = detect_swing_points(&series, 5, 0.1, Timeframe::Hour4);
        assert_eq!(points.highs.len(), 1);
        assert_eq!(points.highs[0].index, 5);
        assert_eq!(points.highs[0].significance, Significance::Major);
        assert_eq!(points.highs[0].price, 6.5);
        assert!(points.lows.is_empty());
    }

    #[test]
    fn short_series_is_empty() {
        let series = series_from_mids(&[1.0, 3.0, 1.0, 3.0]);
        let points = detect_swing_points(&series, 2, 0.0, Timeframe::Hour1);
        assert!(points.is_empty());
    }

    #[test]
    fn equal_neighbour_high_disqualifies() {
        let series = series_from_mids(&[1.0, 2.0, 5.0, 5.0, 2.0, 1.0, 0.5]);
        let points = detect_swing_points(&series, 1, 0.0, Timeframe::Hour1);
        assert!(points.highs.is_empty());
    }

    #[test]
    fn minor_pass_finds_narrow_swings_and_skips_majors() {
        // Major peak at 5; narrow bumps at 2 and 8 visible only at lookback 1.
        let series = series_from_mids(&[1.0, 2.0, 3.0, 2.5, 4.0, 9.0, 4.0, 2.5, 3.0, 2.0, 1.0]);
        let points = detect_swing_points(&series, 1, 0.0, Timeframe::Hour1);

        let majors: Vec<usize> = points
            .highs
            .iter()
            .filter(|p| p.significance == Significance::Major)
            .map(|p| p.index)
            .collect();
        let minors: Vec<usize> = points
            .highs
            .iter()
            .filter(|p| p.significance == Significance::Minor)
            .map(|p| p.index)
            .collect();
        assert_eq!(majors, vec![5]);
        assert_eq!(minors, vec![2, 8]);

        let times: Vec<i64> = points.highs.iter().map(|p| p.time).collect();
        let mut sorted = times.clone();
        sorted.sort();
        assert_eq!(times, sorted);
    }

    #[test]
    fn without_minor_only_major_points() {
        let series = series_from_mids(&[1.0, 2.0, 3.0, 2.5, 4.0, 9.0, 4.0, 2.5, 3.0, 2.0, 1.0]);
        let points = SwingDetector::new(1, 0.0).with_minor(false).detect(&series, Timeframe::Hour1);
        assert_eq!(points.highs.len(), 1);
        assert_eq!(points.highs[0].index, 5);
    }

    #[test]
    fn significance_filter_scales_with_timeframe() {
        // Small bump at index 2 (amplitude 2 of a range of 10).
        let series = series_from_mids(&[1.0, 2.0, 3.0, 2.0, 1.0, 0.0, 9.0]);
        let hourly = detect_swing_points(&series, 1, 0.3, Timeframe::Hour1);
        let monthly = detect_swing_points(&series, 1, 0.3, Timeframe::Month1);
        // ratio 0.2 vs required 0.18 (1h) and 0.9 (1m)
        assert!(hourly.highs.iter().any(|p| p.index == 2));
        assert!(!monthly.highs.iter().any(|p| p.index == 2));
    }

    #[test]
    fn swing_low_mirrors_high() {
        let series = series_from_mids(&[6.0, 5.0, 4.0, 3.0, 2.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let points = detect_swing_points(&series, 5, 0.1, Timeframe::Day1);
        assert!(points.highs.is_empty());
        assert_eq!(points.lows.len(), 1);
        assert_eq!(points.lows[0].index, 5);
        assert_eq!(points.lows[0].price, 0.5);
    }

    #[test]
    fn flat_series_has_no_swings() {
        let series = series_from_mids(&[5.0; 15]);
        let points = detect_swing_points(&series, 2, 0.0, Timeframe::Hour1);
        assert!(points.is_empty());
    }
}
