//! Trend anchor selection: picks the leg a Fibonacci retracement is graded against.
//!
//! For an uptrend the start is the latest low that still has a high after it,
//! and the end is the latest high after that low. A downtrend mirrors this
//! with highs and lows swapped. Ambiguity always resolves toward the most
//! recent valid leg, and `start.time < end.time` holds for every anchor.

use crate::domain::{SwingPoint, SwingPoints, TrendAnchor, TrendDirection};

/// Select the anchor for `direction`, or `None` if no start has a later end.
pub fn select_anchor(
    highs: &[SwingPoint],
    lows: &[SwingPoint],
    direction: TrendDirection,
) -> Option<TrendAnchor> {
    let (starts, ends) = match direction {
        TrendDirection::Up => (lows, highs),
        TrendDirection::Down => (highs, lows),
    };

    let start = starts
        .iter()
        .filter(|s| ends.iter().any(|e| e.time > s.time))
        .max_by_key(|s| s.time)?;
    let end = ends
        .iter()
        .filter(|e| e.time > start.time)
        .max_by_key(|e| e.time)?;

    Some(TrendAnchor {
        direction,
        start: *start,
        end: *end,
    })
}

/// Select anchors for both directions and keep the one whose end is most recent.
///
/// Used when the caller does not state the trend. An uptrend wins a tie.
pub fn select_latest_anchor(points: &SwingPoints) -> Option<TrendAnchor> {
    let up = select_anchor(&points.highs, &points.lows, TrendDirection::Up);
    let down = select_anchor(&points.highs, &points.lows, TrendDirection::Down);
    match (up, down) {
        (Some(u), Some(d)) => Some(if d.end.time > u.end.time { d } else { u }),
        (u, d) => u.or(d),
    }
}
