//! Domain-space swing-point grading.
//!
//! User `{time, price}` points are matched against detected highs first; the
//! points left over are then matched against detected lows. Whatever is still
//! unconsumed counts as incorrect.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{PricePoint, SwingKind, SwingPoint, SwingPoints};
use crate::feedback::{format_price, format_time, Feedback};
use crate::matching::{match_with, MatchResult, MatchStrategy, PricePointRule};

/// Full marks for a swing-point exam.
pub const SWING_SCORE_SCALE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwingPointScore {
    /// 0-10.
    pub score: f64,
    pub correct_ratio: f64,
    pub match_count: usize,
    pub miss_count: usize,
    pub false_positive_count: usize,
    /// Major = 2, minor = 1, summed over matched expected points.
    pub earned_weight: f64,
    pub total_weight: f64,
    /// `earned_weight / total_weight * 100`, 0 when nothing was expected.
    pub percentage: f64,
    pub feedback: Feedback,
}

/// `round(10 * max(0, ratio - min(0.5, 0.1 * incorrect)))`.
pub fn swing_score(correct_ratio: f64, incorrect_count: usize) -> f64 {
    let penalty = (0.1 * incorrect_count as f64).min(0.5);
    (SWING_SCORE_SCALE * (correct_ratio - penalty).max(0.0)).round()
}

pub fn score_swing_points(
    user: &[PricePoint],
    expected: &SwingPoints,
    rule: &PricePointRule,
    strategy: MatchStrategy,
) -> SwingPointScore {
    let highs = match_with(strategy, user, &expected.highs, rule);
    let lows = match_with(strategy, &highs.false_positives, &expected.lows, rule);

    let mut feedback = Feedback::default();
    describe(&highs, &mut feedback);
    describe(&lows, &mut feedback);
    for point in &lows.false_positives {
        feedback.incorrect(format!(
            "The point at price {} ({}) doesn't match any significant swing point.",
            format_price(point.price),
            format_time(point.time),
        ));
    }

    let match_count = highs.match_count() + lows.match_count();
    let miss_count = highs.miss_count() + lows.miss_count();
    let false_positive_count = lows.false_positive_count();

    let correct_ratio = if expected.is_empty() {
        0.0
    } else {
        match_count as f64 / expected.len() as f64
    };

    let earned_weight: f64 = highs
        .matches
        .iter()
        .chain(lows.matches.iter())
        .map(|m| m.expected.significance.weight())
        .sum();
    let total_weight = expected.total_weight();
    let percentage = if total_weight > 0.0 {
        earned_weight / total_weight * 100.0
    } else {
        0.0
    };

    let score = swing_score(correct_ratio, false_positive_count);
    debug!(
        match_count,
        miss_count, false_positive_count, score, "swing points scored"
    );

    SwingPointScore {
        score,
        correct_ratio,
        match_count,
        miss_count,
        false_positive_count,
        earned_weight,
        total_weight,
        percentage,
        feedback,
    }
}

fn describe(result: &MatchResult<PricePoint, SwingPoint>, feedback: &mut Feedback) {
    for m in &result.matches {
        feedback.correct(format!(
            "Good job! You correctly identified a {} {} at price {} ({}).",
            m.expected.significance,
            kind_label(m.expected.kind),
            format_price(m.expected.price),
            format_time(m.expected.time),
        ));
    }
    for miss in &result.misses {
        feedback.incorrect(format!(
            "You missed a {} {} at price {} ({}).",
            miss.significance,
            kind_label(miss.kind),
            format_price(miss.price),
            format_time(miss.time),
        ));
    }
}

fn kind_label(kind: SwingKind) -> &'static str {
    match kind {
        SwingKind::High => "swing high",
        SwingKind::Low => "swing low",
    }
}
