//! Domain-space point matching: a drawn `{time, price}` against a detected swing point.
//!
//! Price error is relative to the expected price; time error is absolute
//! seconds. Cost is the larger of the two errors, each divided by its
//! tolerance, so a cost of 1.0 sits exactly on the tolerance boundary.

use crate::domain::{PricePoint, SwingPoint};

use super::MatchRule;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePointRule {
    /// Allowed relative price error, e.g. 0.005 for 0.5%.
    pub price_tolerance_pct: f64,
    pub time_tolerance_secs: f64,
}

impl PricePointRule {
    fn normalized(error: f64, tolerance: f64) -> f64 {
        if tolerance > 0.0 {
            error / tolerance
        } else if error == 0.0 {
            0.0
        } else {
            f64::INFINITY
        }
    }
}

impl MatchRule<PricePoint, SwingPoint> for PricePointRule {
    fn cost(&self, user: &PricePoint, expected: &SwingPoint) -> f64 {
        let price_error = if expected.price != 0.0 {
            (expected.price - user.price).abs() / expected.price.abs()
        } else {
            user.price.abs()
        };
        let time_error = expected.time.abs_diff(user.time) as f64;

        Self::normalized(price_error, self.price_tolerance_pct)
            .max(Self::normalized(time_error, self.time_tolerance_secs))
    }

    fn accepts(&self, cost: f64) -> bool {
        cost <= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Significance, SwingKind};
    use crate::matching::greedy_match;

    fn swing(time: i64, price: f64) -> SwingPoint {
        SwingPoint {
            kind: SwingKind::High,
            time,
            price,
            index: 0,
            significance: Significance::Major,
        }
    }

    const RULE: PricePointRule = PricePointRule {
        price_tolerance_pct: 0.005,
        time_tolerance_secs: 7_200.0,
    };

    #[test]
    fn within_both_tolerances_matches() {
        let result = greedy_match(
            &[PricePoint::new(3_600, 100.4)],
            &[swing(0, 100.0)],
            &RULE,
        );
        assert_eq!(result.match_count(), 1);
    }

    #[test]
    fn price_or_time_outside_tolerance_misses() {
        let far_price = greedy_match(&[PricePoint::new(0, 101.0)], &[swing(0, 100.0)], &RULE);
        assert_eq!(far_price.match_count(), 0);

        let far_time = greedy_match(&[PricePoint::new(10_800, 100.0)], &[swing(0, 100.0)], &RULE);
        assert_eq!(far_time.match_count(), 0);
    }

    #[test]
    fn zero_time_tolerance_requires_exact_time() {
        let rule = PricePointRule {
            time_tolerance_secs: 0.0,
            ..RULE
        };
        assert_eq!(rule.cost(&PricePoint::new(0, 100.0), &swing(0, 100.0)), 0.0);
        assert!(rule.cost(&PricePoint::new(1, 100.0), &swing(0, 100.0)).is_infinite());
    }

    #[test]
    fn extreme_timestamps_do_not_overflow() {
        let cost = RULE.cost(&PricePoint::new(i64::MIN, 100.0), &swing(i64::MAX, 100.0));
        assert!(cost.is_finite());
        assert!(!RULE.accepts(cost));

        let result = greedy_match(&[PricePoint::new(i64::MAX, 100.0)], &[swing(i64::MIN, 100.0)], &RULE);
        assert_eq!(result.false_positive_count(), 1);
    }
}
