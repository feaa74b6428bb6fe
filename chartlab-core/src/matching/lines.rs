//! Line matching by a weighted angle / endpoint / length cost.
//!
//! `cost = 2 * angle_diff + (d1 + d2) / 2 + length_diff_pct / 2`
//!
//! - `angle_diff`: direction difference folded into [0, 180] degrees
//! - `d1`, `d2`: distance from each user endpoint to the nearer expected endpoint
//! - `length_diff_pct`: `|user_len - exp_len| / max(exp_len, 1) * 100`
//!
//! A pairing counts when `cost < angle_tolerance + distance_tolerance`.

use std::borrow::Borrow;

use crate::domain::{angle_diff_deg, Segment};

use super::{greedy_match, MatchResult, MatchRule};

pub const DEFAULT_ANGLE_TOLERANCE: f64 = 15.0;
pub const DEFAULT_DISTANCE_TOLERANCE: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineRule {
    pub angle_tolerance: f64,
    pub distance_tolerance: f64,
}

impl Default for LineRule {
    fn default() -> Self {
        Self {
            angle_tolerance: DEFAULT_ANGLE_TOLERANCE,
            distance_tolerance: DEFAULT_DISTANCE_TOLERANCE,
        }
    }
}

pub fn line_cost(user: &Segment, expected: &Segment) -> f64 {
    let angle = angle_diff_deg(user.angle_deg(), expected.angle_deg());

    let (e1, e2) = (expected.start(), expected.end());
    let d1 = user.start().distance(&e1).min(user.start().distance(&e2));
    let d2 = user.end().distance(&e1).min(user.end().distance(&e2));

    let expected_len = expected.length();
    let length_diff_pct = (user.length() - expected_len).abs() / expected_len.max(1.0) * 100.0;

    2.0 * angle + (d1 + d2) / 2.0 + length_diff_pct / 2.0
}

impl<U: Borrow<Segment>, E: Borrow<Segment>> MatchRule<U, E> for LineRule {
    fn cost(&self, user: &U, expected: &E) -> f64 {
        line_cost(user.borrow(), expected.borrow())
    }

    fn accepts(&self, cost: f64) -> bool {
        cost < self.angle_tolerance + self.distance_tolerance
    }
}

pub fn validate_lines<U, E>(
    user: &[U],
    expected: &[E],
    angle_tolerance: f64,
    distance_tolerance: f64,
) -> MatchResult<U, E>
where
    U: Borrow<Segment> + Clone,
    E: Borrow<Segment> + Clone,
{
    greedy_match(
        user,
        expected,
        &LineRule {
            angle_tolerance,
            distance_tolerance,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_lines_cost_zero() {
        let line = Segment::new(100.0, 150.0, 350.0, 150.0);
        assert_eq!(line_cost(&line, &line), 0.0);
    }

    #[test]
    fn reversed_line_pays_full_angle() {
        let expected = Segment::new(0.0, 0.0, 100.0, 0.0);
        let reversed = Segment::new(100.0, 0.0, 0.0, 0.0);
        // endpoints coincide, lengths equal, but direction differs by 180
        assert_eq!(line_cost(&reversed, &expected), 360.0);
    }

    #[test]
    fn slightly_offset_equal_level_matches() {
        let expected = vec![Segment::new(100.0, 150.0, 350.0, 150.0)];
        let user = vec![Segment::new(104.0, 152.0, 346.0, 152.0)];
        let result = validate_lines(&user, &expected, DEFAULT_ANGLE_TOLERANCE, DEFAULT_DISTANCE_TOLERANCE);
        assert_eq!(result.match_count(), 1);
        assert!(result.matches[0].cost < 35.0);
    }

    #[test]
    fn steep_line_is_rejected() {
        let expected = vec![Segment::new(0.0, 0.0, 100.0, 0.0)];
        let user = vec![Segment::new(0.0, 0.0, 100.0, 40.0)];
        let result = validate_lines(&user, &expected, DEFAULT_ANGLE_TOLERANCE, DEFAULT_DISTANCE_TOLERANCE);
        assert_eq!(result.match_count(), 0);
        assert_eq!(result.miss_count(), 1);
        assert_eq!(result.false_positive_count(), 1);
    }

    #[test]
    fn zero_length_expected_uses_unit_denominator() {
        let expected = Segment::new(5.0, 5.0, 5.0, 5.0);
        let user = Segment::new(5.0, 5.0, 6.0, 5.0);
        assert!(line_cost(&user, &expected).is_finite());
    }
}
