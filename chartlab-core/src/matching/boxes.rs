//! Box matching by overlap relative to the smaller box.
//!
//! The ratio is `intersection / min(expected_area, user_area)`, not IoU: a
//! tight box drawn inside a generous expected zone still scores 1.0.

use std::borrow::Borrow;

use crate::domain::Rect;

use super::{greedy_match, MatchResult, MatchRule};

pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxRule {
    pub overlap_threshold: f64,
}

impl Default for BoxRule {
    fn default() -> Self {
        Self {
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
        }
    }
}

impl<U: Borrow<Rect>, E: Borrow<Rect>> MatchRule<U, E> for BoxRule {
    /// Negated overlap ratio so that the best overlap is the lowest cost.
    fn cost(&self, user: &U, expected: &E) -> f64 {
        -expected.borrow().overlap_ratio(user.borrow())
    }

    fn accepts(&self, cost: f64) -> bool {
        let ratio = -cost;
        ratio > 0.0 && ratio >= self.overlap_threshold
    }
}

pub fn validate_boxes<U, E>(user: &[U], expected: &[E], overlap_threshold: f64) -> MatchResult<U, E>
where
    U: Borrow<Rect> + Clone,
    E: Borrow<Rect> + Clone,
{
    greedy_match(user, expected, &BoxRule { overlap_threshold })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_highest_overlap() {
        let expected = vec![Rect::new(200.0, 150.0, 40.0, 25.0)];
        let user = vec![
            Rect::new(220.0, 150.0, 40.0, 25.0),
            Rect::new(202.0, 151.0, 38.0, 24.0),
        ];
        let result = validate_boxes(&user, &expected, 0.5);
        assert_eq!(result.match_count(), 1);
        assert_eq!(result.matches[0].user_index, 1);
        assert_eq!(result.false_positive_count(), 1);
    }

    #[test]
    fn quarter_overlap_misses_half_threshold() {
        let expected = vec![Rect::new(5.0, 5.0, 10.0, 10.0)];
        let user = vec![Rect::new(0.0, 0.0, 10.0, 10.0)];
        let result = validate_boxes(&user, &expected, 0.5);
        assert_eq!(result.match_count(), 0);
        assert_eq!(result.miss_count(), 1);
        assert_eq!(result.false_positive_count(), 1);
    }

    #[test]
    fn zero_threshold_still_needs_some_overlap() {
        let expected = vec![Rect::new(0.0, 0.0, 10.0, 10.0)];
        let user = vec![Rect::new(50.0, 50.0, 10.0, 10.0)];
        assert_eq!(validate_boxes(&user, &expected, 0.0).match_count(), 0);
    }
}
