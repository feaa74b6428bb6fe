//! Point matching by Euclidean pixel distance.

use std::borrow::Borrow;

use crate::domain::Point2;

use super::{greedy_match, MatchResult, MatchRule};

/// Default pixel radius within which a drawn point counts.
pub const DEFAULT_POINT_TOLERANCE: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRule {
    pub tolerance: f64,
}

impl Default for PointRule {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_POINT_TOLERANCE,
        }
    }
}

impl<U: Borrow<Point2>, E: Borrow<Point2>> MatchRule<U, E> for PointRule {
    fn cost(&self, user: &U, expected: &E) -> f64 {
        user.borrow().distance(expected.borrow())
    }

    fn accepts(&self, cost: f64) -> bool {
        cost <= self.tolerance
    }
}

pub fn validate_points<U, E>(user: &[U], expected: &[E], tolerance: f64) -> MatchResult<U, E>
where
    U: Borrow<Point2> + Clone,
    E: Borrow<Point2> + Clone,
{
    greedy_match(user, expected, &PointRule { tolerance })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<Point2> {
        raw.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    #[test]
    fn closest_within_tolerance_matches() {
        let expected = pts(&[(100.0, 100.0)]);
        let user = pts(&[(120.0, 100.0), (105.0, 103.0)]);
        let result = validate_points(&user, &expected, DEFAULT_POINT_TOLERANCE);
        assert_eq!(result.match_count(), 1);
        assert_eq!(result.matches[0].user_index, 1);
        assert_eq!(result.false_positives, pts(&[(120.0, 100.0)]));
    }

    #[test]
    fn boundary_distance_is_inclusive() {
        let expected = pts(&[(0.0, 0.0)]);
        let user = pts(&[(3.0, 4.0)]);
        assert_eq!(validate_points(&user, &expected, 5.0).match_count(), 1);
        assert_eq!(validate_points(&user, &expected, 4.99).match_count(), 0);
    }

    #[test]
    fn one_user_point_serves_one_expected_point() {
        let expected = pts(&[(0.0, 0.0), (1.0, 0.0)]);
        let user = pts(&[(0.5, 0.0)]);
        let result = validate_points(&user, &expected, 10.0);
        assert_eq!(result.match_count(), 1);
        assert_eq!(result.matches[0].expected_index, 0);
        assert_eq!(result.miss_count(), 1);
    }
}
