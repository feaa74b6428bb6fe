//! Tolerance-based correspondence between user shapes and expected shapes.
//!
//! One geometry kind is matched at a time. Expected items are visited in the
//! order supplied (callers pass them time-ordered) and each is paired with the
//! cheapest user item not yet consumed, provided the rule accepts that cost.
//! This is a deterministic nearest-available heuristic, not a global
//! minimum-cost assignment: an early expected item can take a user item a
//! later one would have preferred.
//!
//! Every expected item ends up in exactly one of `matches` / `misses`, and
//! every user item in exactly one of `matches` / `false_positives`.

pub mod boxes;
pub mod lines;
pub mod points;
pub mod price_points;

use serde::{Deserialize, Serialize};

pub use boxes::{validate_boxes, BoxRule};
pub use lines::{line_cost, validate_lines, LineRule};
pub use points::{validate_points, PointRule};
pub use price_points::PricePointRule;

/// Pairing policy. Greedy is the only supported policy; it defines the
/// scores learners have always received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum MatchStrategy {
    #[default]
    Greedy,
}

/// Cost model for one geometry kind.
pub trait MatchRule<U, E> {
    /// Pairing cost; lower is better. NaN never wins.
    fn cost(&self, user: &U, expected: &E) -> f64;

    /// Whether the best available cost is good enough to count as a match.
    fn accepts(&self, cost: f64) -> bool;
}

/// A paired (user, expected) item with their positions in the input slices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matched<U, E> {
    pub user: U,
    pub expected: E,
    pub user_index: usize,
    pub expected_index: usize,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult<U, E> {
    pub matches: Vec<Matched<U, E>>,
    /// Expected items no user item was accepted for.
    pub misses: Vec<E>,
    /// User items left unconsumed.
    pub false_positives: Vec<U>,
}

impl<U, E> MatchResult<U, E> {
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn miss_count(&self) -> usize {
        self.misses.len()
    }

    pub fn false_positive_count(&self) -> usize {
        self.false_positives.len()
    }
}

/// Match with the requested strategy.
pub fn match_with<U, E, R>(
    strategy: MatchStrategy,
    users: &[U],
    expected: &[E],
    rule: &R,
) -> MatchResult<U, E>
where
    U: Clone,
    E: Clone,
    R: MatchRule<U, E>,
{
    match strategy {
        MatchStrategy::Greedy => greedy_match(users, expected, rule),
    }
}

/// Greedy per-expected-item matching.
///
/// Ties on cost go to the earliest user item in submission order.
pub fn greedy_match<U, E, R>(users: &[U], expected: &[E], rule: &R) -> MatchResult<U, E>
where
    U: Clone,
    E: Clone,
    R: MatchRule<U, E>,
{
    let mut consumed = vec![false; users.len()];
    let mut matches = Vec::new();
    let mut misses = Vec::new();

    for (expected_index, exp) in expected.iter().enumerate() {
        let mut best: Option<(usize, f64)> = None;
        for (user_index, user) in users.iter().enumerate() {
            if consumed[user_index] {
                continue;
            }
            let cost = rule.cost(user, exp);
            if best.map_or(!cost.is_nan(), |(_, best_cost)| cost < best_cost) {
                best = Some((user_index, cost));
            }
        }

        match best {
            Some((user_index, cost)) if rule.accepts(cost) => {
                consumed[user_index] = true;
                matches.push(Matched {
                    user: users[user_index].clone(),
                    expected: exp.clone(),
                    user_index,
                    expected_index,
                    cost,
                });
            }
            _ => misses.push(exp.clone()),
        }
    }

    let false_positives = users
        .iter()
        .zip(&consumed)
        .filter(|(_, used)| !**used)
        .map(|(u, _)| u.clone())
        .collect();

    MatchResult {
        matches,
        misses,
        false_positives,
    }
}
