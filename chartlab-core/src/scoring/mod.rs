//! Scorers that turn matcher output into credit.

pub mod fibonacci;
pub mod swing_points;

pub use fibonacci::{
    placement_score, DrawingScore, EndpointCredit, FibCreditPolicy, FibDrawing, FibTolerance,
    FibonacciScore, FibonacciScorer, MAX_DRAWING_CREDIT, STANDARD_FIB_LEVELS,
};
pub use swing_points::{score_swing_points, swing_score, SwingPointScore, SWING_SCORE_SCALE};
