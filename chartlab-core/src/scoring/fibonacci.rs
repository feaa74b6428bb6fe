//! Fibonacci retracement scoring: partial credit per anchor endpoint.
//!
//! Each drawing's direction (sign of `end.price - start.price`) must agree
//! with the anchor's; a disagreeing drawing earns nothing. Otherwise the two
//! endpoints are scored independently:
//!
//! | Endpoint error (time and price)  | Credit |
//! |----------------------------------|--------|
//! | within 1x tolerance              | 1.0    |
//! | within 2x tolerance              | 0.5    |
//! | otherwise                        | 0.0    |
//!
//! A drawing therefore earns 0 to 2. How drawings combine is set by
//! [`FibCreditPolicy`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    angle_diff_deg, CandleSeries, FibonacciAnnotation, PricePoint, SwingPoint, Timeframe,
    TrendAnchor, TrendDirection,
};
use crate::feedback::{format_price, format_time, Feedback};

/// Retracement levels a complete drawing is expected to show.
pub const STANDARD_FIB_LEVELS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// Maximum credit one drawing can earn.
pub const MAX_DRAWING_CREDIT: f64 = 2.0;

const LEVEL_EPSILON: f64 = 1e-3;

/// Allowed endpoint error for an exact match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibTolerance {
    pub price: f64,
    pub time_secs: f64,
}

impl FibTolerance {
    /// `price = range * pct(timeframe)`, `time = 3 candle intervals`.
    pub fn for_series(series: &CandleSeries, timeframe: Timeframe) -> Self {
        Self {
            price: series.price_range() * timeframe.fib_price_tolerance_pct(),
            time_secs: 3.0 * timeframe.interval_secs() as f64,
        }
    }
}

/// How per-drawing credit combines into the exam score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FibCreditPolicy {
    /// Sum over every submitted drawing, uncapped.
    #[default]
    Accumulate,
    /// Only the best single drawing counts (0 to 2).
    BestDrawing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointCredit {
    Exact,
    Close,
    Incorrect,
}

impl EndpointCredit {
    pub fn value(&self) -> f64 {
        match self {
            EndpointCredit::Exact => 1.0,
            EndpointCredit::Close => 0.5,
            EndpointCredit::Incorrect => 0.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EndpointCredit::Exact => "Exact",
            EndpointCredit::Close => "Close",
            EndpointCredit::Incorrect => "Incorrect",
        }
    }

    pub fn grade(user: &PricePoint, expected: &SwingPoint, tolerance: &FibTolerance) -> Self {
        let dt = user.time.abs_diff(expected.time) as f64;
        let dp = (user.price - expected.price).abs();
        if dt <= tolerance.time_secs && dp <= tolerance.price {
            EndpointCredit::Exact
        } else if dt <= 2.0 * tolerance.time_secs && dp <= 2.0 * tolerance.price {
            EndpointCredit::Close
        } else {
            EndpointCredit::Incorrect
        }
    }
}

/// A retracement drawing in domain space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibDrawing {
    pub start: PricePoint,
    pub end: PricePoint,
    #[serde(default)]
    pub levels: Vec<f64>,
}

impl FibDrawing {
    /// `None` when either endpoint is given in pixel space.
    pub fn from_annotation(annotation: &FibonacciAnnotation) -> Option<Self> {
        Some(Self {
            start: annotation.start.domain()?,
            end: annotation.end.domain()?,
            levels: annotation.levels.clone(),
        })
    }

    pub fn direction(&self) -> Option<TrendDirection> {
        TrendDirection::from_prices(self.start.price, self.end.price)
    }

    /// Standard levels absent from this drawing. Empty `levels` means the
    /// tool's defaults were used and nothing is reported missing.
    pub fn missing_levels(&self) -> Vec<f64> {
        if self.levels.is_empty() {
            return Vec::new();
        }
        STANDARD_FIB_LEVELS
            .iter()
            .copied()
            .filter(|std| !self.levels.iter().any(|l| (l - std).abs() < LEVEL_EPSILON))
            .collect()
    }
}

/// Outcome for one submitted drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingScore {
    pub index: usize,
    pub direction_matches: bool,
    pub start: EndpointCredit,
    pub end: EndpointCredit,
    pub credit: f64,
    pub missing_levels: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibonacciScore {
    /// Combined credit under the configured policy.
    pub credit: f64,
    pub drawings: Vec<DrawingScore>,
    /// Best 0-30 trend placement score over all drawings.
    pub placement_score: u32,
    pub feedback: Feedback,
}

impl FibonacciScore {
    pub fn earned_any(&self) -> bool {
        self.credit > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FibonacciScorer {
    tolerance: FibTolerance,
    policy: FibCreditPolicy,
}

impl FibonacciScorer {
    pub fn new(tolerance: FibTolerance, policy: FibCreditPolicy) -> Self {
        Self { tolerance, policy }
    }

    pub fn tolerance(&self) -> FibTolerance {
        self.tolerance
    }

    pub fn score(&self, drawings: &[FibDrawing], anchor: &TrendAnchor) -> FibonacciScore {
        let mut feedback = Feedback::default();
        let mut scores = Vec::with_capacity(drawings.len());

        for (index, drawing) in drawings.iter().enumerate() {
            let label = index + 1;
            let missing_levels = drawing.missing_levels();

            if drawing.direction() != Some(anchor.direction) {
                feedback.incorrect(format!(
                    "incorrect_direction: drawing {label} is drawn as {} but the leg is {}; no credit awarded.",
                    describe_direction(drawing.direction()),
                    anchor.direction,
                ));
                scores.push(DrawingScore {
                    index,
                    direction_matches: false,
                    start: EndpointCredit::Incorrect,
                    end: EndpointCredit::Incorrect,
                    credit: 0.0,
                    missing_levels,
                });
                continue;
            }

            let start = EndpointCredit::grade(&drawing.start, &anchor.start, &self.tolerance);
            let end = EndpointCredit::grade(&drawing.end, &anchor.end, &self.tolerance);
            let credit = start.value() + end.value();

            let message = format!(
                "Drawing {label}: start {} ({:.1}), end {} ({:.1}); {credit:.1} of {MAX_DRAWING_CREDIT:.1} credit.",
                start.label(),
                start.value(),
                end.label(),
                end.value(),
            );
            if credit > 0.0 {
                feedback.correct(message);
            } else {
                feedback.incorrect(message);
            }

            if !missing_levels.is_empty() {
                let listed: Vec<String> = missing_levels.iter().map(|l| format!("{l}")).collect();
                feedback.incorrect(format!(
                    "Drawing {label} is missing standard levels: {}.",
                    listed.join(", ")
                ));
            }

            scores.push(DrawingScore {
                index,
                direction_matches: true,
                start,
                end,
                credit,
                missing_levels,
            });
        }

        let credit = match self.policy {
            FibCreditPolicy::Accumulate => scores.iter().map(|s| s.credit).sum(),
            FibCreditPolicy::BestDrawing => scores.iter().map(|s| s.credit).fold(0.0, f64::max),
        };

        if credit <= 0.0 {
            feedback.incorrect(format!(
                "missed_retracement: expected the {} leg from {} at {} to {} at {}.",
                anchor.direction,
                format_price(anchor.start.price),
                format_time(anchor.start.time),
                format_price(anchor.end.price),
                format_time(anchor.end.time),
            ));
        }

        let placement_score = drawings
            .iter()
            .map(|d| placement_score(d, anchor))
            .max()
            .unwrap_or(0);

        debug!(
            drawings = drawings.len(),
            credit,
            placement_score,
            policy = ?self.policy,
            "fibonacci scoring complete"
        );

        FibonacciScore {
            credit,
            drawings: scores,
            placement_score,
            feedback,
        }
    }
}

fn describe_direction(direction: Option<TrendDirection>) -> String {
    match direction {
        Some(d) => format!("a {d}"),
        None => "a flat line".to_string(),
    }
}

/// 0-30 trend placement score: up to 15 for angle, up to 15 for length.
///
/// Both legs are measured with time scaled by the anchor's time span and
/// price by its price span, so the expected leg is a unit diagonal.
pub fn placement_score(drawing: &FibDrawing, anchor: &TrendAnchor) -> u32 {
    let time_scale = (anchor.time_span() as f64).max(1.0);
    let price_scale = anchor.price_span().max(f64::EPSILON);

    let leg = |start: &PricePoint, end: &PricePoint| {
        let dx = (end.time as f64 - start.time as f64) / time_scale;
        let dy = (end.price - start.price) / price_scale;
        (dy.atan2(dx).to_degrees(), dx.hypot(dy))
    };

    let anchor_start = PricePoint::new(anchor.start.time, anchor.start.price);
    let anchor_end = PricePoint::new(anchor.end.time, anchor.end.price);
    let (expected_angle, expected_len) = leg(&anchor_start, &anchor_end);
    let (user_angle, user_len) = leg(&drawing.start, &drawing.end);

    let angle_diff = angle_diff_deg(user_angle, expected_angle);
    let length_diff = (user_len - expected_len).abs() / expected_len.max(1.0) * 100.0;

    let angle_score = (15.0 - angle_diff / 3.0).max(0.0);
    let length_score = (15.0 - length_diff / 10.0).max(0.0);
    (angle_score + length_score) as u32
}
