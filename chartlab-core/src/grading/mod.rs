//! Grading orchestration: one request in, one score/feedback envelope out.
//!
//! The section decides what is graded:
//!
//! | Section kind | Answer key present           | No answer key                    |
//! |--------------|------------------------------|----------------------------------|
//! | swing points | pixel points, weighted       | domain points vs detected swings |
//! | lines        | pixel lines, weighted        | score 0, no criteria             |
//! | boxes        | pixel boxes, weighted        | score 0, no criteria             |
//! | fibonacci    | ignored                      | drawings vs detected trend leg   |
//!
//! Grading holds no state between calls. Independent requests can be graded
//! concurrently; [`Grader::grade_batch`] does so with rayon.

pub mod answer_key;
pub mod exam;

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::{select_anchor, select_latest_anchor};
use crate::config::{ConfigError, GradingConfig};
use crate::data::{CandleProvider, ProviderError};
use crate::domain::{
    Annotation, AnnotationBuckets, CandleSeries, Coord, LineSpan, Point2, PricePoint, Segment,
    SeriesError, Timeframe, TrendAnchor, TrendDirection,
};
use crate::feedback::{format_price, Feedback};
use crate::matching::{match_with, MatchResult};
use crate::scoring::{
    score_swing_points, DrawingScore, FibCreditPolicy, FibDrawing, FibTolerance, FibonacciScorer,
    MAX_DRAWING_CREDIT, SWING_SCORE_SCALE,
};

pub use answer_key::{AnswerKey, Described};
pub use exam::{catalog, Difficulty, ExamError, ExamInfo, ExamType, Section, SectionKind};

/// Shown when a pixel-only section arrives without an answer key.
pub const NO_CRITERIA_MESSAGE: &str = "No validation criteria available for this chart.";

// ─── Errors ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSpace {
    Pixel,
    Domain,
}

impl fmt::Display for CoordinateSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateSpace::Pixel => f.write_str("pixel"),
            CoordinateSpace::Domain => f.write_str("domain"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GradeError {
    #[error(transparent)]
    Exam(#[from] ExamError),

    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{kind} annotation #{index} is in {found} space but {section} grading expects {expected} space")]
    CoordinateSpace {
        section: Section,
        kind: &'static str,
        index: usize,
        expected: CoordinateSpace,
        found: CoordinateSpace,
    },
}

// ─── Request / result ───────────────────────────────────────────────

/// Everything needed to grade one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingRequest {
    pub exam_type: ExamType,
    pub section: Section,
    pub timeframe: Timeframe,
    #[serde(default)]
    pub candles: CandleSeries,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_key: Option<AnswerKey>,
    /// Expected leg direction for Fibonacci sections; inferred when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<TrendDirection>,
}

impl GradingRequest {
    pub fn new(exam_type: ExamType, section: Section, timeframe: Timeframe, candles: CandleSeries) -> Self {
        Self {
            exam_type,
            section,
            timeframe,
            candles,
            annotations: Vec::new(),
            answer_key: None,
            direction: None,
        }
    }

    pub fn with_annotations(mut self, annotations: Vec<Annotation>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn with_answer_key(mut self, answer_key: AnswerKey) -> Self {
        self.answer_key = Some(answer_key);
        self
    }

    pub fn with_direction(mut self, direction: TrendDirection) -> Self {
        self.direction = Some(direction);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradingMode {
    /// Answer-key shapes in pixel space.
    Pixel,
    /// Features detected from the candles, annotations in time/price.
    Domain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwingDetails {
    pub detected_highs: usize,
    pub detected_lows: usize,
    pub correct_ratio: f64,
    pub earned_weight: f64,
    pub total_weight: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FibonacciDetails {
    pub anchor: Option<TrendAnchor>,
    pub direction_inferred: bool,
    pub credit_policy: FibCreditPolicy,
    pub price_tolerance: f64,
    pub time_tolerance_secs: f64,
    pub drawings: Vec<DrawingScore>,
    pub placement_score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingDetails {
    pub match_count: usize,
    pub miss_count: usize,
    pub false_positive_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swing: Option<SwingDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fibonacci: Option<FibonacciDetails>,
}

impl GradingDetails {
    fn counts<U, E>(result: &MatchResult<U, E>) -> Self {
        Self {
            match_count: result.match_count(),
            miss_count: result.miss_count(),
            false_positive_count: result.false_positive_count(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingResult {
    pub exam_type: ExamType,
    pub section: Section,
    pub mode: GradingMode,
    pub score: f64,
    pub total_possible: f64,
    /// Domain sections pass at `pass_ratio * total_possible`; pixel sections
    /// at `pass_ratio * score_cap`.
    pub passed: bool,
    pub feedback: Feedback,
    pub details: GradingDetails,
}

impl GradingResult {
    /// Score as a percentage of `total_possible`, 0 when nothing was possible.
    pub fn percent(&self) -> f64 {
        if self.total_possible > 0.0 {
            self.score / self.total_possible * 100.0
        } else {
            0.0
        }
    }
}

/// A section grader's output before the pass mark is applied.
struct Outcome {
    mode: GradingMode,
    score: f64,
    total_possible: f64,
    feedback: Feedback,
    details: GradingDetails,
}

// ─── Grader ─────────────────────────────────────────────────────────

/// Stateless grader over a validated [`GradingConfig`].
#[derive(Debug, Clone, Default)]
pub struct Grader {
    config: GradingConfig,
}

impl Grader {
    pub fn new(config: GradingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GradingConfig {
        &self.config
    }

    pub fn grade(&self, request: &GradingRequest) -> Result<GradingResult, GradeError> {
        request.exam_type.check_section(request.section)?;
        let buckets = AnnotationBuckets::classify(&request.annotations);
        debug!(
            exam = %request.exam_type,
            section = %request.section,
            candles = request.candles.len(),
            points = buckets.points.len(),
            lines = buckets.lines.len(),
            boxes = buckets.boxes.len(),
            fibonacci = buckets.fibonacci.len(),
            "grading request"
        );

        let key = request.answer_key.as_ref();
        let outcome = match request.section.kind() {
            SectionKind::SwingPoints => match key {
                Some(key) => self.grade_pixel_points(request.section, &buckets, key)?,
                None => self.grade_domain_points(request, &buckets)?,
            },
            SectionKind::Lines => match key {
                Some(key) => self.grade_pixel_lines(request.section, &buckets, key)?,
                None => self.no_criteria(request.section),
            },
            SectionKind::Boxes => match key {
                Some(key) => self.grade_pixel_boxes(&buckets, key),
                None => self.no_criteria(request.section),
            },
            SectionKind::Fibonacci => {
                if key.is_some() {
                    debug!(section = %request.section, "answer key ignored for fibonacci section");
                }
                self.grade_fibonacci(request, &buckets)?
            }
        };

        // Pixel sections pass against the full weighted scale, whatever the key holds.
        let pass_scale = match outcome.mode {
            GradingMode::Pixel => self.config.weights.score_cap,
            GradingMode::Domain => outcome.total_possible,
        };
        let passed = pass_scale > 0.0 && outcome.score + 1e-9 >= self.config.pass_ratio * pass_scale;

        info!(
            exam = %request.exam_type,
            section = %request.section,
            score = outcome.score,
            total_possible = outcome.total_possible,
            passed,
            "graded"
        );

        Ok(GradingResult {
            exam_type: request.exam_type,
            section: request.section,
            mode: outcome.mode,
            score: outcome.score,
            total_possible: outcome.total_possible,
            passed,
            feedback: outcome.feedback,
            details: outcome.details,
        })
    }

    /// Grade independent requests in parallel. Results keep input order.
    pub fn grade_batch(&self, requests: &[GradingRequest]) -> Vec<Result<GradingResult, GradeError>> {
        requests.par_iter().map(|request| self.grade(request)).collect()
    }

    /// Fetch candles for `symbol` at the request's timeframe, then grade.
    /// Any candles already on the request are replaced.
    pub fn grade_from_provider(
        &self,
        provider: &dyn CandleProvider,
        symbol: &str,
        request: GradingRequest,
    ) -> Result<GradingResult, GradeError> {
        let candles = provider.candles(symbol, request.timeframe)?;
        debug!(provider = provider.name(), symbol, candles = candles.len(), "candles fetched");
        self.grade(&GradingRequest { candles, ..request })
    }

    // ─── Pixel mode ─────────────────────────────────────────────────

    fn grade_pixel_points(
        &self,
        section: Section,
        buckets: &AnnotationBuckets,
        key: &AnswerKey,
    ) -> Result<Outcome, GradeError> {
        let users = pixel_points(section, &buckets.points)?;
        let strategy = self.config.matcher.strategy;
        let rule = self.config.matcher.point_rule(key.tolerance);

        let highs = match_with(strategy, &users, &key.swing_highs, &rule);
        let lows = match_with(strategy, &users, &key.swing_lows, &rule);

        let mut feedback = Feedback::default();
        for (result, kind) in [(&highs, "swing high"), (&lows, "swing low")] {
            for m in &result.matches {
                feedback.correct(format!(
                    "Correct {kind} identified at {}",
                    m.expected.label("unknown position")
                ));
            }
            for miss in &result.misses {
                feedback.incorrect(format!("Missed {kind} at {}", miss.label("unknown position")));
            }
        }

        // A point matched as either a high or a low is not a false positive.
        let mut used = vec![false; users.len()];
        for m in highs.matches.iter().chain(lows.matches.iter()) {
            used[m.user_index] = true;
        }
        let mut false_positive_count = 0;
        for (point, _) in users.iter().zip(&used).filter(|(_, used)| !**used) {
            false_positive_count += 1;
            feedback.incorrect(format!(
                "Point at ({:.0}, {:.0}) does not match any expected swing point",
                point.x, point.y
            ));
        }

        let weight = self.config.weights.swing_point;
        let matched = highs.match_count() + lows.match_count();
        let expected = key.swing_highs.len() + key.swing_lows.len();

        Ok(self.weighted_outcome(
            matched,
            expected,
            weight,
            feedback,
            GradingDetails {
                match_count: matched,
                miss_count: highs.miss_count() + lows.miss_count(),
                false_positive_count,
                ..GradingDetails::default()
            },
        ))
    }

    fn grade_pixel_lines(
        &self,
        section: Section,
        buckets: &AnnotationBuckets,
        key: &AnswerKey,
    ) -> Result<Outcome, GradeError> {
        let users = pixel_lines(section, &buckets.lines)?;
        let result = match_with(
            self.config.matcher.strategy,
            &users,
            &key.lines,
            &self.config.matcher.line_rule(),
        );

        let mut feedback = Feedback::default();
        for m in &result.matches {
            feedback.correct(format!(
                "Correct equal level identified: {}",
                m.expected.label("unknown level")
            ));
        }
        for miss in &result.misses {
            feedback.incorrect(format!("Missed equal level: {}", miss.label("unknown level")));
        }
        for line in &result.false_positives {
            feedback.incorrect(format!(
                "Line from ({:.0}, {:.0}) to ({:.0}, {:.0}) does not match any expected level",
                line.x1, line.y1, line.x2, line.y2
            ));
        }

        Ok(self.weighted_outcome(
            result.match_count(),
            key.lines.len(),
            self.config.weights.line,
            feedback,
            GradingDetails::counts(&result),
        ))
    }

    fn grade_pixel_boxes(&self, buckets: &AnnotationBuckets, key: &AnswerKey) -> Outcome {
        let result = match_with(
            self.config.matcher.strategy,
            &buckets.boxes,
            &key.boxes,
            &self.config.matcher.box_rule(),
        );

        let mut feedback = Feedback::default();
        for m in &result.matches {
            feedback.correct(format!("Correctly identified: {}", m.expected.label("Fair Value Gap")));
        }
        for miss in &result.misses {
            feedback.incorrect(format!("Missed: {}", miss.label("Fair Value Gap")));
        }
        for rect in &result.false_positives {
            feedback.incorrect(format!(
                "Box at ({:.0}, {:.0}) does not overlap any expected gap enough",
                rect.x, rect.y
            ));
        }

        self.weighted_outcome(
            result.match_count(),
            key.boxes.len(),
            self.config.weights.r#box,
            feedback,
            GradingDetails::counts(&result),
        )
    }

    /// `matched * weight`, capped. The total is what a perfect answer earns.
    fn weighted_outcome(
        &self,
        matched: usize,
        expected: usize,
        weight: f64,
        feedback: Feedback,
        details: GradingDetails,
    ) -> Outcome {
        let cap = self.config.weights.score_cap;
        Outcome {
            mode: GradingMode::Pixel,
            score: (matched as f64 * weight).min(cap),
            total_possible: (expected as f64 * weight).min(cap),
            feedback,
            details,
        }
    }

    fn no_criteria(&self, section: Section) -> Outcome {
        warn!(section = %section, "no answer key for pixel-only section");
        let mut feedback = Feedback::default();
        feedback.incorrect(NO_CRITERIA_MESSAGE);
        Outcome {
            mode: GradingMode::Pixel,
            score: 0.0,
            total_possible: self.config.weights.score_cap,
            feedback,
            details: GradingDetails::default(),
        }
    }

    // ─── Domain mode ────────────────────────────────────────────────

    fn grade_domain_points(
        &self,
        request: &GradingRequest,
        buckets: &AnnotationBuckets,
    ) -> Result<Outcome, GradeError> {
        let users = domain_points(request.section, &buckets.points)?;
        let detector = self.config.detector.detector();
        let expected = detector.detect(&request.candles, request.timeframe);

        let mut outcome = Outcome {
            mode: GradingMode::Domain,
            score: 0.0,
            total_possible: SWING_SCORE_SCALE,
            feedback: Feedback::default(),
            details: GradingDetails::default(),
        };

        if expected.is_empty() {
            warn!(
                candles = request.candles.len(),
                required = detector.min_series_len(),
                "no swing points detected"
            );
            outcome.feedback.incorrect(format!(
                "No significant swing points could be detected on this chart ({} candles, at least {} needed).",
                request.candles.len(),
                detector.min_series_len()
            ));
            outcome.details.false_positive_count = users.len();
            return Ok(outcome);
        }

        let rule = self.config.swing.rule(request.timeframe);
        let scored = score_swing_points(&users, &expected, &rule, self.config.matcher.strategy);

        outcome.score = scored.score;
        outcome.feedback = scored.feedback;
        outcome.details = GradingDetails {
            match_count: scored.match_count,
            miss_count: scored.miss_count,
            false_positive_count: scored.false_positive_count,
            swing: Some(SwingDetails {
                detected_highs: expected.highs.len(),
                detected_lows: expected.lows.len(),
                correct_ratio: scored.correct_ratio,
                earned_weight: scored.earned_weight,
                total_weight: scored.total_weight,
                percentage: scored.percentage,
            }),
            fibonacci: None,
        };
        Ok(outcome)
    }

    fn grade_fibonacci(
        &self,
        request: &GradingRequest,
        buckets: &AnnotationBuckets,
    ) -> Result<Outcome, GradeError> {
        let drawings = buckets
            .fibonacci
            .iter()
            .enumerate()
            .map(|(index, annotation)| {
                FibDrawing::from_annotation(annotation).ok_or(GradeError::CoordinateSpace {
                    section: request.section,
                    kind: "fibonacci",
                    index,
                    expected: CoordinateSpace::Domain,
                    found: CoordinateSpace::Pixel,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let swings = self
            .config
            .detector
            .detector()
            .detect(&request.candles, request.timeframe);
        let anchor = match request.direction {
            Some(direction) => select_anchor(&swings.highs, &swings.lows, direction),
            None => select_latest_anchor(&swings),
        };

        let tolerance = FibTolerance::for_series(&request.candles, request.timeframe);
        let policy = self.config.fibonacci.credit_policy;
        let mut details = FibonacciDetails {
            anchor,
            direction_inferred: request.direction.is_none(),
            credit_policy: policy,
            price_tolerance: tolerance.price,
            time_tolerance_secs: tolerance.time_secs,
            drawings: Vec::new(),
            placement_score: 0,
        };

        let Some(anchor) = anchor else {
            warn!(
                highs = swings.highs.len(),
                lows = swings.lows.len(),
                direction = ?request.direction,
                "no qualifying trend leg"
            );
            let mut feedback = Feedback::default();
            feedback.incorrect(match request.direction {
                Some(direction) => format!(
                    "No qualifying {direction} leg was found on this chart, so the retracement cannot be graded."
                ),
                None => "No qualifying trend leg was found on this chart, so the retracement cannot be graded."
                    .to_string(),
            });
            return Ok(Outcome {
                mode: GradingMode::Domain,
                score: 0.0,
                total_possible: MAX_DRAWING_CREDIT,
                feedback,
                details: GradingDetails {
                    false_positive_count: drawings.len(),
                    fibonacci: Some(details),
                    ..GradingDetails::default()
                },
            });
        };

        let scored = FibonacciScorer::new(tolerance, policy).score(&drawings, &anchor);
        let credited = scored.drawings.iter().filter(|d| d.credit > 0.0).count();

        let mut feedback = Feedback::default();
        if request.direction.is_none() {
            feedback.correct(format!(
                "Graded against the most recent {} leg ({} to {}).",
                anchor.direction,
                format_price(anchor.start.price),
                format_price(anchor.end.price)
            ));
        }
        feedback.extend(scored.feedback);

        details.drawings = scored.drawings;
        details.placement_score = scored.placement_score;

        Ok(Outcome {
            mode: GradingMode::Domain,
            score: scored.credit,
            total_possible: MAX_DRAWING_CREDIT,
            feedback,
            details: GradingDetails {
                match_count: credited,
                miss_count: usize::from(credited == 0),
                false_positive_count: drawings.len() - credited,
                swing: None,
                fibonacci: Some(details),
            },
        })
    }
}

// ─── Coordinate-space extraction ────────────────────────────────────

fn space_error(section: Section, kind: &'static str, index: usize, expected: CoordinateSpace) -> GradeError {
    let found = match expected {
        CoordinateSpace::Pixel => CoordinateSpace::Domain,
        CoordinateSpace::Domain => CoordinateSpace::Pixel,
    };
    GradeError::CoordinateSpace {
        section,
        kind,
        index,
        expected,
        found,
    }
}

fn pixel_points(section: Section, points: &[Coord]) -> Result<Vec<Point2>, GradeError> {
    points
        .iter()
        .enumerate()
        .map(|(i, c)| c.pixel().ok_or_else(|| space_error(section, "point", i, CoordinateSpace::Pixel)))
        .collect()
}

fn domain_points(section: Section, points: &[Coord]) -> Result<Vec<PricePoint>, GradeError> {
    points
        .iter()
        .enumerate()
        .map(|(i, c)| c.domain().ok_or_else(|| space_error(section, "point", i, CoordinateSpace::Domain)))
        .collect()
}

fn pixel_lines(section: Section, lines: &[LineSpan]) -> Result<Vec<Segment>, GradeError> {
    lines
        .iter()
        .enumerate()
        .map(|(i, span)| match span {
            LineSpan::Pixel(segment) => Ok(*segment),
            LineSpan::Domain(_) => Err(space_error(section, "line", i, CoordinateSpace::Pixel)),
        })
        .collect()
}
