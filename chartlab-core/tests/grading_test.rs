//! End-to-end grading through `Grader`: every section kind, batch grading
//! and provider-backed grading.

use chartlab_core::domain::{Annotation, Candle, CandleSeries, Point2, PricePoint, Segment, Timeframe, TrendDirection};
use chartlab_core::grading::{AnswerKey, Described, GradingMode};
use chartlab_core::scoring::FibCreditPolicy;
use chartlab_core::{
    ExamType, GradeError, Grader, GradingConfig, GradingRequest, InMemoryProvider, ProviderError,
    Section,
};

const T0: i64 = 1_700_000_000;
const HOUR: i64 = 3_600;

/// Falls to a low at index 5, rises to a high at index 15, then eases off.
fn v_then_peak() -> CandleSeries {
    let mid = |i: usize| -> f64 {
        match i {
            0..=5 => 20.0 - 2.0 * i as f64,
            6..=15 => 10.0 + (i - 5) as f64,
            _ => 20.0 - (i - 15) as f64,
        }
    };
    CandleSeries::new(
        (0..21)
            .map(|i| {
                let p = mid(i);
                Candle::new(T0 + i as i64 * HOUR, p, p + 0.5, p - 0.5, p)
            })
            .collect(),
    )
    .unwrap()
}

fn fib_request(start: PricePoint, end: PricePoint) -> GradingRequest {
    GradingRequest::new(
        ExamType::FibonacciRetracement,
        Section::ImpulseWaves,
        Timeframe::Hour1,
        v_then_peak(),
    )
    .with_annotations(vec![Annotation::fibonacci(start, end, Vec::new())])
}

// ─── Fibonacci ──────────────────────────────────────────────────────

#[test]
fn fibonacci_exact_drawing_passes() {
    let request = fib_request(
        PricePoint::new(T0 + 5 * HOUR, 9.55),
        PricePoint::new(T0 + 15 * HOUR, 20.45),
    );
    let result = Grader::default().grade(&request).unwrap();

    assert_eq!(result.mode, GradingMode::Domain);
    assert_eq!(result.score, 2.0);
    assert_eq!(result.total_possible, 2.0);
    assert!(result.passed);

    let fib = result.details.fibonacci.as_ref().unwrap();
    let anchor = fib.anchor.unwrap();
    assert!(fib.direction_inferred);
    assert_eq!(anchor.direction, TrendDirection::Up);
    assert_eq!(anchor.start.index, 5);
    assert_eq!(anchor.end.index, 15);
    assert!((fib.price_tolerance - 0.11).abs() < 1e-9);
    assert_eq!(fib.time_tolerance_secs, 10_800.0);
    assert_eq!(result.details.match_count, 1);
}

#[test]
fn fibonacci_close_endpoints_earn_half_credit() {
    // both endpoints off by 0.2: beyond 1x (0.11) but within 2x (0.22)
    let request = fib_request(
        PricePoint::new(T0 + 5 * HOUR, 9.7),
        PricePoint::new(T0 + 15 * HOUR, 20.3),
    );
    let result = Grader::default().grade(&request).unwrap();
    assert_eq!(result.score, 1.0);
    assert!(!result.passed);
}

#[test]
fn fibonacci_wrong_direction_earns_nothing() {
    let request = fib_request(
        PricePoint::new(T0 + 15 * HOUR, 20.5),
        PricePoint::new(T0 + 5 * HOUR, 9.5),
    );
    let result = Grader::default().grade(&request).unwrap();
    assert_eq!(result.score, 0.0);
    assert_eq!(result.details.miss_count, 1);
    assert!(result.feedback.incorrect.iter().any(|m| m.starts_with("incorrect_direction")));
    assert!(result.feedback.incorrect.iter().any(|m| m.starts_with("missed_retracement")));
}

#[test]
fn fibonacci_requested_direction_without_leg() {
    let request = fib_request(
        PricePoint::new(T0 + 5 * HOUR, 9.5),
        PricePoint::new(T0 + 15 * HOUR, 20.5),
    )
    .with_direction(TrendDirection::Down);
    let result = Grader::default().grade(&request).unwrap();
    assert_eq!(result.score, 0.0);
    assert!(result.details.fibonacci.as_ref().unwrap().anchor.is_none());
}

#[test]
fn fibonacci_credit_policy_is_configurable() {
    let drawing = Annotation::fibonacci(
        PricePoint::new(T0 + 5 * HOUR, 9.5),
        PricePoint::new(T0 + 15 * HOUR, 20.5),
        Vec::new(),
    );
    let request = GradingRequest::new(
        ExamType::FibonacciRetracement,
        Section::RetracementLevels,
        Timeframe::Hour1,
        v_then_peak(),
    )
    .with_annotations(vec![drawing.clone(), drawing]);

    let accumulate = Grader::default().grade(&request).unwrap();
    assert_eq!(accumulate.score, 4.0);

    let mut config = GradingConfig::default();
    config.fibonacci.credit_policy = FibCreditPolicy::BestDrawing;
    let best = Grader::new(config).unwrap().grade(&request).unwrap();
    assert_eq!(best.score, 2.0);
}

// ─── Swing points ───────────────────────────────────────────────────

#[test]
fn domain_swing_points_with_false_positive() {
    let request = GradingRequest::new(
        ExamType::SwingAnalysis,
        Section::SwingPoints,
        Timeframe::Hour1,
        v_then_peak(),
    )
    .with_annotations(vec![
        Annotation::price_point(T0 + 15 * HOUR, 20.5),
        Annotation::price_point(T0 + 5 * HOUR, 9.5),
        Annotation::price_point(T0 + 10 * HOUR, 15.0),
    ]);

    let result = Grader::default().grade(&request).unwrap();
    assert_eq!(result.details.match_count, 2);
    assert_eq!(result.details.miss_count, 0);
    assert_eq!(result.details.false_positive_count, 1);
    // ratio 1.0 minus a 0.1 penalty
    assert_eq!(result.score, 9.0);
    assert!(result.passed);

    let swing = result.details.swing.as_ref().unwrap();
    assert_eq!(swing.earned_weight, 4.0);
    assert_eq!(swing.percentage, 100.0);
}

#[test]
fn pixel_swing_points_quote_descriptions() {
    let key = AnswerKey {
        swing_highs: vec![
            Described::new(Point2::new(150.0, 120.0), "Swing High 1"),
            Described::new(Point2::new(320.0, 95.0), "Swing High 2"),
        ],
        swing_lows: vec![
            Described::new(Point2::new(210.0, 80.0), "Swing Low 1"),
            Described::new(Point2::new(400.0, 65.0), "Swing Low 2"),
        ],
        tolerance: Some(15.0),
        ..AnswerKey::default()
    };
    let request = GradingRequest::new(
        ExamType::SwingAnalysis,
        Section::SwingPoints,
        Timeframe::Hour4,
        CandleSeries::default(),
    )
    .with_answer_key(key)
    .with_annotations(vec![
        Annotation::point(152.0, 118.0),
        Annotation::point(212.0, 83.0),
        Annotation::point(398.0, 66.0),
        Annotation::point(600.0, 10.0),
    ]);

    let result = Grader::default().grade(&request).unwrap();
    assert_eq!(result.mode, GradingMode::Pixel);
    assert_eq!(result.score, 30.0);
    assert_eq!(result.total_possible, 40.0);
    // pass mark is 70 of the 100-point scale
    assert!(!result.passed);
    assert_eq!(result.details.match_count, 3);
    assert_eq!(result.details.miss_count, 1);
    assert_eq!(result.details.false_positive_count, 1);
    assert!(result
        .feedback
        .correct
        .contains(&"Correct swing high identified at Swing High 1".to_string()));
    assert!(result
        .feedback
        .incorrect
        .contains(&"Missed swing high at Swing High 2".to_string()));
}

#[test]
fn pixel_score_is_capped() {
    let lines: Vec<Described<Segment>> = (0..10)
        .map(|i| Segment::new(0.0, i as f64 * 100.0, 300.0, i as f64 * 100.0).into())
        .collect();
    let annotations = (0..10)
        .map(|i| Annotation::line(0.0, i as f64 * 100.0, 300.0, i as f64 * 100.0))
        .collect();
    let request = GradingRequest::new(
        ExamType::SwingAnalysis,
        Section::EqualLevels,
        Timeframe::Day1,
        CandleSeries::default(),
    )
    .with_answer_key(AnswerKey {
        lines,
        ..AnswerKey::default()
    })
    .with_annotations(annotations);

    let result = Grader::default().grade(&request).unwrap();
    assert_eq!(result.details.match_count, 10);
    assert_eq!(result.score, 100.0);
    assert_eq!(result.total_possible, 100.0);
    assert!(result.passed);
}

// ─── Extreme timestamps ─────────────────────────────────────────────

#[test]
fn extreme_timestamps_grade_without_panicking() {
    let swing = GradingRequest::new(
        ExamType::SwingAnalysis,
        Section::SwingPoints,
        Timeframe::Hour1,
        v_then_peak(),
    )
    .with_annotations(vec![
        Annotation::price_point(i64::MIN, 9.5),
        Annotation::price_point(i64::MAX, 20.5),
    ]);
    let result = Grader::default().grade(&swing).unwrap();
    assert_eq!(result.score, 0.0);
    assert_eq!(result.details.match_count, 0);
    assert_eq!(result.details.false_positive_count, 2);

    let fib = fib_request(PricePoint::new(i64::MIN, 9.5), PricePoint::new(i64::MAX, 20.5));
    let result = Grader::default().grade(&fib).unwrap();
    assert_eq!(result.score, 0.0);
    let drawing = &result.details.fibonacci.as_ref().unwrap().drawings[0];
    assert!(drawing.direction_matches);
    assert_eq!(drawing.credit, 0.0);
}

// ─── Batch and provider ─────────────────────────────────────────────

#[test]
fn batch_keeps_request_order() {
    let good = fib_request(
        PricePoint::new(T0 + 5 * HOUR, 9.5),
        PricePoint::new(T0 + 15 * HOUR, 20.5),
    );
    let mismatched = GradingRequest::new(
        ExamType::GapAnalysis,
        Section::ImpulseWaves,
        Timeframe::Hour1,
        CandleSeries::default(),
    );
    let wrong = fib_request(
        PricePoint::new(T0 + 15 * HOUR, 20.5),
        PricePoint::new(T0 + 5 * HOUR, 9.5),
    );

    let results = Grader::default().grade_batch(&[good, mismatched, wrong]);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().score, 2.0);
    assert!(matches!(results[1], Err(GradeError::Exam(_))));
    assert_eq!(results[2].as_ref().unwrap().score, 0.0);
}

#[test]
fn batch_matches_sequential_grading() {
    let grader = Grader::default();
    let requests: Vec<GradingRequest> = (0..8)
        .map(|i| {
            fib_request(
                PricePoint::new(T0 + 5 * HOUR, 9.5 + 0.05 * i as f64),
                PricePoint::new(T0 + 15 * HOUR, 20.5),
            )
        })
        .collect();

    let parallel = grader.grade_batch(&requests);
    for (request, result) in requests.iter().zip(parallel) {
        assert_eq!(grader.grade(request).unwrap(), result.unwrap());
    }
}

#[test]
fn grades_with_candles_from_provider() {
    let provider = InMemoryProvider::new().with_series("XAUUSD", Timeframe::Hour1, v_then_peak());
    let request = GradingRequest::new(
        ExamType::FibonacciRetracement,
        Section::ImpulseWaves,
        Timeframe::Hour1,
        CandleSeries::default(),
    )
    .with_annotations(vec![Annotation::fibonacci(
        PricePoint::new(T0 + 5 * HOUR, 9.5),
        PricePoint::new(T0 + 15 * HOUR, 20.5),
        Vec::new(),
    )]);

    let grader = Grader::default();
    let result = grader.grade_from_provider(&provider, "xauusd", request.clone()).unwrap();
    assert_eq!(result.score, 2.0);

    let err = grader.grade_from_provider(&provider, "EURUSD", request).unwrap_err();
    assert!(matches!(err, GradeError::Provider(ProviderError::SymbolNotFound { .. })));
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = GradingConfig::default();
    config.pass_ratio = 0.0;
    assert!(Grader::new(config).is_err());
}
