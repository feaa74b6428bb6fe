//! ChartLab Core: grading engine for chart-annotation exams.
//!
//! This crate turns a candle series and a learner's drawings into a score:
//! - Domain types (candles, timeframes, annotations, swing points, trend anchors)
//! - Swing point detection with significance filtering and trend-leg selection
//! - Tolerance-based greedy matching for points, lines and boxes
//! - Partial-credit Fibonacci retracement scoring
//! - Exam catalog and the stateless [`Grader`] that dispatches per section
//!
//! Nothing here performs I/O beyond reading a config file. Candles come from
//! the caller or from a [`CandleProvider`] it injects.

pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod feedback;
pub mod grading;
pub mod matching;
pub mod scoring;

pub use config::{ConfigError, GradingConfig};
pub use data::{CandleProvider, InMemoryProvider, ProviderError};
pub use feedback::Feedback;
pub use grading::{
    ExamType, GradeError, Grader, GradingMode, GradingRequest, GradingResult, Section,
};
