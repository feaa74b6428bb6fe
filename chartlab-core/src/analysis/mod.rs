//! Ground-truth feature extraction from a candle series.
//!
//! Detection is a pure function of (series, parameters): nothing here holds
//! state between calls or mutates the series.

pub mod anchors;
pub mod swing_detector;

pub use anchors::{select_anchor, select_latest_anchor};
pub use swing_detector::{detect_swing_points, SwingDetector, MAJOR_LOOKBACK};
