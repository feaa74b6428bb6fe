//! Serializable grading configuration.
//!
//! Every section has defaults, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! pass_ratio = 0.8
//!
//! [detector]
//! lookback = 4
//!
//! [fibonacci]
//! credit_policy = "best_drawing"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::SwingDetector;
use crate::matching::{
    lines::{DEFAULT_ANGLE_TOLERANCE, DEFAULT_DISTANCE_TOLERANCE},
    points::DEFAULT_POINT_TOLERANCE,
    BoxRule, LineRule, MatchStrategy, PointRule, PricePointRule,
};
use crate::domain::Timeframe;
use crate::scoring::FibCreditPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config value: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Window of the minor pass. The major pass always uses 5.
    pub lookback: usize,
    pub significance_threshold: f64,
    pub include_minor: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            lookback: 3,
            significance_threshold: 0.05,
            include_minor: true,
        }
    }
}

impl DetectorConfig {
    pub fn detector(&self) -> SwingDetector {
        SwingDetector::new(self.lookback, self.significance_threshold).with_minor(self.include_minor)
    }
}

/// Pixel-space matcher tolerances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub point_tolerance: f64,
    pub angle_tolerance: f64,
    pub distance_tolerance: f64,
    pub overlap_threshold: f64,
    pub strategy: MatchStrategy,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            point_tolerance: DEFAULT_POINT_TOLERANCE,
            angle_tolerance: DEFAULT_ANGLE_TOLERANCE,
            distance_tolerance: DEFAULT_DISTANCE_TOLERANCE,
            overlap_threshold: BoxRule::default().overlap_threshold,
            strategy: MatchStrategy::Greedy,
        }
    }
}

impl MatcherConfig {
    /// An answer key's own tolerance wins over the configured one.
    pub fn point_rule(&self, override_tolerance: Option<f64>) -> PointRule {
        PointRule {
            tolerance: override_tolerance.unwrap_or(self.point_tolerance),
        }
    }

    pub fn line_rule(&self) -> LineRule {
        LineRule {
            angle_tolerance: self.angle_tolerance,
            distance_tolerance: self.distance_tolerance,
        }
    }

    pub fn box_rule(&self) -> BoxRule {
        BoxRule {
            overlap_threshold: self.overlap_threshold,
        }
    }
}

/// Domain-space swing point tolerances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwingToleranceConfig {
    pub price_tolerance_pct: f64,
    /// Multiplied by the candle interval of the chart.
    pub time_tolerance_bars: f64,
}

impl Default for SwingToleranceConfig {
    fn default() -> Self {
        Self {
            price_tolerance_pct: 0.005,
            time_tolerance_bars: 2.0,
        }
    }
}

impl SwingToleranceConfig {
    pub fn rule(&self, timeframe: Timeframe) -> PricePointRule {
        PricePointRule {
            price_tolerance_pct: self.price_tolerance_pct,
            time_tolerance_secs: self.time_tolerance_bars * timeframe.interval_secs() as f64,
        }
    }
}

/// Points awarded per matched answer-key shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    pub swing_point: f64,
    pub line: f64,
    pub r#box: f64,
    pub score_cap: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            swing_point: 10.0,
            line: 15.0,
            r#box: 20.0,
            score_cap: 100.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FibonacciConfig {
    pub credit_policy: FibCreditPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    pub pass_ratio: f64,
    pub detector: DetectorConfig,
    pub matcher: MatcherConfig,
    pub swing: SwingToleranceConfig,
    pub weights: WeightConfig,
    pub fibonacci: FibonacciConfig,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            pass_ratio: 0.70,
            detector: DetectorConfig::default(),
            matcher: MatcherConfig::default(),
            swing: SwingToleranceConfig::default(),
            weights: WeightConfig::default(),
            fibonacci: FibonacciConfig::default(),
        }
    }
}

impl GradingConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: GradingConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.detector.lookback == 0 {
            return Err(invalid("detector.lookback", "must be at least 1"));
        }
        if !(self.pass_ratio > 0.0 && self.pass_ratio <= 1.0) {
            return Err(invalid("pass_ratio", "must be in (0, 1]"));
        }

        let non_negative = [
            ("detector.significance_threshold", self.detector.significance_threshold),
            ("weights.swing_point", self.weights.swing_point),
            ("weights.line", self.weights.line),
            ("weights.box", self.weights.r#box),
            ("matcher.overlap_threshold", self.matcher.overlap_threshold),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must be a finite non-negative number"));
            }
        }

        let positive = [
            ("matcher.point_tolerance", self.matcher.point_tolerance),
            ("matcher.angle_tolerance", self.matcher.angle_tolerance),
            ("matcher.distance_tolerance", self.matcher.distance_tolerance),
            ("swing.price_tolerance_pct", self.swing.price_tolerance_pct),
            ("swing.time_tolerance_bars", self.swing.time_tolerance_bars),
            ("weights.score_cap", self.weights.score_cap),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, "must be a finite positive number"));
            }
        }

        if self.matcher.overlap_threshold > 1.0 {
            return Err(invalid("matcher.overlap_threshold", "must not exceed 1"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GradingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.detector.lookback, 3);
        assert_eq!(config.matcher.point_tolerance, 15.0);
        assert_eq!(config.weights.r#box, 20.0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = GradingConfig::from_toml(
            r#"
pass_ratio = 0.8

[detector]
lookback = 4

[fibonacci]
credit_policy = "best_drawing"
"#,
        )
        .unwrap();
        assert_eq!(config.pass_ratio, 0.8);
        assert_eq!(config.detector.lookback, 4);
        assert_eq!(config.detector.significance_threshold, 0.05);
        assert_eq!(config.fibonacci.credit_policy, FibCreditPolicy::BestDrawing);
        assert_eq!(config.matcher, MatcherConfig::default());
    }

    #[test]
    fn toml_round_trip() {
        let config = GradingConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(GradingConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = GradingConfig::from_toml("[detector]\nlookback = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "detector.lookback", .. }));

        let err = GradingConfig::from_toml("pass_ratio = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "pass_ratio", .. }));

        let err = GradingConfig::from_toml("[matcher]\npoint_tolerance = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "matcher.point_tolerance", .. }));
    }

    #[test]
    fn swing_time_tolerance_scales_with_interval() {
        let rule = SwingToleranceConfig::default().rule(Timeframe::Hour1);
        assert_eq!(rule.time_tolerance_secs, 7_200.0);
        let rule = SwingToleranceConfig::default().rule(Timeframe::Day1);
        assert_eq!(rule.time_tolerance_secs, 172_800.0);
    }
}
