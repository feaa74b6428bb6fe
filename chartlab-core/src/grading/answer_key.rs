//! Pixel-space answer keys: expected shapes with a human description.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use crate::domain::{Point2, Rect, Segment};

/// An expected shape plus the label quoted back in feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Described<T> {
    #[serde(flatten)]
    pub shape: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl<T> Described<T> {
    pub fn new(shape: T, description: impl Into<String>) -> Self {
        Self {
            shape,
            description: Some(description.into()),
        }
    }

    pub fn label(&self, fallback: &'static str) -> &str {
        self.description.as_deref().unwrap_or(fallback)
    }
}

impl<T> Borrow<T> for Described<T> {
    fn borrow(&self) -> &T {
        &self.shape
    }
}

impl<T> From<T> for Described<T> {
    fn from(shape: T) -> Self {
        Self {
            shape,
            description: None,
        }
    }
}

/// Hand-authored expected shapes for one chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerKey {
    pub swing_highs: Vec<Described<Point2>>,
    pub swing_lows: Vec<Described<Point2>>,
    pub lines: Vec<Described<Segment>>,
    pub boxes: Vec<Described<Rect>>,
    /// Point tolerance in pixels; the configured one applies when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
}

impl AnswerKey {
    pub fn is_empty(&self) -> bool {
        self.swing_highs.is_empty()
            && self.swing_lows.is_empty()
            && self.lines.is_empty()
            && self.boxes.is_empty()
    }
}
