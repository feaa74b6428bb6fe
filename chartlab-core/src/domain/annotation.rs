//! User annotations as they arrive from the drawing tools.
//!
//! Every annotation carries a `type` discriminator. Points, lines and
//! Fibonacci endpoints may be given either in pixel space (`x`/`y`) or in
//! domain space (`time`/`price`); which one a grader accepts depends on the
//! grading mode. Boxes are pixel-only.

use serde::{Deserialize, Serialize};

use super::geometry::{Point2, Rect, Segment};

/// A point in chart domain space: Unix seconds and price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub time: i64,
    pub price: f64,
}

impl PricePoint {
    pub fn new(time: i64, price: f64) -> Self {
        Self { time, price }
    }
}

/// A location given in either coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coord {
    Pixel(Point2),
    Domain(PricePoint),
}

impl Coord {
    pub fn pixel(&self) -> Option<Point2> {
        match self {
            Coord::Pixel(p) => Some(*p),
            Coord::Domain(_) => None,
        }
    }

    pub fn domain(&self) -> Option<PricePoint> {
        match self {
            Coord::Domain(p) => Some(*p),
            Coord::Pixel(_) => None,
        }
    }
}

/// A line segment given by its endpoints in domain space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSegment {
    pub time1: i64,
    pub price1: f64,
    pub time2: i64,
    pub price2: f64,
}

/// Lines are only graded in pixel space. A domain-space line still parses so
/// the grader can reject it with a coordinate-space error instead of a
/// shape error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineSpan {
    Pixel(Segment),
    Domain(PriceSegment),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointAnnotation {
    #[serde(flatten)]
    pub at: Coord,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineAnnotation {
    #[serde(flatten)]
    pub span: LineSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibonacciAnnotation {
    pub start: Coord,
    pub end: Coord,
    #[serde(default)]
    pub levels: Vec<f64>,
}

/// One user drawing, tagged by tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    Point(PointAnnotation),
    Line(LineAnnotation),
    Box(Rect),
    Fibonacci(FibonacciAnnotation),
}

impl Annotation {
    pub fn point(x: f64, y: f64) -> Self {
        Annotation::Point(PointAnnotation {
            at: Coord::Pixel(Point2::new(x, y)),
        })
    }

    pub fn price_point(time: i64, price: f64) -> Self {
        Annotation::Point(PointAnnotation {
            at: Coord::Domain(PricePoint::new(time, price)),
        })
    }

    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Annotation::Line(LineAnnotation {
            span: LineSpan::Pixel(Segment::new(x1, y1, x2, y2)),
        })
    }

    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Annotation::Box(Rect::new(x, y, width, height))
    }

    pub fn fibonacci(start: PricePoint, end: PricePoint, levels: Vec<f64>) -> Self {
        Annotation::Fibonacci(FibonacciAnnotation {
            start: Coord::Domain(start),
            end: Coord::Domain(end),
            levels,
        })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Annotation::Point(_) => "point",
            Annotation::Line(_) => "line",
            Annotation::Box(_) => "box",
            Annotation::Fibonacci(_) => "fibonacci",
        }
    }
}

/// Annotations split by tool, preserving submission order within each bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationBuckets {
    pub points: Vec<Coord>,
    pub lines: Vec<LineSpan>,
    pub boxes: Vec<Rect>,
    pub fibonacci: Vec<FibonacciAnnotation>,
}

impl AnnotationBuckets {
    pub fn classify(annotations: &[Annotation]) -> Self {
        let mut buckets = Self::default();
        for annotation in annotations {
            match annotation {
                Annotation::Point(p) => buckets.points.push(p.at),
                Annotation::Line(l) => buckets.lines.push(l.span),
                Annotation::Box(r) => buckets.boxes.push(*r),
                Annotation::Fibonacci(f) => buckets.fibonacci.push(f.clone()),
            }
        }
        buckets
    }
}
