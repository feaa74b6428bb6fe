//! Domain types for ChartLab: candles, timeframes, annotations, swing features.

pub mod annotation;
pub mod candle;
pub mod geometry;
pub mod swing;
pub mod timeframe;

pub use annotation::{
    Annotation, AnnotationBuckets, Coord, FibonacciAnnotation, LineAnnotation, LineSpan,
    PointAnnotation, PricePoint, PriceSegment,
};
pub use candle::{Candle, CandleSeries, SeriesError};
pub use geometry::{angle_diff_deg, Point2, Rect, Segment};
pub use swing::{Significance, SwingKind, SwingPoint, SwingPoints, TrendAnchor, TrendDirection};
pub use timeframe::{Timeframe, TimeframeError};
