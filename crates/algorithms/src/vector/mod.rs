//! Vector geometry helpers
//!
//! Planar operations the divide tracer builds on:
//! - Bounding boxes and representative centers
//! - Polyline length and polygon area
//! - Nearest point, distance and segment intersection over polylines

mod measurements;
mod ops;
mod spatial;

pub use measurements::{area, cumulative_length, polyline_length};
pub use ops::{
    angle_between, bearing, point_distance, GeometryOps, SegmentCrossing, COINCIDENT_TOLERANCE,
};
pub use spatial::{line_center, BoundingBox};
