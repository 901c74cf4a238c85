//! Planar geometry capabilities used by the divide tracer.
//!
//! The tracer only needs a handful of operations on polylines: nearest
//! point, distance, segment intersection, representative center, envelope
//! and length. They are collected in [`GeometryOps`] and implemented for
//! `geo::LineString`, delegating to `geo` wherever it has the primitive.

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Closest, ClosestPoint, Coord, Intersects, Line, LineString, Point};

use super::measurements::polyline_length;
use super::spatial::{line_center, BoundingBox};

/// Tolerance under which two positions are treated as the same point.
pub const COINCIDENT_TOLERANCE: f64 = 1e-9;

/// Where a segment meets a polyline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentCrossing {
    /// The segment touches or crosses the polyline at a single point
    Point(Coord<f64>),
    /// The segment runs along part of the polyline
    Overlap(Line<f64>),
}

impl SegmentCrossing {
    pub fn as_point(&self) -> Option<Coord<f64>> {
        match self {
            SegmentCrossing::Point(p) => Some(*p),
            SegmentCrossing::Overlap(_) => None,
        }
    }
}

/// Euclidean distance between two positions
pub fn point_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Bearing from `from` to `to` in radians (`atan2` convention).
///
/// `None` when both positions coincide.
pub fn bearing(from: Coord<f64>, to: Coord<f64>) -> Option<f64> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    Some(dy.atan2(dx))
}

/// Absolute angular difference folded into `[0, PI]`
pub fn angle_between(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs();
    if diff > std::f64::consts::PI {
        2.0 * std::f64::consts::PI - diff
    } else {
        diff
    }
}

/// Geometry capability interface of the tracer
pub trait GeometryOps {
    /// Nearest position on the geometry to `p`
    fn nearest_point(&self, p: Coord<f64>) -> Option<Coord<f64>>;

    /// Distance from `p` to the geometry, infinite for empty geometries
    fn distance_to(&self, p: Coord<f64>) -> f64 {
        self.nearest_point(p)
            .map(|q| point_distance(p, q))
            .unwrap_or(f64::INFINITY)
    }

    /// Whether a segment touches the geometry anywhere
    fn intersects_segment(&self, seg: &Line<f64>) -> bool;

    /// Every place where a segment meets the geometry
    fn segment_crossings(&self, seg: &Line<f64>) -> Vec<SegmentCrossing>;

    /// Representative center
    fn center(&self) -> Option<Coord<f64>>;

    /// Axis-aligned envelope
    fn bbox(&self) -> Option<BoundingBox>;

    /// Euclidean length
    fn path_length(&self) -> f64;
}

impl GeometryOps for LineString<f64> {
    fn nearest_point(&self, p: Coord<f64>) -> Option<Coord<f64>> {
        match self.closest_point(&Point::from(p)) {
            Closest::Intersection(q) | Closest::SinglePoint(q) => Some(q.0),
            // no usable segment (single vertex or all zero-length): nearest vertex
            Closest::Indeterminate => self
                .0
                .iter()
                .copied()
                .min_by(|a, b| {
                    point_distance(p, *a)
                        .partial_cmp(&point_distance(p, *b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                }),
        }
    }

    fn intersects_segment(&self, seg: &Line<f64>) -> bool {
        if self.0.len() == 1 {
            return seg.intersects(&Point::from(self.0[0]));
        }
        self.intersects(seg)
    }

    fn segment_crossings(&self, seg: &Line<f64>) -> Vec<SegmentCrossing> {
        if seg.start == seg.end {
            return if self.distance_to(seg.start) < COINCIDENT_TOLERANCE {
                vec![SegmentCrossing::Point(seg.start)]
            } else {
                Vec::new()
            };
        }

        self.lines()
            .filter_map(|part| line_intersection(*seg, part))
            .map(|hit| match hit {
                LineIntersection::SinglePoint { intersection, .. } => {
                    SegmentCrossing::Point(intersection)
                }
                LineIntersection::Collinear { intersection } => {
                    SegmentCrossing::Overlap(intersection)
                }
            })
            .collect()
    }

    fn center(&self) -> Option<Coord<f64>> {
        line_center(self)
    }

    fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::of_line(self)
    }

    fn path_length(&self) -> f64 {
        polyline_length(&self.0)
    }
}
