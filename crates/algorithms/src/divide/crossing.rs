//! Crossing checks applied to every proposed step

use geo::{Coord, Line, LineString};
use std::collections::HashSet;

use super::params::WalkParams;
use crate::contour::{ContourId, Topography};
use crate::vector::{point_distance, BoundingBox, GeometryOps, SegmentCrossing, COINCIDENT_TOLERANCE};

fn first_crossing(
    path: &LineString<f64>,
    seg: &Line<f64>,
    skip_start: bool,
    overlap_anchor: Coord<f64>,
) -> Option<Coord<f64>> {
    let crossings: Vec<SegmentCrossing> = path
        .segment_crossings(seg)
        .into_iter()
        .filter(|hit| match hit {
            SegmentCrossing::Point(p) => !skip_start || point_distance(*p, seg.start) > COINCIDENT_TOLERANCE,
            SegmentCrossing::Overlap(_) => true,
        })
        .collect();

    if crossings.is_empty() {
        return None;
    }

    let nearest = crossings
        .iter()
        .filter_map(SegmentCrossing::as_point)
        .min_by(|a, b| {
            point_distance(seg.start, *a)
                .partial_cmp(&point_distance(seg.start, *b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    // only collinear overlaps: fall back to the path point nearest the anchor
    nearest.or_else(|| path.nearest_point(overlap_anchor))
}

/// Where the step `from -> to` crosses the sibling line, if it does
pub(crate) fn sibling_crossing(from: Coord<f64>, to: Coord<f64>, sibling: &[Coord<f64>]) -> Option<Coord<f64>> {
    if sibling.len() < 2 {
        return None;
    }
    let path = LineString::from(sibling.to_vec());
    first_crossing(&path, &Line::new(from, to), false, to)
}

/// Where the step from the last point to `to` crosses the line's own earlier path.
///
/// The step starts at the last point and the earlier path ends at the one
/// before it, so touching at the step origin does not count.
pub(crate) fn self_crossing(points: &[Coord<f64>], to: Coord<f64>) -> Option<Coord<f64>> {
    if points.len() < 3 {
        return None;
    }
    let last = points[points.len() - 1];
    let earlier = LineString::from(points[..points.len() - 1].to_vec());
    first_crossing(&earlier, &Line::new(last, to), true, last)
}

/// Unused contours near the current elevation that the step crosses
pub(crate) fn count_crossings(
    from: Coord<f64>,
    to: Coord<f64>,
    topo: &Topography,
    used: &HashSet<ContourId>,
    elevation: f64,
    params: &WalkParams,
) -> usize {
    let seg = Line::new(from, to);
    topo.query(&BoundingBox::of_segment(&seg).expand(params.crossing_margin))
        .filter(|c| !used.contains(&c.id()))
        .filter(|c| (c.elevation() - elevation).abs() <= params.crossing_band)
        .filter(|c| c.geometry().intersects_segment(&seg))
        .count()
}
