//! Closing two divide lines into a watershed polygon

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, BooleanOps, Coord, Line, LineString, MultiPolygon, Polygon};
use tracing::debug;

use crate::vector::area;

/// Closed watershed outline
#[derive(Debug, Clone, PartialEq)]
pub struct WatershedPolygon {
    geometry: MultiPolygon<f64>,
    repaired: bool,
}

impl WatershedPolygon {
    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    pub fn into_geometry(self) -> MultiPolygon<f64> {
        self.geometry
    }

    /// Whether the ring self-intersected and had to be rebuilt
    pub fn repaired(&self) -> bool {
        self.repaired
    }

    /// Planar area in squared map units
    pub fn area(&self) -> f64 {
        area(&self.geometry)
    }
}

/// Whether a closed ring has no self-intersections.
///
/// Adjacent segments may only share their common vertex; any other pair
/// must not touch at all.
fn is_simple_ring(ring: &LineString<f64>) -> bool {
    let segments: Vec<Line<f64>> = ring.lines().collect();
    let n = segments.len();

    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(segments[i], segments[j]) {
                None => {}
                Some(LineIntersection::Collinear { .. }) => return false,
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(LineIntersection::SinglePoint { .. }) => return false,
            }
        }
    }
    true
}

/// Assemble the watershed from line 1 followed by line 2 reversed.
///
/// Needs two lines of at least two points and a ring of at least three
/// distinct points. A self-intersecting ring is repaired by a boolean
/// union with itself; zero-area parts are dropped and an empty result
/// means no polygon.
pub fn build_watershed_polygon(a: &[Coord<f64>], b: &[Coord<f64>]) -> Option<WatershedPolygon> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }

    let mut ring: Vec<Coord<f64>> = a.iter().chain(b.iter().rev()).copied().collect();
    ring.dedup();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    if ring.len() < 3 {
        return None;
    }

    let polygon = Polygon::new(LineString::from(ring), vec![]);
    if is_simple_ring(polygon.exterior()) && polygon.unsigned_area() > 0.0 {
        return Some(WatershedPolygon {
            geometry: MultiPolygon::new(vec![polygon]),
            repaired: false,
        });
    }

    debug!("watershed ring is not simple, repairing");
    let repaired = MultiPolygon::new(vec![polygon]).union(&MultiPolygon::new(vec![]));
    let parts: Vec<Polygon<f64>> = repaired
        .into_iter()
        .filter(|p| p.unsigned_area() > 0.0)
        .collect();
    if parts.is_empty() {
        return None;
    }

    Some(WatershedPolygon {
        geometry: MultiPolygon::new(parts),
        repaired: true,
    })
}
