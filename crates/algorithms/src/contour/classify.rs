//! Closed-curve and peak classification
//!
//! A contour is a *real peak* when it is a closed ring and no higher
//! contour nests inside it. A ring that encloses higher ground is only a
//! bench on a slope, not a summit.

use geo::{Contains, LineString, Point, Polygon};

use super::store::Contour;
use super::topography::Topography;
use crate::vector::{point_distance, GeometryOps};

/// Default endpoint gap under which a contour counts as closed
pub const CLOSED_TOLERANCE: f64 = 2.0;

/// Default neighborhood searched for nested higher contours
pub const PEAK_SEARCH_RADIUS: f64 = 250.0;

/// Whether a polyline closes on itself.
///
/// Needs at least 3 vertices and a first-to-last gap below `tolerance`;
/// a zero-length line is never closed.
pub fn is_closed(line: &LineString<f64>, tolerance: f64) -> bool {
    if line.path_length() == 0.0 {
        return false;
    }
    let coords = &line.0;
    if coords.len() < 3 {
        return false;
    }
    point_distance(coords[0], coords[coords.len() - 1]) < tolerance
}

/// Peak test without touching the cache.
///
/// Looks for contours higher than `contour` whose envelope falls within
/// `search_radius` of the ring's envelope and whose center lies inside
/// the ring.
pub fn classify_peak(
    contour: &Contour,
    topo: &Topography,
    search_radius: f64,
    closed_tolerance: f64,
) -> bool {
    let line = contour.geometry();
    if !is_closed(line, closed_tolerance) {
        return false;
    }

    let ring = Polygon::new(line.clone(), vec![]);
    let neighborhood = contour.bbox().expand(search_radius);

    !topo
        .query(&neighborhood)
        .filter(|other| other.elevation() > contour.elevation())
        .filter_map(|other| other.geometry().center())
        .any(|center| ring.contains(&Point::from(center)))
}

/// Cached peak test.
///
/// The first call runs [`classify_peak`] and stores the answer on the
/// contour; later calls return the stored answer without searching again.
pub fn is_real_peak(
    contour: &Contour,
    topo: &Topography,
    search_radius: f64,
    closed_tolerance: f64,
) -> bool {
    if let Some(known) = contour.peak_status().known() {
        return known;
    }
    let is_peak = classify_peak(contour, topo, search_radius, closed_tolerance);
    contour.cache_peak(is_peak);
    is_peak
}
