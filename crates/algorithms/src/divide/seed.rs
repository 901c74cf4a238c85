//! Starting elevation of a walk
//!
//! The seed point usually sits between two contours. The walk starts one
//! unit above the lower of the two nearest ones when the point is closest
//! to that lower contour, otherwise on the nearest contour's elevation.

use geo::Coord;
use std::collections::HashSet;

use super::params::WalkParams;
use super::same_level;
use crate::contour::{ContourId, Topography};
use crate::vector::{BoundingBox, GeometryOps};

/// Starting elevation for a walk seeded at `point`.
///
/// Contours in `exclude` are ignored (an auxiliary continuation must not
/// re-seed on contours its line already consumed). `None` when no contour
/// lies in the seed box.
pub(crate) fn seed_elevation(
    point: Coord<f64>,
    topo: &Topography,
    exclude: &HashSet<ContourId>,
    params: &WalkParams,
) -> Option<f64> {
    let nearby: Vec<(f64, f64)> = topo
        .query(&BoundingBox::around(point, params.seed_radius))
        .filter(|c| !exclude.contains(&c.id()))
        .map(|c| (c.geometry().distance_to(point), c.elevation()))
        .collect();

    let d_min = nearby.iter().map(|&(d, _)| d).fold(f64::INFINITY, f64::min);
    if !d_min.is_finite() {
        return None;
    }

    let mut band: Vec<(f64, f64)> = nearby
        .into_iter()
        .filter(|&(d, _)| d <= d_min + params.seed_tolerance)
        .collect();
    band.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let (_, closest) = band[0];
    let lower = match band.get(1) {
        Some(&(_, second)) => closest.min(second),
        None => closest,
    };

    Some(if same_level(closest, lower) { lower + 1.0 } else { closest })
}
