//! Crest exit from a peak ring
//!
//! After passing through a peak center the walk leaves the summit at one
//! of the ring's vertices. Samples are scored on three terms: keeping the
//! general heading, avoiding flanks that drop away, and closeness to the
//! next higher ground.

use geo::Coord;

use super::params::WalkParams;
use crate::contour::{Contour, Topography};
use crate::vector::{angle_between, bearing, BoundingBox, GeometryOps};

const DIRECTION_WEIGHT: f64 = 2.0;
const ALTITUDE_WEIGHT: f64 = 1.0;
const PROXIMITY_WEIGHT: f64 = 2.5;

/// Score of heading from `origin` to `candidate` against `direction`, in `[0, 100]`
pub(crate) fn direction_score(origin: Coord<f64>, candidate: Coord<f64>, direction: Option<f64>) -> f64 {
    let Some(direction) = direction else {
        return 50.0;
    };
    match bearing(origin, candidate) {
        Some(heading) => 100.0 * (1.0 - angle_between(heading, direction) / std::f64::consts::PI),
        None => 0.0,
    }
}

/// Contours below `reference` within `radius` of `point`
pub(crate) fn count_lower(point: Coord<f64>, topo: &Topography, reference: f64, radius: f64) -> usize {
    topo.query(&BoundingBox::around(point, radius))
        .filter(|c| c.elevation() < reference)
        .filter(|c| c.geometry().distance_to(point) <= radius)
        .count()
}

/// Pick the vertex of `peak` through which the walk leaves the summit.
///
/// `neighbours` are the candidate contours around the peak; only those
/// higher than the peak feed the proximity term. Returns `center` when
/// the ring is too short to sample.
pub(crate) fn crest_exit(
    center: Coord<f64>,
    peak: &Contour,
    direction: Option<f64>,
    topo: &Topography,
    neighbours: &[&Contour],
    params: &WalkParams,
) -> Coord<f64> {
    let coords = &peak.geometry().0;
    if coords.len() < 3 {
        return center;
    }

    let step = (coords.len() / params.crest_samples.max(1)).max(1);
    let mut best: Option<(f64, Coord<f64>)> = None;

    for &pt in coords.iter().step_by(step) {
        let dir = direction_score(center, pt, direction);
        let lower = count_lower(pt, topo, peak.elevation(), params.lower_contour_radius);
        let alt = -10.0 * lower as f64;

        let d_next = neighbours
            .iter()
            .filter(|n| n.elevation() > peak.elevation())
            .map(|n| n.geometry().distance_to(pt))
            .fold(f64::INFINITY, f64::min);
        let prox = if d_next.is_finite() {
            100.0 / (1.0 + d_next / 10.0)
        } else {
            0.0
        };

        let total = DIRECTION_WEIGHT * dir + ALTITUDE_WEIGHT * alt + PROXIMITY_WEIGHT * prox;
        if best.map_or(true, |(score, _)| total > score) {
            best = Some((total, pt));
        }
    }

    best.map_or(center, |(_, pt)| pt)
}
