//! Next-contour selection
//!
//! Candidates come from the search box around the current position, must be
//! unused and sit exactly one unit above the current elevation or on it.
//! The higher tier always wins when it has any eligible candidate. Inside a
//! tier the nearest connection wins, peaks before non-peaks on equal
//! distance, first examined on a full tie.

use geo::Coord;
use std::collections::HashSet;

use super::params::WalkParams;
use super::same_level;
use crate::contour::{is_real_peak, Contour, ContourId, Topography};
use crate::vector::{point_distance, BoundingBox, GeometryOps};

/// How the walk attaches to a candidate contour
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Connection {
    /// Through the center of a peak ring, followed by a crest exit
    PeakCenter(Coord<f64>),
    /// At the nearest point of the contour
    Nearest(Coord<f64>),
}

impl Connection {
    pub(crate) fn is_peak(&self) -> bool {
        matches!(self, Connection::PeakCenter(_))
    }
}

/// Selected next step
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate<'a> {
    pub contour: &'a Contour,
    pub distance: f64,
    pub connection: Connection,
}

fn evaluate<'a>(
    contour: &'a Contour,
    from: Coord<f64>,
    radius: f64,
    topo: &Topography,
    params: &WalkParams,
) -> Option<Candidate<'a>> {
    let nearest = contour.geometry().nearest_point(from)?;
    let d_nearest = point_distance(from, nearest);
    if d_nearest > radius {
        return None;
    }

    let on_nearest = Candidate {
        contour,
        distance: d_nearest,
        connection: Connection::Nearest(nearest),
    };

    if !is_real_peak(contour, topo, params.peak_search_radius, params.closed_tolerance) {
        return Some(on_nearest);
    }

    // a peak whose center is out of reach is joined like any other contour
    match contour.geometry().center() {
        Some(center) if point_distance(from, center) <= radius => Some(Candidate {
            contour,
            distance: point_distance(from, center),
            connection: Connection::PeakCenter(center),
        }),
        _ => Some(on_nearest),
    }
}

/// Best next contour from `from`, or `None` when neither tier has one.
pub(crate) fn find_next_contour<'a>(
    from: Coord<f64>,
    topo: &'a Topography,
    used: &HashSet<ContourId>,
    elevation: f64,
    radius: f64,
    params: &WalkParams,
) -> Option<Candidate<'a>> {
    let pool: Vec<&Contour> = topo
        .query(&BoundingBox::around(from, radius))
        .filter(|c| !used.contains(&c.id()))
        .collect();

    for target in [elevation + 1.0, elevation] {
        let best = pool
            .iter()
            .filter(|c| same_level(c.elevation(), target))
            .filter_map(|c| evaluate(c, from, radius, topo, params))
            .min_by(|a, b| {
                a.distance
                    .partial_cmp(&b.distance)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(b.connection.is_peak().cmp(&a.connection.is_peak()))
            });

        if best.is_some() {
            return best;
        }
    }

    None
}
