//! Trimming two divide lines at their first mutual crossing

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line};
use tracing::debug;

use crate::vector::{cumulative_length, point_distance};

struct Crossing {
    point: Coord<f64>,
    i: usize,
    j: usize,
    score: f64,
}

/// Cut `a` and `b` at the crossing closest to both of their starts.
///
/// Candidates are the proper point intersections between any segment of
/// `a` and any segment of `b`; the winner minimizes the sum of the path
/// distances from each line's start to the crossing (first found on a
/// tie). Both trimmed lines end at the crossing. Without a crossing, or
/// with a line shorter than two points, the inputs come back unchanged.
pub fn trim_at_crossing(
    a: &[Coord<f64>],
    b: &[Coord<f64>],
) -> (Vec<Coord<f64>>, Vec<Coord<f64>>, Option<Coord<f64>>) {
    if a.len() < 2 || b.len() < 2 {
        return (a.to_vec(), b.to_vec(), None);
    }

    let along_a = cumulative_length(a);
    let along_b = cumulative_length(b);
    let mut best: Option<Crossing> = None;

    for (i, sa) in a.windows(2).enumerate() {
        let seg_a = Line::new(sa[0], sa[1]);
        for (j, sb) in b.windows(2).enumerate() {
            let seg_b = Line::new(sb[0], sb[1]);
            let Some(LineIntersection::SinglePoint { intersection, .. }) = line_intersection(seg_a, seg_b) else {
                continue;
            };
            let score = along_a[i] + point_distance(sa[0], intersection) + along_b[j]
                + point_distance(sb[0], intersection);
            if best.as_ref().map_or(true, |c| score < c.score) {
                best = Some(Crossing {
                    point: intersection,
                    i,
                    j,
                    score,
                });
            }
        }
    }

    let Some(crossing) = best else {
        return (a.to_vec(), b.to_vec(), None);
    };

    debug!(
        x = crossing.point.x,
        y = crossing.point.y,
        segment_a = crossing.i,
        segment_b = crossing.j,
        "lines trimmed at crossing"
    );

    let mut trimmed_a = a[..=crossing.i].to_vec();
    trimmed_a.push(crossing.point);
    let mut trimmed_b = b[..=crossing.j].to_vec();
    trimmed_b.push(crossing.point);
    (trimmed_a, trimmed_b, Some(crossing.point))
}
