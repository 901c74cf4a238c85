//! Geometric measurements: polyline length and polygon area

use geo::{Area as GeoArea, Coord, Euclidean, Length, LineString, MultiPolygon};

/// Euclidean length of a polyline given as vertices.
///
/// Fewer than two vertices measure zero.
pub fn polyline_length(points: &[Coord<f64>]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    LineString::from(points.to_vec()).length::<Euclidean>()
}

/// Distance travelled along `points` from the first vertex to each vertex.
///
/// `result[i]` is the path length up to `points[i]`; `result[0] == 0.0`.
pub fn cumulative_length(points: &[Coord<f64>]) -> Vec<f64> {
    let mut acc = 0.0;
    let mut out = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            let q = points[i - 1];
            acc += (p.x - q.x).hypot(p.y - q.y);
        }
        out.push(acc);
    }
    out
}

/// Unsigned area of a (multi)polygon in CRS units squared
pub fn area(geom: &MultiPolygon<f64>) -> f64 {
    geom.unsigned_area()
}
