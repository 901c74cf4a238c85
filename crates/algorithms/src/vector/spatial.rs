//! Spatial helpers: bounding boxes and representative centers

use geo::{BoundingRect, Centroid, Coord, Line, LineString};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Square box of half-width `radius` centered on `p`
    pub fn around(p: Coord<f64>, radius: f64) -> Self {
        Self::new(p.x - radius, p.y - radius, p.x + radius, p.y + radius)
    }

    /// Envelope of a segment
    pub fn of_segment(seg: &Line<f64>) -> Self {
        Self::new(
            seg.start.x.min(seg.end.x),
            seg.start.y.min(seg.end.y),
            seg.start.x.max(seg.end.x),
            seg.start.y.max(seg.end.y),
        )
    }

    /// Envelope of a polyline, `None` when it has no vertices
    pub fn of_line(line: &LineString<f64>) -> Option<Self> {
        line.bounding_rect().map(|rect| BoundingBox {
            min_x: rect.min().x,
            min_y: rect.min().y,
            max_x: rect.max().x,
            max_y: rect.max().y,
        })
    }

    /// Grow the box by `margin` on every side
    pub fn expand(&self, margin: f64) -> Self {
        Self::new(
            self.min_x - margin,
            self.min_y - margin,
            self.max_x + margin,
            self.max_y + margin,
        )
    }
}

/// Representative center of a polyline.
///
/// Length-weighted centroid; when that is undefined or not finite the
/// plain mean of the vertices is used instead.
pub fn line_center(line: &LineString<f64>) -> Option<Coord<f64>> {
    if let Some(c) = line.centroid() {
        if c.x().is_finite() && c.y().is_finite() {
            return Some(c.0);
        }
    }
    vertex_mean(line)
}

/// Arithmetic mean of the vertices
fn vertex_mean(line: &LineString<f64>) -> Option<Coord<f64>> {
    let n = line.0.len();
    if n == 0 {
        return None;
    }
    let (sx, sy) = line.0.iter().fold((0.0, 0.0), |(sx, sy), c| (sx + c.x, sy + c.y));
    Some(Coord { x: sx / n as f64, y: sy / n as f64 })
}
