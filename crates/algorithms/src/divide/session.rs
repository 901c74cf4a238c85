//! Delineation session
//!
//! Holds everything one watershed needs between edits: the two start
//! points, the auxiliary points and direct connections added so far, and
//! the two traced lines. A [`WatershedRecord`] is the persisted form; a
//! session can be rebuilt from it with [`DivideSession::replay`].

use geo::{Coord, Line, LineString};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use ridgeline_core::{Algorithm, Error, Result};

use super::params::DivideParams;
use super::polygon::{build_watershed_polygon, WatershedPolygon};
use super::trim::trim_at_crossing;
use super::walker::{continue_from_auxiliary, trace_from_point, TracedLine};
use crate::contour::Topography;
use crate::vector::{point_distance, GeometryOps};

/// A clicked point joined straight to the nearest line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectConnection {
    pub click: Coord<f64>,
    /// Projection of the click onto the line
    pub on_line: Coord<f64>,
    /// Index of the connected line (0 or 1)
    pub line: usize,
}

/// Persisted inputs of a delineation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatershedRecord {
    pub start_points: [Coord<f64>; 2],
    #[serde(default)]
    pub auxiliaries: Vec<Coord<f64>>,
    #[serde(default)]
    pub connections: Vec<DirectConnection>,
    /// Polygon area truncated to whole square units
    pub area_m2: Option<i64>,
}

/// Two divide lines under construction
#[derive(Debug, Clone)]
pub struct DivideSession {
    start_points: [Coord<f64>; 2],
    auxiliaries: Vec<Coord<f64>>,
    connections: Vec<DirectConnection>,
    lines: [TracedLine; 2],
    crossing: Option<Coord<f64>>,
    params: DivideParams,
}

impl DivideSession {
    /// Trace both lines from `starts`, trim them at their first crossing
    /// and apply `auxiliaries` in order.
    pub fn trace(
        topo: &Topography,
        starts: &[Coord<f64>],
        auxiliaries: &[Coord<f64>],
        params: DivideParams,
    ) -> Result<Self> {
        if starts.len() < 2 {
            return Err(Error::InsufficientStartPoints(starts.len()));
        }
        let (p1, p2) = (starts[0], starts[1]);
        topo.ensure_loaded()?;

        // the pair is traced independently, neither sees the other
        let mut line1 = trace_from_point(p1, topo, 1, None, params.fresh());
        let mut line2 = trace_from_point(p2, topo, 2, None, params.fresh());
        info!(
            line1_points = line1.point_count(),
            line1_reason = %line1.termination,
            line2_points = line2.point_count(),
            line2_reason = %line2.termination,
            "divide lines traced"
        );

        let (trimmed1, trimmed2, crossing) = trim_at_crossing(&line1.points, &line2.points);
        if crossing.is_some() {
            info!(
                line1_before = line1.point_count(),
                line1_after = trimmed1.len(),
                line2_before = line2.point_count(),
                line2_after = trimmed2.len(),
                "lines trimmed at their crossing"
            );
            for (line, trimmed) in [(&mut line1, trimmed1), (&mut line2, trimmed2)] {
                if let Some(&last) = trimmed.last() {
                    line.final_point = last;
                }
                line.points = trimmed;
            }
        } else {
            warn!("divide lines do not cross");
        }

        let mut session = Self {
            start_points: [p1, p2],
            auxiliaries: Vec::new(),
            connections: Vec::new(),
            lines: [line1, line2],
            crossing,
            params,
        };
        for &aux in auxiliaries {
            session.add_auxiliary(topo, aux);
        }
        Ok(session)
    }

    /// Rebuild a persisted delineation.
    ///
    /// Auxiliaries are replayed first, then the direct connections.
    pub fn replay(topo: &Topography, record: &WatershedRecord, params: DivideParams) -> Result<Self> {
        let mut session = Self::trace(topo, &record.start_points, &record.auxiliaries, params)?;
        for connection in &record.connections {
            session.add_direct_connection(connection.click);
        }
        Ok(session)
    }

    /// Extend the line whose end is nearest to `point` from there.
    ///
    /// Returns the index of the extended line, or `None` when neither line
    /// has two points yet.
    pub fn add_auxiliary(&mut self, topo: &Topography, point: Coord<f64>) -> Option<usize> {
        self.auxiliaries.push(point);

        let idx = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.points.len() >= 2)
            .map(|(i, line)| (i, point_distance(line.final_point, point)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)?;

        let pending: Vec<Coord<f64>> = self
            .connections
            .iter()
            .filter(|c| c.line == idx)
            .map(|c| c.click)
            .collect();

        let params = self.params.auxiliary();
        let [first, second] = &mut self.lines;
        let (line, sibling) = if idx == 0 { (first, second) } else { (second, first) };

        for click in pending {
            if !line.points.contains(&click) {
                line.points.push(click);
            }
        }
        line.points.push(point);

        let cont = continue_from_auxiliary(
            point,
            topo,
            line.elevation_end,
            &line.used_contours,
            Some(sibling.points.as_slice()),
            &params,
        );

        if cont.points.len() > 1 {
            line.points.extend_from_slice(&cont.points[1..]);
            line.elevation_end = cont.elevation_end;
            line.termination = cont.termination;
            line.final_point = cont.points[cont.points.len() - 1];
            line.peaks += cont.peaks;
            line.iterations += cont.iterations;
            line.used_contours.extend(cont.used_contours);
            line.auxiliary_jump = true;
            info!(
                line = line.number,
                elevation_start = cont.elevation_start,
                elevation_end = cont.elevation_end,
                reason = %line.termination,
                "line extended from auxiliary point"
            );
        } else {
            line.auxiliary_jump = false;
            warn!(line = line.number, x = point.x, y = point.y, "no contours from auxiliary point");
        }

        Some(idx)
    }

    /// Join `point` straight to the geometrically nearest line.
    ///
    /// The line is cut after the segment nearest to the projection of the
    /// click, then runs through the projection to the click. Returns the
    /// index of the modified line.
    pub fn add_direct_connection(&mut self, point: Coord<f64>) -> Option<usize> {
        let (idx, on_line) = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.points.len() >= 2)
            .filter_map(|(i, line)| {
                let geom = line.to_line_string();
                geom.nearest_point(point).map(|p| (i, p, geom.distance_to(point)))
            })
            .min_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, p, _)| (i, p))?;

        let line = &mut self.lines[idx];
        let cut = line
            .points
            .windows(2)
            .enumerate()
            .map(|(j, w)| (j, Line::new(w[0], w[1])))
            .map(|(j, seg)| (j, LineString::from(seg).distance_to(on_line)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(j, _)| j + 1)?;

        line.points.truncate(cut);
        line.points.push(on_line);
        line.points.push(point);
        line.final_point = point;
        line.direct_connection = true;

        self.connections.push(DirectConnection {
            click: point,
            on_line,
            line: idx,
        });
        info!(
            line = line.number,
            points = line.point_count(),
            distance = point_distance(point, on_line),
            "direct connection applied"
        );
        Some(idx)
    }

    /// Close the two lines into the watershed polygon
    pub fn polygon(&self) -> Option<WatershedPolygon> {
        build_watershed_polygon(&self.lines[0].points, &self.lines[1].points)
    }

    /// Persistable form of this delineation
    pub fn record(&self) -> WatershedRecord {
        WatershedRecord {
            start_points: self.start_points,
            auxiliaries: self.auxiliaries.clone(),
            connections: self.connections.clone(),
            area_m2: self.polygon().map(|p| p.area() as i64),
        }
    }

    pub fn lines(&self) -> &[TracedLine; 2] {
        &self.lines
    }

    pub fn line(&self, idx: usize) -> Option<&TracedLine> {
        self.lines.get(idx)
    }

    pub fn start_points(&self) -> [Coord<f64>; 2] {
        self.start_points
    }

    pub fn auxiliaries(&self) -> &[Coord<f64>] {
        &self.auxiliaries
    }

    pub fn connections(&self) -> &[DirectConnection] {
        &self.connections
    }

    /// Where the two freshly traced lines were trimmed
    pub fn crossing(&self) -> Option<Coord<f64>> {
        self.crossing
    }

    pub fn params(&self) -> &DivideParams {
        &self.params
    }
}

/// Input of [`DivideDelineation`]
#[derive(Debug, Clone, Default)]
pub struct DelineationInput {
    pub start_points: Vec<Coord<f64>>,
    pub auxiliaries: Vec<Coord<f64>>,
}

/// Watershed delineation over a loaded topography
#[derive(Debug, Clone, Copy)]
pub struct DivideDelineation<'a> {
    pub topo: &'a Topography,
}

impl<'a> DivideDelineation<'a> {
    pub fn new(topo: &'a Topography) -> Self {
        Self { topo }
    }
}

impl Algorithm for DivideDelineation<'_> {
    type Input = DelineationInput;
    type Output = DivideSession;
    type Params = DivideParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "DivideDelineation"
    }

    fn description(&self) -> &'static str {
        "Trace watershed divides along contour lines between two start points"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        DivideSession::trace(self.topo, &input.start_points, &input.auxiliaries, params)
    }
}
