//! Ridge walker
//!
//! A walk starts at a seed point on a known elevation and repeatedly steps
//! to the nearest unused contour one unit higher (or, failing that, on the
//! same level). Peaks are crossed through their center and left through a
//! crest exit. Every step is checked against the sibling line, the walk's
//! own path, and the density of contours it would cut before it is
//! committed.

use geo::{Coord, LineString};
use std::collections::HashSet;
use tracing::debug;

use super::crest::crest_exit;
use super::crossing::{count_crossings, self_crossing, sibling_crossing};
use super::params::WalkParams;
use super::reason::{Leg, TerminationReason};
use super::seed::seed_elevation;
use super::select::{find_next_contour, Connection};
use crate::contour::{Contour, ContourId, Topography};
use crate::vector::{bearing, point_distance, polyline_length, BoundingBox, GeometryOps};

/// One traced divide line
#[derive(Debug, Clone)]
pub struct TracedLine {
    /// 1 or 2
    pub number: u8,
    pub points: Vec<Coord<f64>>,
    pub elevation_start: f64,
    pub elevation_end: f64,
    /// Peaks crossed
    pub peaks: usize,
    pub iterations: usize,
    pub termination: TerminationReason,
    pub used_contours: HashSet<ContourId>,
    pub final_point: Coord<f64>,
    /// The last auxiliary extension added points
    pub auxiliary_jump: bool,
    /// The line ends in a direct connection to a clicked point
    pub direct_connection: bool,
}

impl TracedLine {
    fn unseeded(number: u8, start: Coord<f64>) -> Self {
        Self {
            number,
            points: vec![start],
            elevation_start: 0.0,
            elevation_end: 0.0,
            peaks: 0,
            iterations: 0,
            termination: TerminationReason::NoStartingElevation,
            used_contours: HashSet::new(),
            final_point: start,
            auxiliary_jump: false,
            direct_connection: false,
        }
    }

    pub fn elevation_gain(&self) -> f64 {
        self.elevation_end - self.elevation_start
    }

    /// Planar length of the polyline
    pub fn length(&self) -> f64 {
        polyline_length(&self.points)
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn contour_count(&self) -> usize {
        self.used_contours.len()
    }

    pub fn to_line_string(&self) -> LineString<f64> {
        LineString::from(self.points.clone())
    }
}

/// Result of a walk resumed from an auxiliary point.
///
/// `points` starts with the auxiliary point itself.
#[derive(Debug, Clone)]
pub struct Continuation {
    pub points: Vec<Coord<f64>>,
    pub elevation_start: f64,
    pub elevation_end: f64,
    pub peaks: usize,
    pub iterations: usize,
    pub termination: TerminationReason,
    pub used_contours: HashSet<ContourId>,
    /// Whether the starting elevation came from nearby contours rather
    /// than the inherited one
    pub seeded: bool,
}

struct Walk<'a> {
    topo: &'a Topography,
    params: &'a WalkParams,
    sibling: Option<&'a [Coord<f64>]>,
    exit_leg: Leg,
    points: Vec<Coord<f64>>,
    current: Coord<f64>,
    previous: Coord<f64>,
    elevation: f64,
    used: HashSet<ContourId>,
    last_step: f64,
    peaks: usize,
    iterations: usize,
}

impl<'a> Walk<'a> {
    fn new(
        topo: &'a Topography,
        params: &'a WalkParams,
        sibling: Option<&'a [Coord<f64>]>,
        exit_leg: Leg,
        start: Coord<f64>,
        elevation: f64,
        used: HashSet<ContourId>,
    ) -> Self {
        Self {
            topo,
            params,
            sibling,
            exit_leg,
            points: vec![start],
            current: start,
            previous: start,
            elevation,
            used,
            last_step: params.base_radius,
            peaks: 0,
            iterations: 0,
        }
    }

    /// Heading over the most recent points
    fn direction(&self) -> Option<f64> {
        let window = &self.points[self.points.len().saturating_sub(self.params.direction_window)..];
        if window.len() < 2 {
            return None;
        }
        bearing(window[0], window[window.len() - 1])
    }

    fn run(&mut self) -> TerminationReason {
        while self.iterations < self.params.max_iterations {
            self.iterations += 1;
            let radius = self.params.search_radius(self.last_step);
            let direction = self.direction();

            let Some(next) = find_next_contour(
                self.current,
                self.topo,
                &self.used,
                self.elevation,
                radius,
                self.params,
            ) else {
                return TerminationReason::NoContours;
            };

            let dense_check = self.iterations > self.params.free_run;
            let outcome = match next.connection {
                Connection::PeakCenter(center) => {
                    self.cross_peak(next.contour, center, radius, direction, dense_check)
                }
                Connection::Nearest(pt) => self.step(pt, Leg::Approach, self.previous, dense_check),
            };
            if let Err(reason) = outcome {
                return reason;
            }

            self.elevation = next.contour.elevation();
            self.used.insert(next.contour.id());
        }
        TerminationReason::MaxIterations
    }

    fn cross_peak(
        &mut self,
        peak: &Contour,
        center: Coord<f64>,
        radius: f64,
        direction: Option<f64>,
        dense_check: bool,
    ) -> Result<(), TerminationReason> {
        self.peaks += 1;
        self.step(center, Leg::Approach, self.previous, dense_check)?;

        let topo = self.topo;
        let used = &self.used;
        let reach = 2.0 * radius;
        let neighbours: Vec<&Contour> = topo
            .query(&BoundingBox::around(center, reach))
            .filter(|c| c.id() != peak.id() && !used.contains(&c.id()))
            .filter(|c| c.geometry().distance_to(center) <= reach)
            .collect();

        let exit = crest_exit(center, peak, direction, topo, &neighbours, self.params);
        self.step(exit, self.exit_leg, center, dense_check)
    }

    /// Check the step from the current position to `to` and commit it.
    ///
    /// A sibling or self crossing commits the crossing point and stops; a
    /// dense step stops without moving. `density_from` is where the
    /// density segment starts.
    fn step(
        &mut self,
        to: Coord<f64>,
        leg: Leg,
        density_from: Coord<f64>,
        dense_check: bool,
    ) -> Result<(), TerminationReason> {
        let from = self.current;

        if let Some(hit) = self.sibling.and_then(|sibling| sibling_crossing(from, to, sibling)) {
            self.stop_at(hit);
            return Err(TerminationReason::CrossesSibling(leg));
        }

        // continuations check their own path too, not only fresh walks
        if let Some(hit) = self_crossing(&self.points, to) {
            self.stop_at(hit);
            return Err(TerminationReason::SelfCrossing(leg));
        }

        if dense_check {
            let count = count_crossings(density_from, to, self.topo, &self.used, self.elevation, self.params);
            if count >= self.params.crossing_limit {
                return Err(TerminationReason::CrossingDensity { count, leg });
            }
        }

        self.last_step = point_distance(from, to);
        self.points.push(to);
        self.previous = from;
        self.current = to;
        Ok(())
    }

    fn stop_at(&mut self, hit: Coord<f64>) {
        self.points.push(hit);
        self.previous = self.current;
        self.current = hit;
    }
}

/// Trace a divide line from `start`.
///
/// `sibling` is the other line of the pair when one exists; steps that
/// cross it stop the walk. A start point with no contour in reach yields
/// a single-point line terminated with
/// [`TerminationReason::NoStartingElevation`].
pub fn trace_from_point(
    start: Coord<f64>,
    topo: &Topography,
    number: u8,
    sibling: Option<&[Coord<f64>]>,
    params: &WalkParams,
) -> TracedLine {
    let Some(elevation) = seed_elevation(start, topo, &HashSet::new(), params) else {
        debug!(line = number, x = start.x, y = start.y, "no contour near start point");
        return TracedLine::unseeded(number, start);
    };

    let mut walk = Walk::new(topo, params, sibling, Leg::PeakExit, start, elevation, HashSet::new());
    let termination = walk.run();

    debug!(
        line = number,
        reason = %termination,
        iterations = walk.iterations,
        points = walk.points.len(),
        elevation_start = elevation,
        elevation_end = walk.elevation,
        "walk finished"
    );

    TracedLine {
        number,
        elevation_start: elevation,
        elevation_end: walk.elevation,
        peaks: walk.peaks,
        iterations: walk.iterations,
        termination,
        final_point: walk.current,
        used_contours: walk.used,
        points: walk.points,
        auxiliary_jump: false,
        direct_connection: false,
    }
}

/// Resume a line from an auxiliary point.
///
/// Contours in `used` stay consumed and are ignored when seeding; without
/// any other contour nearby the walk starts on `inherited_elevation`.
pub fn continue_from_auxiliary(
    aux: Coord<f64>,
    topo: &Topography,
    inherited_elevation: f64,
    used: &HashSet<ContourId>,
    sibling: Option<&[Coord<f64>]>,
    params: &WalkParams,
) -> Continuation {
    let seeded = seed_elevation(aux, topo, used, params);
    let elevation = seeded.unwrap_or(inherited_elevation);

    let mut walk = Walk::new(topo, params, sibling, Leg::ContinuationExit, aux, elevation, used.clone());
    let termination = walk.run();

    debug!(
        reason = %termination,
        iterations = walk.iterations,
        points = walk.points.len(),
        seeded = seeded.is_some(),
        "auxiliary continuation finished"
    );

    Continuation {
        elevation_start: elevation,
        elevation_end: walk.elevation,
        peaks: walk.peaks,
        iterations: walk.iterations,
        termination,
        used_contours: walk.used,
        points: walk.points,
        seeded: seeded.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::ContourStore;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    fn hline(y: f64) -> LineString<f64> {
        LineString::from(vec![(-200.0, y), (200.0, y)])
    }

    /// Parallel contours stepping up by one unit every 20 units northwards
    fn staircase(levels: usize) -> Topography {
        let lines = (0..levels).map(|i| (100.0 + i as f64, hline(10.0 + 20.0 * i as f64)));
        Topography::new(ContourStore::from_lines(lines))
    }

    #[test]
    fn test_no_starting_elevation() {
        let topo = staircase(3);
        let line = trace_from_point(c(0.0, -1000.0), &topo, 1, None, &WalkParams::fresh());
        assert_eq!(line.termination, TerminationReason::NoStartingElevation);
        assert_eq!(line.points, vec![c(0.0, -1000.0)]);
        assert_eq!(line.elevation_start, 0.0);
        assert_eq!(line.iterations, 0);
        assert_eq!(line.final_point, c(0.0, -1000.0));
    }

    #[test]
    fn test_climbs_staircase_until_exhausted() {
        let topo = staircase(5);
        // only the 100 contour is in the seed box, so the walk starts on 101
        let line = trace_from_point(c(0.0, 0.0), &topo, 1, None, &WalkParams::fresh());
        assert_eq!(line.elevation_start, 101.0);
        assert_eq!(line.termination, TerminationReason::NoContours);
        assert_eq!(line.elevation_end, 104.0);
        // 102, 103, 104 visited in order, straight north
        assert_eq!(line.point_count(), 4);
        assert_eq!(line.points[1], c(0.0, 50.0));
        assert_eq!(line.final_point, c(0.0, 90.0));
        assert_eq!(line.contour_count(), 3);
        assert_eq!(line.iterations, 4);
        assert!((line.length() - 90.0).abs() < 1e-10);
        assert!((line.elevation_gain() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_iteration_ceiling() {
        let topo = staircase(10);
        let params = WalkParams {
            max_iterations: 2,
            ..WalkParams::fresh()
        };
        let line = trace_from_point(c(0.0, 0.0), &topo, 2, None, &params);
        assert_eq!(line.termination, TerminationReason::MaxIterations);
        assert_eq!(line.iterations, 2);
        assert_eq!(line.point_count(), 3);
    }

    #[test]
    fn test_sibling_crossing_stops_walk() {
        let topo = staircase(5);
        let sibling = vec![c(-50.0, 40.0), c(50.0, 40.0)];
        let line = trace_from_point(c(0.0, 0.0), &topo, 2, Some(&sibling), &WalkParams::fresh());
        assert_eq!(line.termination, TerminationReason::CrossesSibling(Leg::Approach));
        assert_eq!(*line.points.last().unwrap(), c(0.0, 40.0));
        assert_eq!(line.final_point, c(0.0, 40.0));
        // the contour behind the sibling was not consumed
        assert_eq!(line.elevation_end, 101.0);
    }

    #[test]
    fn test_peak_is_crossed_through_center() {
        let ring = LineString::from(vec![
            (-10.0, 20.0),
            (10.0, 20.0),
            (10.0, 40.0),
            (-10.0, 40.0),
            (-10.0, 20.0),
        ]);
        let topo = Topography::new(ContourStore::from_lines(vec![(100.0, hline(-5.0)), (101.0, ring)]));
        let line = trace_from_point(c(0.0, 0.0), &topo, 1, None, &WalkParams::fresh());
        assert_eq!(line.peaks, 1);
        assert_eq!(line.points[1], c(0.0, 30.0));
        assert_eq!(line.point_count(), 3);
        assert_eq!(line.termination, TerminationReason::NoContours);
        assert_eq!(line.elevation_end, 101.0);
    }

    fn short(e: f64, x: f64, y: f64) -> (f64, LineString<f64>) {
        (e, LineString::from(vec![(x - 2.0, y), (x + 2.0, y)]))
    }

    fn square_ring(cx: f64, cy: f64, half: f64) -> LineString<f64> {
        LineString::from(vec![
            (cx - half, cy - half),
            (cx + half, cy - half),
            (cx + half, cy + half),
            (cx - half, cy + half),
            (cx - half, cy - half),
        ])
    }

    /// Ladder north along x=0 whose step onto `top_y` cuts three 110 contours
    fn dense_ladder(steps: &[f64], top_y: f64) -> Topography {
        let mut lines = vec![short(100.0, 0.0, -3.0)];
        for (i, &y) in steps.iter().chain(std::iter::once(&top_y)).enumerate() {
            lines.push(short(102.0 + i as f64, 0.0, y));
        }
        for k in 1..=3 {
            lines.push(short(110.0, 0.0, top_y - 10.0 * k as f64));
        }
        Topography::new(ContourStore::from_lines(lines))
    }

    #[test]
    fn test_density_stop_after_free_run() {
        // 102..104 on iterations 1-3, the step onto 105 on iteration 4
        let topo = dense_ladder(&[40.0, 80.0, 120.0], 160.0);
        let line = trace_from_point(c(0.0, 0.0), &topo, 1, None, &WalkParams::fresh());
        assert_eq!(
            line.termination,
            TerminationReason::CrossingDensity { count: 4, leg: Leg::Approach }
        );
        assert_eq!(line.termination.tag(), "cruza_4");
        assert_eq!(line.iterations, 4);
        assert_eq!(line.points, vec![c(0.0, 0.0), c(0.0, 40.0), c(0.0, 80.0), c(0.0, 120.0)]);
        assert_eq!(line.final_point, c(0.0, 120.0));
        assert_eq!(line.elevation_end, 104.0);
    }

    #[test]
    fn test_no_density_stop_during_free_run() {
        // same crossing, but on iteration 3
        let topo = dense_ladder(&[80.0, 120.0], 160.0);
        let line = trace_from_point(c(0.0, 0.0), &topo, 1, None, &WalkParams::fresh());
        assert_eq!(line.termination, TerminationReason::NoContours);
        assert_eq!(line.final_point, c(0.0, 160.0));
        assert_eq!(line.elevation_end, 104.0);
    }

    #[test]
    fn test_continuation_free_run_is_longer() {
        // iteration 4 is still inside the free run of a continuation
        let topo = dense_ladder(&[40.0, 80.0, 120.0], 160.0);
        let cont = continue_from_auxiliary(c(0.0, 0.0), &topo, 0.0, &HashSet::new(), None, &WalkParams::auxiliary());
        assert_eq!(cont.termination, TerminationReason::NoContours);
        assert_eq!(cont.points.last(), Some(&c(0.0, 160.0)));
        assert_eq!(cont.iterations, 5);
    }

    /// Peak ring at 102 centered on (0, 40); with no heading the exit is (-10, 30)
    fn peak_ahead() -> Topography {
        Topography::new(ContourStore::from_lines(vec![
            short(100.0, 0.0, -3.0),
            (102.0, square_ring(0.0, 40.0, 10.0)),
        ]))
    }

    #[test]
    fn test_peak_exit_crossing_sibling() {
        let topo = peak_ahead();
        // clear of the approach along x=0, cut by the exit towards (-10, 30)
        let sibling = vec![c(-8.0, 20.0), c(-8.0, 45.0)];

        let line = trace_from_point(c(0.0, 0.0), &topo, 1, Some(&sibling), &WalkParams::fresh());
        assert_eq!(line.termination, TerminationReason::CrossesSibling(Leg::PeakExit));
        assert_eq!(line.termination.tag(), "cruce_sal_pico");
        assert_eq!(line.peaks, 1);
        assert_eq!(&line.points[..2], &[c(0.0, 0.0), c(0.0, 40.0)]);
        let hit = line.final_point;
        assert!((hit.x + 8.0).abs() < 1e-9 && (hit.y - 32.0).abs() < 1e-9);

        let cont =
            continue_from_auxiliary(c(0.0, 0.0), &topo, 0.0, &HashSet::new(), Some(&sibling), &WalkParams::auxiliary());
        assert_eq!(cont.termination, TerminationReason::CrossesSibling(Leg::ContinuationExit));
        assert_eq!(cont.termination.tag(), "cruce_sal");
        assert_eq!(cont.points.len(), 3);
    }

    #[test]
    fn test_peak_exit_density_stop() {
        // peak 105 centered on (0, 170) reached on iteration 4; the exit to
        // (10, 180) cuts three long 110 contours whose centers lie outside the ring
        let mut lines = vec![
            short(100.0, 0.0, -3.0),
            short(102.0, 0.0, 40.0),
            short(103.0, 0.0, 80.0),
            short(104.0, 0.0, 120.0),
            (105.0, square_ring(0.0, 170.0, 10.0)),
        ];
        for a in [2.0, 5.0, 8.0] {
            lines.push((110.0, LineString::from(vec![(a - 1.0, a + 171.0), (a + 29.0, a + 141.0)])));
        }
        let topo = Topography::new(ContourStore::from_lines(lines));

        let line = trace_from_point(c(0.0, 0.0), &topo, 1, None, &WalkParams::fresh());
        assert_eq!(line.termination.tag(), "sal_pico_cruza_4");
        assert_eq!(line.peaks, 1);
        assert_eq!(line.iterations, 4);
        assert_eq!(line.final_point, c(0.0, 170.0));
    }

    #[test]
    fn test_continuation_checks_own_path() {
        // (0,0) -> (0,40) -> (40,40) -> (40,20), then the step to (-20,20)
        // cuts the first segment at (0,20)
        let topo = Topography::new(ContourStore::from_lines(vec![
            short(100.0, 0.0, -3.0),
            short(102.0, 0.0, 40.0),
            (103.0, LineString::from(vec![(40.0, 38.0), (40.0, 42.0)])),
            short(104.0, 40.0, 20.0),
            (105.0, LineString::from(vec![(-20.0, 18.0), (-20.0, 22.0)])),
        ]));
        let cont = continue_from_auxiliary(c(0.0, 0.0), &topo, 0.0, &HashSet::new(), None, &WalkParams::auxiliary());
        assert_eq!(cont.termination, TerminationReason::SelfCrossing(Leg::Approach));
        let hit = *cont.points.last().unwrap();
        assert!(hit.x.abs() < 1e-9 && (hit.y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_continuation_skips_used_contours() {
        let topo = staircase(5);
        let used: HashSet<ContourId> = [0, 1].into_iter().collect();
        let cont = continue_from_auxiliary(c(0.0, 40.0), &topo, 101.0, &used, None, &WalkParams::auxiliary());
        assert!(cont.seeded);
        // 102 is the only unused contour in the seed box
        assert_eq!(cont.elevation_start, 103.0);
        assert_eq!(cont.points[0], c(0.0, 40.0));
        assert_eq!(cont.elevation_end, 104.0);
        assert!(cont.used_contours.contains(&0));
        assert!(cont.used_contours.contains(&4));
    }

    #[test]
    fn test_continuation_falls_back_to_inherited_elevation() {
        let topo = staircase(3);
        let cont = continue_from_auxiliary(c(0.0, 400.0), &topo, 99.0, &HashSet::new(), None, &WalkParams::auxiliary());
        assert!(!cont.seeded);
        assert_eq!(cont.elevation_start, 99.0);
        assert_eq!(cont.points, vec![c(0.0, 400.0)]);
        assert_eq!(cont.termination, TerminationReason::NoContours);
    }
}
