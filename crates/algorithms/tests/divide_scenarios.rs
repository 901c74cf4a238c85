//! End-to-end divide scenarios on small synthetic contour layouts.

use geo::{Coord, LineString};
use ridgeline_algorithms::contour::{is_closed, is_real_peak, ContourStore, Topography, CLOSED_TOLERANCE, PEAK_SEARCH_RADIUS};
use ridgeline_algorithms::divide::{
    build_watershed_polygon, trace_from_point, trim_at_crossing, DivideParams, DivideSession, Leg,
    TerminationReason, WalkParams,
};

fn c(x: f64, y: f64) -> Coord<f64> {
    Coord { x, y }
}

fn assert_near(got: Coord<f64>, want: Coord<f64>) {
    assert!(
        (got.x - want.x).abs() < 1e-9 && (got.y - want.y).abs() < 1e-9,
        "expected {want:?}, got {got:?}"
    );
}

fn seg(a: (f64, f64), b: (f64, f64)) -> LineString<f64> {
    LineString::from(vec![a, b])
}

fn square(x0: f64, y0: f64, size: f64) -> LineString<f64> {
    LineString::from(vec![
        (x0, y0),
        (x0 + size, y0),
        (x0 + size, y0 + size),
        (x0, y0 + size),
        (x0, y0),
    ])
}

/// Two independent elevation ladders whose walks cross at (40, 40):
/// line 1 climbs 101 -> 103 from (0, 0), line 2 climbs 201 -> 203 from (40, 0).
/// A far-away 104/105 pair lets an auxiliary point extend line 1.
fn crossing_ladders() -> Topography {
    Topography::new(ContourStore::from_lines(vec![
        (100.0, seg((-1.0, -3.0), (1.0, -3.0))),
        (102.0, seg((-2.0, 40.0), (2.0, 40.0))),
        (103.0, seg((60.0, 38.0), (60.0, 42.0))),
        (200.0, seg((39.0, -3.0), (41.0, -3.0))),
        (202.0, seg((38.0, 30.0), (42.0, 30.0))),
        (203.0, seg((38.0, 100.0), (42.0, 100.0))),
        (104.0, seg((58.0, 400.0), (62.0, 400.0))),
        (105.0, seg((58.0, 420.0), (62.0, 420.0))),
    ]))
}

// ---------------------------------------------------------------------------
// Trim and polygon
// ---------------------------------------------------------------------------

#[test]
fn x_crossing_is_trimmed_at_center() {
    let a = vec![c(0.0, 0.0), c(10.0, 10.0)];
    let b = vec![c(0.0, 10.0), c(10.0, 0.0)];
    let (ta, tb, hit) = trim_at_crossing(&a, &b);

    let hit = hit.expect("lines cross");
    assert!((hit.x - 5.0).abs() < 1e-10 && (hit.y - 5.0).abs() < 1e-10);
    assert_eq!(ta, vec![c(0.0, 0.0), hit]);
    assert_eq!(tb, vec![c(0.0, 10.0), hit]);
}

#[test]
fn trim_is_symmetric() {
    let a = vec![c(0.0, 0.0), c(20.0, 0.0), c(20.0, 20.0), c(0.0, 20.0)];
    let b = vec![c(10.0, -10.0), c(10.0, 30.0), c(-5.0, 10.0)];

    let (ta, tb, hit_ab) = trim_at_crossing(&a, &b);
    let (tb2, ta2, hit_ba) = trim_at_crossing(&b, &a);

    assert_eq!(hit_ab, hit_ba);
    assert_eq!(ta, ta2);
    assert_eq!(tb, tb2);
}

#[test]
fn trimmed_lines_close_into_polygon() {
    let a = vec![c(0.0, 0.0), c(10.0, 10.0)];
    let b = vec![c(0.0, 10.0), c(10.0, 0.0)];
    let (ta, tb, _) = trim_at_crossing(&a, &b);

    let poly = build_watershed_polygon(&ta, &tb).expect("triangle");
    assert!(!poly.repaired());
    assert!((poly.area() - 25.0).abs() < 1e-10);

    let ring = poly.geometry().0[0].exterior();
    assert_eq!(ring.0.first(), ring.0.last());
    // (0,0) (5,5) (0,10) plus the closing point
    assert_eq!(ring.0.len(), 4);
}

// ---------------------------------------------------------------------------
// Peak classification
// ---------------------------------------------------------------------------

#[test]
fn isolated_square_is_peak_nested_higher_is_not() {
    let topo = Topography::new(ContourStore::from_lines(vec![
        (100.0, square(0.0, 0.0, 100.0)),
        (500.0, square(1000.0, 0.0, 100.0)),
        (510.0, square(1040.0, 40.0, 20.0)),
    ]));
    let lone = topo.contour(0).unwrap();
    let outer = topo.contour(1).unwrap();
    let inner = topo.contour(2).unwrap();

    assert!(is_closed(lone.geometry(), CLOSED_TOLERANCE));
    assert!(is_real_peak(lone, &topo, PEAK_SEARCH_RADIUS, CLOSED_TOLERANCE));
    assert!(!is_real_peak(outer, &topo, PEAK_SEARCH_RADIUS, CLOSED_TOLERANCE));
    assert!(is_real_peak(inner, &topo, PEAK_SEARCH_RADIUS, CLOSED_TOLERANCE));

    // cached answers do not change
    assert!(!is_real_peak(outer, &topo, PEAK_SEARCH_RADIUS, CLOSED_TOLERANCE));
    assert!(is_closed(lone.geometry(), CLOSED_TOLERANCE));
}

// ---------------------------------------------------------------------------
// Walks
// ---------------------------------------------------------------------------

#[test]
fn start_far_from_contours_has_no_starting_elevation() {
    let topo = crossing_ladders();
    let start = c(-5000.0, -5000.0);
    let line = trace_from_point(start, &topo, 1, None, &WalkParams::fresh());

    assert_eq!(line.termination, TerminationReason::NoStartingElevation);
    assert_eq!(line.termination.tag(), "no_starting_elevation");
    assert_eq!(line.points, vec![start]);
    assert_eq!(line.elevation_start, 0.0);
    assert_eq!(line.length(), 0.0);
}

#[test]
fn self_crossing_on_fourth_iteration_stops_at_intersection() {
    // (0,0) -> (0,40) -> (40,40) -> (40,20), then the step to (-20,20)
    // would cut the first segment at (0,20)
    let topo = Topography::new(ContourStore::from_lines(vec![
        (100.0, seg((-1.0, -3.0), (1.0, -3.0))),
        (102.0, seg((-2.0, 40.0), (2.0, 40.0))),
        (103.0, seg((40.0, 38.0), (40.0, 42.0))),
        (104.0, seg((38.0, 20.0), (42.0, 20.0))),
        (105.0, seg((-20.0, 18.0), (-20.0, 22.0))),
    ]));
    let line = trace_from_point(c(0.0, 0.0), &topo, 1, None, &WalkParams::fresh());

    assert_eq!(line.termination, TerminationReason::SelfCrossing(Leg::Approach));
    assert_eq!(line.termination.tag(), "autocruce");
    assert_eq!(line.iterations, 4);
    assert_eq!(line.point_count(), 5);
    assert_eq!(
        &line.points[..4],
        &[c(0.0, 0.0), c(0.0, 40.0), c(40.0, 40.0), c(40.0, 20.0)]
    );
    assert_near(line.points[4], c(0.0, 20.0));
    assert_near(line.final_point, c(0.0, 20.0));
    assert_ne!(line.final_point, c(-20.0, 20.0));
    assert_eq!(line.elevation_end, 104.0);
}

#[test]
fn walks_make_forward_progress_and_never_descend() {
    // parallel contours, one unit apart, with a duplicate level on each step
    let mut lines = Vec::new();
    for i in 0..12 {
        let y = 15.0 * (i as f64 + 1.0);
        lines.push((100.0 + i as f64, seg((-300.0, y), (300.0, y))));
        lines.push((100.0 + i as f64, seg((-300.0, y + 5.0), (300.0, y + 5.0))));
    }
    let topo = Topography::new(ContourStore::from_lines(lines));
    let line = trace_from_point(c(0.0, 0.0), &topo, 1, None, &WalkParams::fresh());

    assert!(line.iterations <= WalkParams::fresh().max_iterations);
    // every committed step consumed exactly one new contour
    assert_eq!(line.contour_count(), line.point_count() - 1);
    assert!(line.elevation_end >= line.elevation_start);

    let mut last_y = f64::NEG_INFINITY;
    for p in &line.points {
        assert!(p.y >= last_y, "walk went back down at {p:?}");
        last_y = p.y;
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[test]
fn session_trims_pair_and_builds_polygon() {
    let topo = crossing_ladders();
    let session =
        DivideSession::trace(&topo, &[c(0.0, 0.0), c(40.0, 0.0)], &[], DivideParams::default()).unwrap();

    let [l1, l2] = session.lines();
    assert_eq!(l1.elevation_start, 101.0);
    assert_eq!(l2.elevation_start, 201.0);
    assert_near(session.crossing().expect("lines cross"), c(40.0, 40.0));
    assert_eq!(&l1.points[..2], &[c(0.0, 0.0), c(0.0, 40.0)]);
    assert_eq!(&l2.points[..2], &[c(40.0, 0.0), c(40.0, 30.0)]);
    assert_eq!(l1.point_count(), 3);
    assert_eq!(l2.point_count(), 3);
    assert_near(l1.points[2], c(40.0, 40.0));
    assert_near(l2.points[2], c(40.0, 40.0));
    assert_near(l1.final_point, c(40.0, 40.0));

    let poly = session.polygon().expect("closed watershed");
    assert!((poly.area() - 1600.0).abs() < 1e-6);
    assert!(matches!(session.record().area_m2, Some(1599..=1600)));
}

#[test]
fn auxiliary_point_extends_nearest_line() {
    let topo = crossing_ladders();
    let mut session =
        DivideSession::trace(&topo, &[c(0.0, 0.0), c(40.0, 0.0)], &[], DivideParams::default()).unwrap();

    let idx = session.add_auxiliary(&topo, c(60.0, 380.0));
    assert_eq!(idx, Some(0));

    let l1 = &session.lines()[0];
    assert!(l1.auxiliary_jump);
    assert_eq!(l1.elevation_end, 105.0);
    assert_eq!(l1.final_point, c(60.0, 420.0));
    assert_eq!(&l1.points[3..], &[c(60.0, 380.0), c(60.0, 420.0)]);
    assert_eq!(l1.termination, TerminationReason::NoContours);
    assert_eq!(session.auxiliaries(), &[c(60.0, 380.0)]);

    // replaying the record reproduces both lines
    let record = session.record();
    let replayed = DivideSession::replay(&topo, &record, DivideParams::default()).unwrap();
    assert_eq!(replayed.lines()[0].points, session.lines()[0].points);
    assert_eq!(replayed.lines()[1].points, session.lines()[1].points);
}

#[test]
fn auxiliary_without_contours_keeps_point_but_no_jump() {
    let topo = crossing_ladders();
    let mut session =
        DivideSession::trace(&topo, &[c(0.0, 0.0), c(40.0, 0.0)], &[], DivideParams::default()).unwrap();

    session.add_auxiliary(&topo, c(40.0, 60.0));
    let l1 = &session.lines()[0];
    assert!(!l1.auxiliary_jump);
    assert_eq!(l1.points.last(), Some(&c(40.0, 60.0)));
}
