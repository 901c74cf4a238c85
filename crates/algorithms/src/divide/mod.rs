//! Watershed divide tracing
//!
//! - [`trace_from_point`] / [`continue_from_auxiliary`]: ridge walks over
//!   a [`Topography`](crate::contour::Topography)
//! - [`trim_at_crossing`]: cut two lines at their first mutual crossing
//! - [`build_watershed_polygon`]: close two lines into a polygon
//! - [`DivideSession`]: the two lines of one watershed and their edits

mod crest;
mod crossing;
mod params;
mod polygon;
mod reason;
mod seed;
mod select;
mod session;
mod trim;
mod walker;

pub use params::{DivideParams, WalkParams};
pub use polygon::{build_watershed_polygon, WatershedPolygon};
pub use reason::{Leg, TerminationReason};
pub use session::{DelineationInput, DirectConnection, DivideDelineation, DivideSession, WatershedRecord};
pub use trim::trim_at_crossing;
pub use walker::{continue_from_auxiliary, trace_from_point, Continuation, TracedLine};

/// Contour elevations closer than this are the same level
const ELEVATION_EPSILON: f64 = 1e-6;

pub(crate) fn same_level(a: f64, b: f64) -> bool {
    (a - b).abs() < ELEVATION_EPSILON
}
