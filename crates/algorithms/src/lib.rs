//! # Ridgeline Algorithms
//!
//! Watershed divide tracing over elevation contour lines.
//!
//! ## Modules
//!
//! - **contour**: contour store, R-tree index, peak classification
//! - **divide**: ridge walker, line trimming, polygon assembly, sessions
//! - **vector**: planar geometry helpers shared by both

pub mod contour;
pub mod divide;
pub mod vector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::contour::{is_closed, is_real_peak, load_contours, Contour, ContourId, ContourStore, Topography};
    pub use crate::divide::{
        build_watershed_polygon, continue_from_auxiliary, trace_from_point, trim_at_crossing,
        DivideDelineation, DivideParams, DivideSession, TerminationReason, TracedLine, WalkParams,
        WatershedPolygon, WatershedRecord,
    };
    pub use crate::vector::{BoundingBox, GeometryOps};
    pub use ridgeline_core::prelude::*;
}
