//! Contour topography
//!
//! - Store: contours keyed by a stable id, loaded from vector features
//! - Index: R-tree over contour envelopes
//! - Classify: closed-curve and real-peak detection with caching

mod classify;
mod index;
mod store;
mod topography;

pub use classify::{classify_peak, is_closed, is_real_peak, CLOSED_TOLERANCE, PEAK_SEARCH_RADIUS};
pub use index::SpatialIndex;
pub use store::{load_contours, Contour, ContourId, ContourStore, PeakStatus};
pub use topography::Topography;
