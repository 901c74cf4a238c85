//! Walk parameters
//!
//! Fresh traces and auxiliary continuations share one algorithm and differ
//! only in their ceilings and free run, so both are a [`WalkParams`].

use serde::{Deserialize, Serialize};

use crate::contour::{CLOSED_TOLERANCE, PEAK_SEARCH_RADIUS};

/// Parameters of one ridge walk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkParams {
    /// Floor of the adaptive search radius
    pub base_radius: f64,
    /// Search radius = last step length x multiplier (never below the floor)
    pub radius_multiplier: f64,
    /// Number of recent points defining the generation direction
    pub direction_window: usize,
    /// Hard iteration ceiling
    pub max_iterations: usize,
    /// Iterations before the crossing-density check engages
    pub free_run: usize,
    /// Radius searched around a seed point for its starting elevation
    pub seed_radius: f64,
    /// Distance band over the nearest contour admitting near-ties
    pub seed_tolerance: f64,
    /// Contours within this elevation difference count as crossings
    pub crossing_band: f64,
    /// Margin around a step's envelope searched for crossings
    pub crossing_margin: f64,
    /// Crossed contours that stop the walk
    pub crossing_limit: usize,
    /// Neighborhood of the peak classifier
    pub peak_search_radius: f64,
    /// Endpoint gap for closed contours
    pub closed_tolerance: f64,
    /// Approximate number of ring samples when choosing a crest exit
    pub crest_samples: usize,
    /// Radius in which lower contours penalize a crest exit
    pub lower_contour_radius: f64,
}

impl Default for WalkParams {
    fn default() -> Self {
        Self::fresh()
    }
}

impl WalkParams {
    /// Parameters of a walk from one of the two start points
    pub fn fresh() -> Self {
        Self {
            base_radius: 50.0,
            radius_multiplier: 5.0,
            direction_window: 5,
            max_iterations: 2000,
            free_run: 3,
            seed_radius: 25.0,
            seed_tolerance: 5.0,
            crossing_band: 20.0,
            crossing_margin: 50.0,
            crossing_limit: 3,
            peak_search_radius: PEAK_SEARCH_RADIUS,
            closed_tolerance: CLOSED_TOLERANCE,
            crest_samples: 20,
            lower_contour_radius: 30.0,
        }
    }

    /// Parameters of a continuation from an auxiliary point
    pub fn auxiliary() -> Self {
        Self {
            max_iterations: 1000,
            free_run: 5,
            ..Self::fresh()
        }
    }

    /// Adaptive search radius after a step of `last_step` units
    pub fn search_radius(&self, last_step: f64) -> f64 {
        (last_step * self.radius_multiplier).max(self.base_radius)
    }
}

/// Parameters of a whole delineation.
///
/// Auxiliary continuations reuse `walk` except for their own iteration
/// ceiling and free run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DivideParams {
    /// Walks from the start points
    pub walk: WalkParams,
    /// Iteration ceiling of auxiliary continuations
    pub auxiliary_max_iterations: usize,
    /// Free run of auxiliary continuations
    pub auxiliary_free_run: usize,
}

impl Default for DivideParams {
    fn default() -> Self {
        let aux = WalkParams::auxiliary();
        Self {
            walk: WalkParams::fresh(),
            auxiliary_max_iterations: aux.max_iterations,
            auxiliary_free_run: aux.free_run,
        }
    }
}

impl DivideParams {
    pub fn fresh(&self) -> &WalkParams {
        &self.walk
    }

    pub fn auxiliary(&self) -> WalkParams {
        WalkParams {
            max_iterations: self.auxiliary_max_iterations,
            free_run: self.auxiliary_free_run,
            ..self.walk.clone()
        }
    }
}
