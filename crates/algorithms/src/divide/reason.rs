//! Why a walk stopped

use serde::{Serialize, Serializer};
use std::fmt;

/// Which committed segment triggered a stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Leg {
    /// Step onto the next contour (or onto a peak center)
    Approach,
    /// Leaving a peak through its crest exit, fresh walk
    PeakExit,
    /// Leaving a peak through its crest exit, auxiliary continuation
    ContinuationExit,
}

/// Terminal state of a ridge walk.
///
/// None of these are errors: every walk ends in exactly one of them and the
/// partial trace is still returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// No contour near the seed point
    NoStartingElevation,
    /// No eligible contour within the search radius
    NoContours,
    /// Iteration ceiling reached
    MaxIterations,
    /// The new segment crossed the other divide line
    CrossesSibling(Leg),
    /// The new segment crossed an earlier segment of the same line
    SelfCrossing(Leg),
    /// The new segment cut across too many unrelated contours
    CrossingDensity { count: usize, leg: Leg },
}

impl TerminationReason {
    /// Stable string tag of the reason
    pub fn tag(&self) -> String {
        match self {
            TerminationReason::NoStartingElevation => "no_starting_elevation".into(),
            TerminationReason::NoContours => "no_contours".into(),
            TerminationReason::MaxIterations => "max_iter".into(),
            TerminationReason::CrossesSibling(Leg::Approach) => "cruce_otra".into(),
            TerminationReason::CrossesSibling(Leg::PeakExit) => "cruce_sal_pico".into(),
            TerminationReason::CrossesSibling(Leg::ContinuationExit) => "cruce_sal".into(),
            TerminationReason::SelfCrossing(Leg::Approach) => "autocruce".into(),
            TerminationReason::SelfCrossing(_) => "autocruce_sal".into(),
            TerminationReason::CrossingDensity { count, leg: Leg::Approach } => {
                format!("cruza_{}", count)
            }
            TerminationReason::CrossingDensity { count, leg: Leg::PeakExit } => {
                format!("sal_pico_cruza_{}", count)
            }
            TerminationReason::CrossingDensity { count, leg: Leg::ContinuationExit } => {
                format!("sal_cruza_{}", count)
            }
        }
    }

    /// Stopped on a crossing of any kind
    pub fn is_crossing(&self) -> bool {
        matches!(
            self,
            TerminationReason::CrossesSibling(_)
                | TerminationReason::SelfCrossing(_)
                | TerminationReason::CrossingDensity { .. }
        )
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl Serialize for TerminationReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.tag())
    }
}
