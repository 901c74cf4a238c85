//! Contour store
//!
//! Uniform in-memory representation of an elevation contour layer. Every
//! contour part gets a stable [`ContourId`]; multi-part input features are
//! split into one contour per part at load time.

use geo::{Geometry, LineString};
use ridgeline_core::{Error, FeatureCollection, Result};
use std::cell::Cell;
use tracing::{debug, warn};

use crate::vector::BoundingBox;

/// Stable identifier of a contour within a loaded topography
pub type ContourId = usize;

/// Memoized peak classification of a contour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeakStatus {
    /// Not classified yet
    #[default]
    Unknown,
    /// Closed contour with no higher contour nested inside
    Peak,
    /// Open contour, or a closed one enclosing higher ground
    NotPeak,
}

impl PeakStatus {
    pub fn from_bool(is_peak: bool) -> Self {
        if is_peak {
            PeakStatus::Peak
        } else {
            PeakStatus::NotPeak
        }
    }

    /// `None` while still [`PeakStatus::Unknown`]
    pub fn known(self) -> Option<bool> {
        match self {
            PeakStatus::Unknown => None,
            PeakStatus::Peak => Some(true),
            PeakStatus::NotPeak => Some(false),
        }
    }
}

/// A single elevation contour line (or closed ring)
#[derive(Debug, Clone)]
pub struct Contour {
    id: ContourId,
    elevation: f64,
    geometry: LineString<f64>,
    bbox: BoundingBox,
    peak: Cell<PeakStatus>,
}

impl Contour {
    pub fn id(&self) -> ContourId {
        self.id
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    pub fn geometry(&self) -> &LineString<f64> {
        &self.geometry
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Cached peak classification, [`PeakStatus::Unknown`] until computed
    pub fn peak_status(&self) -> PeakStatus {
        self.peak.get()
    }

    pub(crate) fn cache_peak(&self, is_peak: bool) {
        self.peak.set(PeakStatus::from_bool(is_peak));
    }
}

/// All contours of one topography, indexed by [`ContourId`]
#[derive(Debug, Clone, Default)]
pub struct ContourStore {
    contours: Vec<Contour>,
}

impl ContourStore {
    pub fn new() -> Self {
        Self { contours: Vec::new() }
    }

    /// Add a contour part, returning its id.
    ///
    /// Fails for geometries without vertices or with non-finite values.
    pub fn push(&mut self, elevation: f64, geometry: LineString<f64>) -> Result<ContourId> {
        if !elevation.is_finite() {
            return Err(Error::InvalidParameter {
                name: "elevation",
                value: elevation.to_string(),
                reason: "must be finite".into(),
            });
        }
        if geometry.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(Error::InvalidGeometry("non-finite coordinate".into()));
        }
        let bbox = BoundingBox::of_line(&geometry)
            .ok_or_else(|| Error::InvalidGeometry("contour without vertices".into()))?;

        let id = self.contours.len();
        self.contours.push(Contour {
            id,
            elevation,
            geometry,
            bbox,
            peak: Cell::new(PeakStatus::Unknown),
        });
        Ok(id)
    }

    /// Build a store from `(elevation, line)` pairs, skipping unusable parts
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = (f64, LineString<f64>)>,
    {
        let mut store = Self::new();
        for (elevation, line) in lines {
            if let Err(e) = store.push(elevation, line) {
                warn!("skipping contour: {}", e);
            }
        }
        store
    }

    pub fn get(&self, id: ContourId) -> Option<&Contour> {
        self.contours.get(id)
    }

    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contour> {
        self.contours.iter()
    }
}

/// Load contour features into a store.
///
/// The elevation is read from `elevation_field`. Features with a missing or
/// non-numeric elevation are skipped silently (they carry no height); a
/// feature whose geometry is absent or not linear is skipped with a warning.
/// `MultiLineString` features yield one contour per part.
pub fn load_contours(features: &FeatureCollection, elevation_field: &str) -> ContourStore {
    let mut store = ContourStore::new();

    for (i, feature) in features.iter().enumerate() {
        let Some(elevation) = feature.numeric_property(elevation_field) else {
            continue;
        };

        let parts: Vec<LineString<f64>> = match &feature.geometry {
            Some(Geometry::LineString(ls)) => vec![ls.clone()],
            Some(Geometry::MultiLineString(mls)) => mls.0.clone(),
            Some(Geometry::Line(l)) => vec![LineString::from(vec![l.start, l.end])],
            Some(_) => {
                warn!("feature {}: contour geometry is not linear, skipped", i);
                continue;
            }
            None => {
                warn!("feature {}: no readable geometry, skipped", i);
                continue;
            }
        };

        for part in parts {
            if let Err(e) = store.push(elevation, part) {
                warn!("feature {}: {}", i, e);
            }
        }
    }

    debug!("loaded {} contours from {} features", store.len(), features.len());
    store
}
