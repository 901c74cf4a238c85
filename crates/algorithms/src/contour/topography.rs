//! A loaded contour layer together with its spatial index

use ridgeline_core::{Error, Result};

use super::index::SpatialIndex;
use super::store::{Contour, ContourId, ContourStore};
use crate::vector::BoundingBox;

/// Contours plus the R-tree over them.
///
/// Read-only while tracing. When the source layer changes, call
/// [`Topography::rebuild`]: store and index are replaced together, never
/// patched in place.
#[derive(Debug)]
pub struct Topography {
    store: ContourStore,
    index: SpatialIndex,
}

impl Topography {
    pub fn new(store: ContourStore) -> Self {
        let index = SpatialIndex::build(&store);
        Self { store, index }
    }

    /// Replace all contours and rebuild the index from scratch
    pub fn rebuild(&mut self, store: ContourStore) {
        self.index = SpatialIndex::build(&store);
        self.store = store;
    }

    pub fn contours(&self) -> &ContourStore {
        &self.store
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn contour(&self, id: ContourId) -> Option<&Contour> {
        self.store.get(id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Fail with [`Error::EmptyTopography`] when nothing is loaded
    pub fn ensure_loaded(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::EmptyTopography);
        }
        Ok(())
    }

    /// Contours whose envelope intersects `bbox`, in ascending id order
    pub fn query<'a>(&'a self, bbox: &BoundingBox) -> impl Iterator<Item = &'a Contour> + 'a {
        self.index
            .intersecting(bbox)
            .into_iter()
            .filter_map(move |id| self.store.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::LineString;

    #[test]
    fn test_query_and_rebuild() {
        let mut topo = Topography::new(ContourStore::from_lines(vec![(
            100.0,
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]),
        )]));
        let bb = BoundingBox::new(-1.0, -1.0, 1.0, 1.0);
        assert_eq!(topo.query(&bb).count(), 1);
        assert!(topo.ensure_loaded().is_ok());

        topo.rebuild(ContourStore::from_lines(vec![(
            200.0,
            LineString::from(vec![(50.0, 50.0), (60.0, 50.0)]),
        )]));
        assert_eq!(topo.len(), 1);
        assert_eq!(topo.query(&bb).count(), 0);
        assert_eq!(topo.contour(0).unwrap().elevation(), 200.0);
        assert_eq!(topo.index().len(), 1);
    }

    #[test]
    fn test_empty_topography_is_precondition_failure() {
        let topo = Topography::new(ContourStore::new());
        assert!(matches!(topo.ensure_loaded(), Err(Error::EmptyTopography)));
    }
}
