//! Spatial index over contour envelopes
//!
//! An R-tree of contour bounding boxes answering "which contours have an
//! envelope intersecting this rectangle". It is bulk-loaded once per
//! topography and never mutated afterwards.

use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

use super::store::{ContourId, ContourStore};
use crate::vector::BoundingBox;

type Entry = GeomWithData<Rectangle<[f64; 2]>, ContourId>;

fn aabb(bbox: &BoundingBox) -> AABB<[f64; 2]> {
    AABB::from_corners([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y])
}

/// R-tree of contour bounding boxes
#[derive(Debug)]
pub struct SpatialIndex {
    tree: RTree<Entry>,
}

impl SpatialIndex {
    /// Bulk-load an index over every contour of `store`
    pub fn build(store: &ContourStore) -> Self {
        let entries: Vec<Entry> = store
            .iter()
            .map(|c| {
                let bb = c.bbox();
                GeomWithData::new(
                    Rectangle::from_corners([bb.min_x, bb.min_y], [bb.max_x, bb.max_y]),
                    c.id(),
                )
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Ids of all contours whose envelope intersects `bbox`, ascending.
    ///
    /// The ascending order makes every first-found tie-break in the tracer
    /// independent of the tree layout.
    pub fn intersecting(&self, bbox: &BoundingBox) -> Vec<ContourId> {
        let mut ids: Vec<ContourId> = self
            .tree
            .locate_in_envelope_intersecting(&aabb(bbox))
            .map(|entry| entry.data)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
