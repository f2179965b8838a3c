use std::borrow::Cow;

use geo::Coord;
use rstar::{RTree, RTreeObject, AABB};

use crate::store::{PolygonStore, RegionId};

use super::{IndexKind, IndexStats, SpatialIndex};

/// A region's bounding box as stored in the tree
struct Entry {
    id: RegionId,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for Entry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// An R-tree of region bounding boxes. Better suited than [`GridIndex`]
/// if region density varies a lot across the extent.
///
/// [`GridIndex`]: super::GridIndex
pub struct RTreeIndex {
    tree: RTree<Entry>,
}

impl RTreeIndex {
    /// Bulk-loads a tree with all usable regions of the store
    pub fn build(store: &PolygonStore) -> Self {
        let entries = store
            .iter()
            .filter_map(|(id, region)| {
                let bbox = region.bounding_box()?;
                Some(Entry {
                    id,
                    envelope: AABB::from_corners(
                        [bbox.min().x, bbox.min().y],
                        [bbox.max().x, bbox.max().y],
                    ),
                })
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }
}

impl SpatialIndex for RTreeIndex {
    fn candidates(&self, point: Coord) -> Cow<'_, [RegionId]> {
        if !point.x.is_finite() || !point.y.is_finite() {
            return Cow::Borrowed(&[]);
        }
        let envelope = AABB::from_point([point.x, point.y]);
        let mut ids = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|e| e.id)
            .collect::<Vec<_>>();
        ids.sort_unstable();
        Cow::Owned(ids)
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            kind: IndexKind::RTree,
            entries: self.tree.size(),
            cells: 0,
            occupied_cells: 0,
            max_per_cell: 0,
        }
    }
}
