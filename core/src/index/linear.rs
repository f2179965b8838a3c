use std::borrow::Cow;

use geo::{Coord, Rect};

use crate::{
    store::{PolygonStore, RegionId},
    util::extend_rect::ExtendRect,
};

use super::{IndexKind, IndexStats, SpatialIndex};

/// Checks the bounding boxes of all regions one after the other. Mostly
/// useful as a reference for the other indexes.
pub struct LinearIndex {
    boxes: Vec<(RegionId, Rect)>,
}

impl LinearIndex {
    pub fn build(store: &PolygonStore) -> Self {
        Self {
            boxes: store
                .iter()
                .filter_map(|(id, region)| Some((id, region.bounding_box()?)))
                .collect(),
        }
    }
}

impl SpatialIndex for LinearIndex {
    fn candidates(&self, point: Coord) -> Cow<'_, [RegionId]> {
        Cow::Owned(
            self.boxes
                .iter()
                .filter(|(_, bbox)| bbox.covers_coord(point))
                .map(|(id, _)| *id)
                .collect(),
        )
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            kind: IndexKind::Linear,
            entries: self.boxes.len(),
            cells: 0,
            occupied_cells: 0,
            max_per_cell: 0,
        }
    }
}
