use std::borrow::Cow;

use geo::{Coord, Rect};
use itertools::iproduct;
use tracing::debug;

use crate::{
    store::{PolygonStore, RegionId},
    util::extend_rect::ExtendRect,
};

use super::{IndexKind, IndexStats, SpatialIndex};

/// Default number of regions the grid aims to store per cell
pub const DEFAULT_TARGET_PER_CELL: usize = 16;

/// Upper bound for the number of cells along each axis
const MAX_RESOLUTION: usize = 1024;

/// Number of cells along each axis so that `count` regions spread over the
/// grid yield about `target_per_cell` regions per cell
fn resolution_for(count: usize, target_per_cell: usize) -> usize {
    let cells = (count as f64 / target_per_cell.max(1) as f64).sqrt().ceil();
    (cells as usize).clamp(1, MAX_RESOLUTION)
}

/// Maps an offset from the grid origin to a cell along one axis. The
/// mapping is monotone, so a point inside a bounding box always maps to a
/// cell between the cells of the box's corners.
fn axis_cell(offset: f64, cell_size: f64, resolution: usize) -> usize {
    if cell_size > 0.0 {
        ((offset / cell_size) as usize).min(resolution - 1)
    } else {
        0
    }
}

/// A uniform grid over the extent of all regions. Every cell holds the
/// identifiers of the regions whose bounding box overlaps it.
#[derive(Debug, Default)]
pub struct GridIndex {
    extent: Option<Rect>,
    resolution: usize,
    cell_width: f64,
    cell_height: f64,
    cells: Vec<Vec<RegionId>>,
}

impl GridIndex {
    /// Builds a grid for all usable regions of the store
    pub fn build(store: &PolygonStore, target_per_cell: usize) -> Self {
        let Some(extent) = store.extent() else {
            return Self::default();
        };

        let resolution = resolution_for(store.len(), target_per_cell);
        let mut grid = Self {
            extent: Some(extent),
            resolution,
            cell_width: extent.width() / resolution as f64,
            cell_height: extent.height() / resolution as f64,
            cells: vec![Vec::new(); resolution * resolution],
        };

        // regions are visited in identifier order, so every cell ends up
        // sorted
        for (id, region) in store.iter() {
            let Some(bbox) = region.bounding_box() else {
                continue;
            };
            let (min_col, min_row) = grid.cell_of(bbox.min());
            let (max_col, max_row) = grid.cell_of(bbox.max());
            for (row, col) in iproduct!(min_row..=max_row, min_col..=max_col) {
                grid.cells[row * resolution + col].push(id);
            }
        }

        let stats = grid.stats();
        debug!(
            resolution,
            entries = stats.entries,
            occupied = stats.occupied_cells,
            max_per_cell = stats.max_per_cell,
            "Built grid index"
        );

        grid
    }

    /// Number of cells along each axis (0 if the grid is empty)
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Column and row of the cell containing `c`. `c` must lie inside the
    /// extent.
    fn cell_of(&self, c: Coord) -> (usize, usize) {
        let origin = self.extent.map(|e| e.min()).unwrap_or_default();
        (
            axis_cell(c.x - origin.x, self.cell_width, self.resolution),
            axis_cell(c.y - origin.y, self.cell_height, self.resolution),
        )
    }
}

impl SpatialIndex for GridIndex {
    fn candidates(&self, point: Coord) -> Cow<'_, [RegionId]> {
        match self.extent {
            Some(extent) if extent.covers_coord(point) => {
                let (col, row) = self.cell_of(point);
                Cow::Borrowed(&self.cells[row * self.resolution + col])
            }
            _ => Cow::Borrowed(&[]),
        }
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            kind: IndexKind::Grid,
            entries: self.cells.iter().map(Vec::len).sum(),
            cells: self.cells.len(),
            occupied_cells: self.cells.iter().filter(|c| !c.is_empty()).count(),
            max_per_cell: self.cells.iter().map(Vec::len).max().unwrap_or(0),
        }
    }
}
