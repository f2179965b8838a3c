use std::{borrow::Cow, fmt, str::FromStr};

use geo::Coord;
use serde::Deserialize;

use crate::{
    config::ConfigError,
    store::{PolygonStore, RegionId},
};

pub use self::{grid::GridIndex, linear::LinearIndex, rtree::RTreeIndex};

pub mod grid;
pub mod linear;
pub mod rtree;

/// A spatial index selects the regions that may contain a point. It is
/// built once from a [`PolygonStore`] and never changes afterwards.
pub trait SpatialIndex {
    /// Returns the identifiers of all regions whose bounding box contains
    /// `point`, in ascending order. May contain false positives but never
    /// misses a region.
    fn candidates(&self, point: Coord) -> Cow<'_, [RegionId]>;

    /// Returns statistics about the index
    fn stats(&self) -> IndexStats;
}

/// The available spatial index implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Uniform grid over the extent of all regions
    #[default]
    Grid,

    /// R-tree of region bounding boxes
    RTree,

    /// Scans the bounding boxes of all regions
    Linear,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndexKind::Grid => "grid",
            IndexKind::RTree => "rtree",
            IndexKind::Linear => "linear",
        })
    }
}

impl FromStr for IndexKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grid" => Ok(IndexKind::Grid),
            "rtree" | "r-tree" => Ok(IndexKind::RTree),
            "linear" => Ok(IndexKind::Linear),
            _ => Err(ConfigError::UnknownIndexKind(s.to_string())),
        }
    }
}

/// Statistics about a spatial index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub kind: IndexKind,

    /// Total number of stored region references. In a grid, a region is
    /// referenced once per cell it overlaps.
    pub entries: usize,

    /// Number of grid cells (0 for other indexes)
    pub cells: usize,

    /// Number of grid cells with at least one entry
    pub occupied_cells: usize,

    /// Largest number of entries in a single cell
    pub max_per_cell: usize,
}

/// Builds an index of the given kind
pub fn build_index(
    kind: IndexKind,
    store: &PolygonStore,
    target_per_cell: usize,
) -> Box<dyn SpatialIndex + Send + Sync> {
    match kind {
        IndexKind::Grid => Box::new(GridIndex::build(store, target_per_cell)),
        IndexKind::RTree => Box::new(RTreeIndex::build(store)),
        IndexKind::Linear => Box::new(LinearIndex::build(store)),
    }
}
