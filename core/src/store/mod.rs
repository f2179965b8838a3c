use std::{collections::BTreeMap, fmt};

use geo::{Coord, MultiPolygon, Rect};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    geometry::{point_in_polygon, validate_ring, MalformedGeometry},
    util::extend_rect::{bounding_rect, union_rect},
};

pub use self::value::Value;

pub mod value;

/// Named attributes of a region (e.g. the municipality name)
pub type Attributes = BTreeMap<String, Value>;

/// Stable identifier of a region. Identifiers are assigned in load order and
/// are dense, i.e. a store with `n` regions uses the identifiers `0..n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionId(pub usize);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A record produced by a polygon source: geometry plus attributes
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRecord {
    /// One or more polygons, each with an outer ring and optional holes
    pub polygons: MultiPolygon,

    /// The record's attributes
    pub attributes: Attributes,
}

impl PolygonRecord {
    /// Create a new record
    pub fn new(polygons: impl Into<MultiPolygon>, attributes: Attributes) -> Self {
        Self {
            polygons: polygons.into(),
            attributes,
        }
    }
}

/// A loaded region with a cached bounding box
#[derive(Debug, Clone)]
pub struct Region {
    polygons: MultiPolygon,
    attributes: Attributes,
    bbox: Option<Rect>,
    malformed: Option<MalformedGeometry>,
}

impl Region {
    fn from_record(record: PolygonRecord) -> Self {
        // polygons with a malformed outer ring never match anything, so
        // they don't contribute to the bounding box either
        let mut first_error = None;
        let mut usable = Vec::new();
        for p in &record.polygons {
            match validate_ring(&p.exterior().0) {
                Ok(()) => usable.push(p),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        let malformed = if usable.is_empty() {
            Some(first_error.unwrap_or(MalformedGeometry::NoPolygons))
        } else {
            None
        };
        let bbox = bounding_rect(usable.iter().flat_map(|p| p.exterior().0.iter().copied()));

        Self {
            polygons: record.polygons,
            attributes: record.attributes,
            bbox,
            malformed,
        }
    }

    /// The region's polygons
    pub fn polygons(&self) -> &MultiPolygon {
        &self.polygons
    }

    /// All attributes of the region
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Get a single attribute
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// The bounding box of all usable polygons or [`None`] if the region is
    /// malformed
    pub fn bounding_box(&self) -> Option<Rect> {
        self.bbox
    }

    /// Why the region cannot be matched, if it cannot
    pub fn malformed(&self) -> Option<MalformedGeometry> {
        self.malformed
    }

    /// Checks if any of the region's polygons contains `point`. Fails if
    /// the region has no usable polygon.
    pub fn contains(&self, point: Coord) -> Result<bool, MalformedGeometry> {
        if let Some(e) = self.malformed {
            return Err(e);
        }
        Ok(self.polygons.iter().any(|p| point_in_polygon(point, p)))
    }
}

/// Errors that make a load unusable
#[derive(Error, Debug)]
pub enum LoadError {
    /// The source failed before it produced a single record
    #[error("unable to read polygon source")]
    Source(#[source] anyhow::Error),

    /// The source did not contain any record
    #[error("polygon source does not contain any records")]
    Empty,

    /// All records were read but none of them has usable geometry
    #[error("none of the {0} regions in the polygon source has usable geometry")]
    NoUsableRegions(usize),
}

/// Summary of a successful load
#[derive(Debug)]
pub struct LoadReport {
    /// Number of regions in the store
    pub loaded: usize,

    /// Number of regions that will never be matched because their geometry
    /// is malformed
    pub malformed: usize,

    /// If the source failed after some records had been read, the error
    /// that stopped the load. The store only contains the records read
    /// before it.
    pub interrupted: Option<anyhow::Error>,
}

impl LoadReport {
    /// Checks if the source stopped early
    pub fn is_partial(&self) -> bool {
        self.interrupted.is_some()
    }
}

/// The result of [`PolygonStore::load()`]
#[derive(Debug)]
pub struct Loaded {
    pub store: PolygonStore,
    pub report: LoadReport,
}

/// Immutable, ordered collection of regions
#[derive(Debug)]
pub struct PolygonStore {
    regions: Vec<Region>,
    extent: Option<Rect>,
}

impl PolygonStore {
    /// Reads all records from the given stream in order and assigns each one
    /// the next free [`RegionId`]. An error before the first record or an
    /// empty stream fails the load, and so does a stream in which no region
    /// has usable geometry. An error after the first record ends the load
    /// early and is returned in [`LoadReport::interrupted`].
    pub fn load<I, E>(records: I) -> Result<Loaded, LoadError>
    where
        I: IntoIterator<Item = Result<PolygonRecord, E>>,
        E: Into<anyhow::Error>,
    {
        let mut regions = Vec::new();
        let mut malformed = 0;
        let mut interrupted = None;

        for record in records {
            match record {
                Ok(record) => {
                    let region = Region::from_record(record);
                    if let Some(err) = region.malformed() {
                        warn!(
                            id = regions.len(),
                            "Region will never be matched: {err}"
                        );
                        malformed += 1;
                    }
                    regions.push(region);
                }
                Err(err) if regions.is_empty() => return Err(LoadError::Source(err.into())),
                Err(err) => {
                    interrupted = Some(err.into());
                    break;
                }
            }
        }

        if regions.is_empty() {
            return Err(LoadError::Empty);
        }

        let Some(extent) = union_rect(regions.iter().filter_map(|r| r.bbox.as_ref())) else {
            return Err(LoadError::NoUsableRegions(regions.len()));
        };
        let loaded = regions.len();
        info!(loaded, malformed, partial = interrupted.is_some(), "Loaded regions");

        Ok(Loaded {
            store: PolygonStore {
                regions,
                extent: Some(extent),
            },
            report: LoadReport {
                loaded,
                malformed,
                interrupted,
            },
        })
    }

    /// Get the region with the given identifier
    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.0)
    }

    /// The number of regions
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Checks if the store has no regions. Never true for a store returned
    /// by [`PolygonStore::load()`].
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Iterates over all regions in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &Region)> + '_ {
        self.regions
            .iter()
            .enumerate()
            .map(|(i, r)| (RegionId(i), r))
    }

    /// The union of all bounding boxes of usable regions. Always present
    /// for a store returned by [`PolygonStore::load()`].
    pub fn extent(&self) -> Option<Rect> {
        self.extent
    }
}
