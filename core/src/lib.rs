//! Point-location engine for administrative regions: given a coordinate,
//! find the polygon that contains it.
//!
//! Polygons are read by an [`input::RecordSource`] into an immutable
//! [`PolygonStore`]. A [`Locator`] builds a spatial index over the store and
//! answers queries by refining the index's candidates with an exact
//! point-in-polygon test.

pub mod batch;
pub mod config;
pub mod geometry;
pub mod index;
pub mod input;
pub mod locator;
pub mod store;
pub mod util;

#[cfg(test)]
mod test_util;

pub use config::LocatorConfig;
pub use locator::{Attribute, Locator, Match};
pub use store::{LoadError, LoadReport, Loaded, PolygonRecord, PolygonStore, Region, RegionId};
