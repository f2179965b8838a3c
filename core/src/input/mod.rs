use std::path::Path;

use anyhow::{bail, Result};

pub use crate::store::PolygonRecord;

pub use self::{geo_json::GeoJsonSource, shp::ShapefileSource};

pub mod geo_json;
pub mod shp;

/// A source of polygon records, e.g. a file
pub trait RecordSource {
    /// Returns an iterator over all records in a stable order. The iterator
    /// ends when the source is exhausted and yields an error if reading a
    /// record failed.
    fn records(&mut self) -> Box<dyn Iterator<Item = Result<PolygonRecord>> + '_>;
}

/// Opens the polygon file at the given path. The file format is determined
/// by the file extension: `.shp` for ESRI Shapefiles (the `.dbf` file next to
/// it holds the attributes) and `.geojson` or `.json` for GeoJSON.
pub fn open_source(path: impl AsRef<Path>) -> Result<Box<dyn RecordSource>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("shp") => Ok(Box::new(ShapefileSource::open(path)?)),
        Some("geojson") | Some("json") => Ok(Box::new(GeoJsonSource::open(path)?)),
        _ => bail!(
            "Unsupported polygon file `{}'. Expected a .shp, .geojson, or .json file.",
            path.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use assertor::{assert_that, ResultAssertion};

    use super::open_source;

    #[test]
    fn unsupported_extension() {
        assert_that!(open_source("municipalities.kml").map(|_| ())).is_err();
        assert_that!(open_source("municipalities").map(|_| ())).is_err();
    }
}
