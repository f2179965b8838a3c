use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use geo::MultiPolygon;
use shapefile::{
    dbase::{FieldValue, Record},
    Reader, Shape,
};
use tracing::warn;

use crate::store::{Attributes, PolygonRecord, Value};

use super::RecordSource;

/// Reads polygon records from an ESRI Shapefile. Geometries are read from
/// the `.shp` file and attributes from the `.dbf` file next to it. Shapes
/// other than polygons are skipped.
pub struct ShapefileSource {
    path: PathBuf,
    reader: Reader<BufReader<File>, BufReader<File>>,
}

impl ShapefileSource {
    /// Opens the shapefile at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = Reader::from_path(path)
            .with_context(|| format!("Unable to open shapefile `{}'", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            reader,
        })
    }
}

impl RecordSource for ShapefileSource {
    fn records(&mut self) -> Box<dyn Iterator<Item = Result<PolygonRecord>> + '_> {
        let path = &self.path;
        Box::new(
            self.reader
                .iter_shapes_and_records()
                .enumerate()
                .filter_map(move |(i, r)| {
                    let (shape, record) = match r.with_context(|| {
                        format!("Unable to read record {i} of `{}'", path.display())
                    }) {
                        Ok(r) => r,
                        Err(e) => return Some(Err(e)),
                    };
                    let polygons = to_multi_polygon(shape, i)?;
                    Some(Ok(PolygonRecord::new(polygons, to_attributes(record))))
                }),
        )
    }
}

fn to_multi_polygon(shape: Shape, index: usize) -> Option<MultiPolygon> {
    match shape {
        Shape::Polygon(p) => Some(p.into()),
        Shape::PolygonM(p) => Some(p.into()),
        Shape::PolygonZ(p) => Some(p.into()),
        other => {
            warn!(
                "Skipping record {index}: unsupported shape type {:?}",
                other.shapetype()
            );
            None
        }
    }
}

fn to_attributes(record: Record) -> Attributes {
    record
        .into_iter()
        .filter_map(|(name, field)| Some((name, to_value(field)?)))
        .collect()
}

/// Converts a dBase field. Empty and unsupported fields yield [`None`].
fn to_value(field: FieldValue) -> Option<Value> {
    match field {
        FieldValue::Character(Some(s)) | FieldValue::Memo(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| Value::from(s))
        }
        FieldValue::Numeric(Some(n)) | FieldValue::Double(n) | FieldValue::Currency(n) => {
            Some(Value::Float(n))
        }
        FieldValue::Float(Some(n)) => Some(Value::Float(n.into())),
        FieldValue::Integer(n) => Some(Value::Integer(n.into())),
        FieldValue::Logical(Some(b)) => Some(Value::from(b.to_string())),
        _ => None,
    }
}
