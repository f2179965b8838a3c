use std::{fs::File, io::BufReader, io::Read, path::Path};

use anyhow::{bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use tracing::warn;

use crate::store::{Attributes, PolygonRecord, Value};

use super::RecordSource;

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, JsonValue>>,
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: JsonValue,
}

/// Reads polygon records from a GeoJSON FeatureCollection. Features with a
/// `Polygon` or `MultiPolygon` geometry become records, all other features
/// are skipped.
pub struct GeoJsonSource {
    features: Vec<Feature>,
}

impl GeoJsonSource {
    /// Opens and parses the GeoJSON file at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Unable to open GeoJSON file `{}'", path.display()))?;
        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("Unable to parse GeoJSON file `{}'", path.display()))
    }

    /// Parses a GeoJSON FeatureCollection
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let collection: FeatureCollection = serde_json::from_reader(reader)?;
        Ok(Self {
            features: collection.features,
        })
    }
}

impl RecordSource for GeoJsonSource {
    fn records(&mut self) -> Box<dyn Iterator<Item = Result<PolygonRecord>> + '_> {
        Box::new(
            self.features
                .drain(..)
                .enumerate()
                .filter_map(|(i, feature)| {
                    to_record(feature)
                        .with_context(|| format!("Invalid feature at index {i}"))
                        .transpose()
                }),
        )
    }
}

fn to_record(feature: Feature) -> Result<Option<PolygonRecord>> {
    let Some(geometry) = feature.geometry else {
        warn!("Skipping feature without geometry");
        return Ok(None);
    };

    let polygons = match geometry.kind.as_str() {
        "Polygon" => {
            let rings: Vec<Vec<Vec<f64>>> = serde_json::from_value(geometry.coordinates)?;
            MultiPolygon::new(vec![to_polygon(rings)?])
        }
        "MultiPolygon" => {
            let polygons: Vec<Vec<Vec<Vec<f64>>>> =
                serde_json::from_value(geometry.coordinates)?;
            MultiPolygon::new(
                polygons
                    .into_iter()
                    .map(to_polygon)
                    .collect::<Result<Vec<_>>>()?,
            )
        }
        other => {
            warn!("Skipping feature with unsupported geometry type `{other}'");
            return Ok(None);
        }
    };

    let attributes = feature
        .properties
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| Some((k, to_value(v)?)))
        .collect::<Attributes>();

    Ok(Some(PolygonRecord::new(polygons, attributes)))
}

/// Converts GeoJSON rings (outer ring first) into a polygon. Positions may
/// have more than two dimensions; only x and y are used.
fn to_polygon(rings: Vec<Vec<Vec<f64>>>) -> Result<Polygon> {
    let mut rings = rings.into_iter().map(|ring| {
        ring.into_iter()
            .map(|position| match position[..] {
                [x, y, ..] => Ok(Coord { x, y }),
                _ => bail!("Position has fewer than two coordinates"),
            })
            .collect::<Result<Vec<_>>>()
            .map(LineString::new)
    });
    let exterior = rings.next().transpose()?.unwrap_or_else(|| LineString::new(vec![]));
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn to_value(v: JsonValue) -> Option<Value> {
    match v {
        JsonValue::String(s) if !s.trim().is_empty() => Some(Value::String(s)),
        JsonValue::Number(n) => n
            .as_i64()
            .map(Value::Integer)
            .or_else(|| n.as_f64().map(Value::Float)),
        JsonValue::Bool(b) => Some(Value::String(b.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use assertor::{assert_that, BooleanAssertion, EqualityAssertion, ResultAssertion};
    use geo::{coord, polygon, MultiPolygon};
    use pretty_assertions::assert_eq;

    use crate::{
        input::RecordSource,
        store::{PolygonRecord, Value},
    };

    use super::GeoJsonSource;

    fn records(json: &str) -> Vec<anyhow::Result<PolygonRecord>> {
        GeoJsonSource::from_reader(json.as_bytes())
            .unwrap()
            .records()
            .collect()
    }

    #[test]
    fn polygon_and_multi_polygon() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "NM_MUN": "Goiânia", "CD_MUN": 5208707, "AREA_KM2": 728.84 },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [
                            [[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]],
                            [[4, 4, 100], [6, 4, 100], [6, 6, 100], [4, 6, 100], [4, 4, 100]]
                        ]
                    }
                },
                {
                    "type": "Feature",
                    "properties": { "name": "Islands", "capital": false, "note": null },
                    "geometry": {
                        "type": "MultiPolygon",
                        "coordinates": [
                            [[[20, 0], [21, 0], [21, 1], [20, 0]]],
                            [[[30, 0], [31, 0], [31, 1], [30, 0]]]
                        ]
                    }
                }
            ]
        }"#;
        let records = records(json)
            .into_iter()
            .collect::<anyhow::Result<Vec<_>>>()
            .unwrap();
        assert_that!(records.len()).is_equal_to(2);

        assert_eq!(
            records[0].polygons,
            MultiPolygon::new(vec![polygon!(
                exterior: [
                    (x: 0.0, y: 0.0),
                    (x: 10.0, y: 0.0),
                    (x: 10.0, y: 10.0),
                    (x: 0.0, y: 10.0),
                    (x: 0.0, y: 0.0),
                ],
                interiors: [
                    [
                        (x: 4.0, y: 4.0),
                        (x: 6.0, y: 4.0),
                        (x: 6.0, y: 6.0),
                        (x: 4.0, y: 6.0),
                        (x: 4.0, y: 4.0),
                    ],
                ],
            )])
        );
        assert_eq!(
            records[0].attributes,
            [
                ("AREA_KM2".to_string(), Value::Float(728.84)),
                ("CD_MUN".to_string(), Value::Integer(5208707)),
                ("NM_MUN".to_string(), Value::from("Goiânia")),
            ]
            .into()
        );

        assert_that!(records[1].polygons.0.len()).is_equal_to(2);
        assert_that!(records[1].polygons.0[1].exterior().0[0] == coord! { x: 30.0, y: 0.0 })
            .is_true();
        assert_eq!(
            records[1].attributes,
            [
                ("capital".to_string(), Value::from("false")),
                ("name".to_string(), Value::from("Islands")),
            ]
            .into()
        );
    }

    #[test]
    fn skips_other_geometries() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": {}, "geometry": { "type": "Point", "coordinates": [1, 2] } },
                { "type": "Feature", "properties": {}, "geometry": null },
                {
                    "type": "Feature",
                    "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [1, 0], [0, 1]]] }
                }
            ]
        }"#;
        let records = records(json);
        assert_that!(records.len()).is_equal_to(1);
        assert_that!(records[0].as_ref().unwrap().attributes.is_empty()).is_true();
    }

    #[test]
    fn invalid_coordinates() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [1, 0], [0, 1]]] }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Polygon", "coordinates": [[[0], [1, 0], [0, 1]]] }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Polygon", "coordinates": "nope" }
                }
            ]
        }"#;
        let records = records(json);
        assert_that!(records.len()).is_equal_to(3);
        assert_that!(records[0]).is_ok();
        assert_that!(records[1]).is_err();
        assert_that!(records[2]).is_err();
    }

    #[test]
    fn not_a_feature_collection() {
        assert_that!(GeoJsonSource::from_reader("[1, 2, 3]".as_bytes()).map(|_| ())).is_err();
    }
}
