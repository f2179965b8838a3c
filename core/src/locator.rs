use std::{fmt, time::Instant};

use geo::{coord, Coord};
use tracing::{debug, info};

use crate::{
    config::LocatorConfig,
    index::{build_index, IndexStats, SpatialIndex},
    store::{PolygonStore, Region, RegionId, Value},
    util::extend_rect::ExtendRect,
};

/// A region found by [`Locator::locate()`]
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    pub id: RegionId,
    pub region: &'a Region,
}

impl<'a> Match<'a> {
    /// Selects the attribute to report for this region: the first of
    /// `fields` that is present with a non-blank value, or the region's
    /// identifier if there is none
    pub fn attribute<S: AsRef<str>>(&self, fields: &[S]) -> Attribute<'a> {
        let attributes = self.region.attributes();
        fields
            .iter()
            .find_map(|f| {
                let (name, value) = attributes.get_key_value(f.as_ref())?;
                (!value.is_blank()).then_some(Attribute::Field { name, value })
            })
            .unwrap_or(Attribute::Unnamed(self.id))
    }
}

/// What a query reports about the region it found
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attribute<'a> {
    /// The value of a named attribute
    Field { name: &'a str, value: &'a Value },

    /// The region has none of the configured name attributes
    Unnamed(RegionId),
}

impl fmt::Display for Attribute<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Field { value, .. } => write!(f, "{value}"),
            Attribute::Unnamed(id) => write!(f, "{id}"),
        }
    }
}

/// Finds the region containing a point. A locator owns a fully loaded
/// [`PolygonStore`] and the spatial index built from it; both are immutable,
/// so a locator can be shared between threads and queried concurrently.
pub struct Locator {
    store: PolygonStore,
    index: Box<dyn SpatialIndex + Send + Sync>,
    name_fields: Vec<String>,
}

impl Locator {
    /// Builds the spatial index selected in `config` for the given store
    pub fn build(store: PolygonStore, config: &LocatorConfig) -> Self {
        let start = Instant::now();
        let index = build_index(config.index, &store, config.target_per_cell);
        info!(
            index = %config.index,
            regions = store.len(),
            "Built spatial index in {:?}",
            start.elapsed()
        );
        Self {
            store,
            index,
            name_fields: config.name_fields.clone(),
        }
    }

    /// Returns the region containing `point` (x = longitude, y = latitude).
    /// If several regions contain it, the one with the lowest identifier
    /// wins. Regions with malformed geometry are skipped.
    pub fn locate(&self, point: Coord) -> Option<Match<'_>> {
        self.index
            .candidates(point)
            .iter()
            .find_map(|&id| self.test_candidate(id, point))
    }

    fn test_candidate(&self, id: RegionId, point: Coord) -> Option<Match<'_>> {
        let region = self.store.get(id)?;
        if let Some(bbox) = region.bounding_box() {
            if !bbox.covers_coord(point) {
                return None;
            }
        }
        match region.contains(point) {
            Ok(true) => Some(Match { id, region }),
            Ok(false) => None,
            Err(err) => {
                debug!(%id, "Skipping region: {err}");
                None
            }
        }
    }

    /// Returns the attribute to report for the region containing `point`
    pub fn locate_attribute(&self, point: Coord) -> Option<Attribute<'_>> {
        self.locate(point).map(|m| m.attribute(&self.name_fields))
    }

    /// Same as [`Locator::locate_attribute()`] but takes latitude first
    pub fn locate_lat_lon(&self, lat: f64, lon: f64) -> Option<Attribute<'_>> {
        self.locate_attribute(coord! { x: lon, y: lat })
    }

    /// Returns the attribute to report for the region with the given
    /// identifier
    pub fn attribute_of(&self, id: RegionId) -> Option<Attribute<'_>> {
        let region = self.store.get(id)?;
        Some(Match { id, region }.attribute(&self.name_fields))
    }

    /// The store queried by this locator
    pub fn store(&self) -> &PolygonStore {
        &self.store
    }

    /// Statistics about the spatial index
    pub fn index_stats(&self) -> IndexStats {
        self.index.stats()
    }

    /// The attribute names tried when reporting a region
    pub fn name_fields(&self) -> &[String] {
        &self.name_fields
    }
}

#[cfg(test)]
mod tests {
    use assertor::{assert_that, EqualityAssertion, OptionAssertion};
    use geo::{coord, polygon};
    use pretty_assertions::assert_eq;

    use crate::{
        index::IndexKind,
        store::{PolygonRecord, RegionId, Value},
        test_util::{degenerate_record, locator, square_record},
    };

    use super::Attribute;

    const KINDS: [IndexKind; 3] = [IndexKind::Grid, IndexKind::RTree, IndexKind::Linear];

    fn name(attribute: Option<Attribute>) -> Option<String> {
        attribute.map(|a| a.to_string())
    }

    #[test]
    fn square_with_hole() {
        let record = PolygonRecord::new(
            polygon!(
                exterior: [
                    (x: 0.0, y: 0.0),
                    (x: 10.0, y: 0.0),
                    (x: 10.0, y: 10.0),
                    (x: 0.0, y: 10.0),
                ],
                interiors: [
                    [
                        (x: 4.0, y: 4.0),
                        (x: 6.0, y: 4.0),
                        (x: 6.0, y: 6.0),
                        (x: 4.0, y: 6.0),
                    ],
                ],
            ),
            [("NM_MUN".to_string(), Value::from("Donut"))].into(),
        );
        for kind in KINDS {
            let l = locator(vec![record.clone()], kind, 16);
            assert_that!(name(l.locate_attribute(coord! { x: 1.0, y: 1.0 })))
                .is_equal_to(Some("Donut".to_string()));
            assert_that!(l.locate(coord! { x: 5.0, y: 5.0 }).map(|m| m.id)).is_none();
            assert_that!(l.locate(coord! { x: 15.0, y: 5.0 }).map(|m| m.id)).is_none();
        }
    }

    /// Overlapping regions always resolve to the lowest identifier, no
    /// matter how the grid is laid out
    #[test]
    fn overlap_lowest_id_wins() {
        let records = vec![
            square_record("far", 50.0, 50.0, 5.0),
            square_record("first", 0.0, 0.0, 10.0),
            square_record("second", 5.0, 5.0, 10.0),
        ];
        for kind in KINDS {
            for target in [1, 2, 16] {
                let l = locator(records.clone(), kind, target);
                for _ in 0..3 {
                    let m = l.locate(coord! { x: 7.0, y: 7.0 }).unwrap();
                    assert_that!(m.id).is_equal_to(RegionId(1));
                }
                assert_that!(l.locate(coord! { x: 12.0, y: 12.0 }).map(|m| m.id))
                    .is_equal_to(Some(RegionId(2)));
            }
        }
    }

    #[test]
    fn malformed_region_is_skipped() {
        // the degenerate ring lies inside the square
        let records = vec![degenerate_record("broken"), square_record("ok", 0.0, 0.0, 2.0)];
        for kind in KINDS {
            let l = locator(records.clone(), kind, 1);
            assert_that!(l.locate(coord! { x: 1.0, y: 1.0 }).map(|m| m.id))
                .is_equal_to(Some(RegionId(1)));
            assert_that!(l.locate(coord! { x: 3.0, y: 3.0 }).map(|m| m.id)).is_none();
        }
    }

    #[test]
    fn field_priority() {
        let record = |attrs: &[(&str, Value)]| {
            PolygonRecord::new(
                polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0)],
                attrs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            )
        };
        let l = locator(
            vec![
                record(&[("name", "c".into()), ("NOME", "b".into()), ("NM_MUN", "a".into())]),
                record(&[("name", "c".into()), ("NOME", "b".into())]),
                record(&[("name", "c".into()), ("NM_MUN", "  ".into())]),
                record(&[("CD_MUN", 5208707_i64.into())]),
            ],
            IndexKind::Linear,
            16,
        );

        let names = (0..4)
            .map(|i| name(l.attribute_of(RegionId(i))))
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                Some("a".to_string()),
                Some("b".to_string()),
                Some("c".to_string()),
                Some("#3".to_string()),
            ]
        );
        assert_eq!(
            l.attribute_of(RegionId(0)),
            Some(Attribute::Field {
                name: "NM_MUN",
                value: &Value::from("a")
            })
        );
        assert_that!(l.attribute_of(RegionId(3))).is_equal_to(Some(Attribute::Unnamed(RegionId(3))));
        assert_that!(l.attribute_of(RegionId(4))).is_none();
    }

    #[test]
    fn lat_lon_order() {
        // Goiânia, roughly
        let l = locator(vec![square_record("Goiânia", -49.5, -16.9, 0.5)], IndexKind::Grid, 16);
        assert_that!(name(l.locate_lat_lon(-16.6799, -49.2550)))
            .is_equal_to(Some("Goiânia".to_string()));
        assert_that!(l.locate_lat_lon(-49.2550, -16.6799)).is_none();
    }
}
