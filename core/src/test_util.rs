use std::convert::Infallible;

use geo::{polygon, LineString, Polygon};

use crate::{
    config::LocatorConfig,
    index::IndexKind,
    locator::Locator,
    store::{PolygonRecord, PolygonStore, Value},
};

pub fn named(name: &str, polygon: Polygon) -> PolygonRecord {
    PolygonRecord::new(polygon, [("name".to_string(), Value::from(name))].into())
}

/// An axis-aligned square with its lower left corner at `(x, y)`
pub fn square_record(name: &str, x: f64, y: f64, size: f64) -> PolygonRecord {
    named(
        name,
        Polygon::new(
            LineString::from(vec![
                (x, y),
                (x + size, y),
                (x + size, y + size),
                (x, y + size),
            ]),
            vec![],
        ),
    )
}

/// A record whose only ring has a single vertex
pub fn degenerate_record(name: &str) -> PolygonRecord {
    named(name, polygon![(x: 1.0, y: 1.0)])
}

pub fn store(records: Vec<PolygonRecord>) -> PolygonStore {
    PolygonStore::load(records.into_iter().map(Ok::<_, Infallible>))
        .unwrap()
        .store
}

pub fn locator(records: Vec<PolygonRecord>, index: IndexKind, target_per_cell: usize) -> Locator {
    let config = LocatorConfig {
        index,
        target_per_cell,
        ..Default::default()
    };
    Locator::build(store(records), &config)
}
