//! Point-in-ring and point-in-polygon tests.
//!
//! Rings are tested with a crossing-number (ray casting) test. An edge is
//! counted iff exactly one of its endpoints satisfies `y <= point.y`, so a
//! ray passing through a vertex is never counted twice. Points lying exactly
//! on an edge are detected separately and classified with [`Boundary`].
//!
//! Polygons are closed sets: a point on the outer ring or on the boundary of
//! a hole is contained in the polygon.

use geo::{Coord, LineString, Polygon};
use rustc_hash::FxHashSet;
use thiserror::Error;

/// How a point lying exactly on a ring's edge is classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Inside,
    Outside,
}

/// Reasons why geometry cannot be used for containment tests
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedGeometry {
    #[error("ring has {0} distinct vertices but at least 3 are required")]
    TooFewVertices(usize),

    #[error("ring contains a non-finite coordinate")]
    NonFiniteCoordinate,

    #[error("geometry contains no polygon with a usable outer ring")]
    NoPolygons,
}

/// Returns the ring's vertices without a closing duplicate of the first one
fn open_vertices(ring: &[Coord]) -> &[Coord] {
    match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

/// Iterates over all edges of the ring including the closing one
fn edges(vertices: &[Coord]) -> impl Iterator<Item = (Coord, Coord)> + '_ {
    vertices
        .iter()
        .copied()
        .zip(vertices.iter().copied().cycle().skip(1))
}

fn on_segment(p: Coord, a: Coord, b: Coord) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    cross == 0.0
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y)
        && p.y <= a.y.max(b.y)
}

/// Checks if the ring can support a containment test. A ring must have at
/// least three distinct vertices, all of them finite. It may or may not
/// repeat its first vertex at the end.
pub fn validate_ring(ring: &[Coord]) -> Result<(), MalformedGeometry> {
    let vertices = open_vertices(ring);
    if vertices
        .iter()
        .any(|c| !c.x.is_finite() || !c.y.is_finite())
    {
        return Err(MalformedGeometry::NonFiniteCoordinate);
    }

    // adding 0.0 turns -0.0 into 0.0 so both map to the same key
    let distinct = vertices
        .iter()
        .map(|c| ((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits()))
        .collect::<FxHashSet<_>>()
        .len();
    if distinct < 3 {
        return Err(MalformedGeometry::TooFewVertices(distinct));
    }

    Ok(())
}

/// Checks if `point` lies inside the closed `ring`. Points on an edge are
/// classified according to `boundary`. Malformed rings (see
/// [`validate_ring`]) and non-finite points never lie inside.
pub fn point_in_ring(point: Coord, ring: &LineString, boundary: Boundary) -> bool {
    if !point.x.is_finite() || !point.y.is_finite() || validate_ring(&ring.0).is_err() {
        return false;
    }

    let mut inside = false;
    for (a, b) in edges(open_vertices(&ring.0)) {
        if on_segment(point, a, b) {
            return boundary == Boundary::Inside;
        }
        if (a.y <= point.y) != (b.y <= point.y) {
            let x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Checks if `point` lies inside the polygon: inside (or on) the outer ring
/// and not strictly inside any hole. Malformed holes are ignored.
pub fn point_in_polygon(point: Coord, polygon: &Polygon) -> bool {
    point_in_ring(point, polygon.exterior(), Boundary::Inside)
        && !polygon
            .interiors()
            .iter()
            .any(|hole| point_in_ring(point, hole, Boundary::Outside))
}
