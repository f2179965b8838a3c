use geo::{Coord, Rect};

/// Trait to grow bounding rectangles and test them against points
///
/// # Examples
///
/// ```rust
/// use geo::{coord, Rect};
/// use muniloc_core::util::extend_rect::ExtendRect;
///
/// let mut bb = Rect::new(
///     coord! { x: -49.3, y: -16.7 },
///     coord! { x: -49.3, y: -16.7 }
/// );
///
/// bb.extend_coord(coord! { x: -49.1, y: -16.5 });
/// assert_eq!(bb.min(), coord! { x: -49.3, y: -16.7 });
/// assert_eq!(bb.max(), coord! { x: -49.1, y: -16.5 });
///
/// assert!(bb.covers_coord(coord! { x: -49.2, y: -16.6 }));
/// assert!(bb.covers_coord(coord! { x: -49.1, y: -16.6 }));
/// assert!(!bb.covers_coord(coord! { x: -49.0, y: -16.6 }));
/// ```
///
/// ```rust
/// use geo::{coord, Rect};
/// use muniloc_core::util::extend_rect::ExtendRect;
///
/// let mut bb1 = Rect::new(
///     coord! { x: 1.0, y: 2.0 },
///     coord! { x: 4.0, y: 5.0 }
/// );
/// let bb2 = Rect::new(
///     coord! { x: 40.0, y: 50.0 },
///     coord! { x: 70.0, y: 80.0 }
/// );
///
/// bb1.extend_rect(&bb2);
/// assert_eq!(bb1.min(), coord! { x: 1.0, y: 2.0 });
/// assert_eq!(bb1.max(), coord! { x: 70.0, y: 80.0 });
/// ```
pub trait ExtendRect {
    /// Extends the rectangle so it overlaps the given coordinate
    fn extend_coord(&mut self, c: Coord);

    /// Extends the rectangle so it overlaps the given other rectangle
    fn extend_rect(&mut self, other: &Rect);

    /// Checks if the coordinate lies inside the rectangle or on its edges.
    /// Always `false` for non-finite coordinates.
    fn covers_coord(&self, c: Coord) -> bool;
}

impl ExtendRect for Rect {
    fn extend_coord(&mut self, c: Coord) {
        let min = self.min();
        self.set_min((min.x.min(c.x), min.y.min(c.y)));
        let max = self.max();
        self.set_max((max.x.max(c.x), max.y.max(c.y)));
    }

    fn extend_rect(&mut self, other: &Rect) {
        self.extend_coord(other.min());
        self.extend_coord(other.max());
    }

    fn covers_coord(&self, c: Coord) -> bool {
        let min = self.min();
        let max = self.max();
        c.x >= min.x && c.x <= max.x && c.y >= min.y && c.y <= max.y
    }
}

/// Computes the smallest rectangle enclosing all finite coordinates. Returns
/// [`None`] if there are none.
pub fn bounding_rect<I>(coords: I) -> Option<Rect>
where
    I: IntoIterator<Item = Coord>,
{
    let mut result: Option<Rect> = None;
    for c in coords
        .into_iter()
        .filter(|c| c.x.is_finite() && c.y.is_finite())
    {
        match &mut result {
            Some(r) => r.extend_coord(c),
            None => result = Some(Rect::new(c, c)),
        }
    }
    result
}

/// Computes the union of the given rectangles
pub fn union_rect<'a, I>(rects: I) -> Option<Rect>
where
    I: IntoIterator<Item = &'a Rect>,
{
    rects.into_iter().fold(None, |acc, r| match acc {
        Some(mut acc) => {
            acc.extend_rect(r);
            Some(acc)
        }
        None => Some(*r),
    })
}

#[cfg(test)]
mod tests {
    use assertor::{assert_that, BooleanAssertion, OptionAssertion};
    use geo::{coord, Rect};
    use pretty_assertions::assert_eq;

    use super::{bounding_rect, union_rect, ExtendRect};

    #[test]
    fn bounding_rect_skips_non_finite() {
        let r = bounding_rect([
            coord! { x: 3.0, y: 1.0 },
            coord! { x: f64::NAN, y: 100.0 },
            coord! { x: -1.0, y: f64::INFINITY },
            coord! { x: 0.0, y: 4.0 },
        ]);
        assert_eq!(
            r,
            Some(Rect::new(coord! { x: 0.0, y: 1.0 }, coord! { x: 3.0, y: 4.0 }))
        );
    }

    #[test]
    fn bounding_rect_empty() {
        assert_that!(bounding_rect([])).is_none();
        assert_that!(bounding_rect([coord! { x: f64::NAN, y: 0.0 }])).is_none();
    }

    #[test]
    fn union() {
        let a = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 });
        let b = Rect::new(coord! { x: 5.0, y: -2.0 }, coord! { x: 6.0, y: 0.5 });
        assert_eq!(
            union_rect([&a, &b]),
            Some(Rect::new(coord! { x: 0.0, y: -2.0 }, coord! { x: 6.0, y: 1.0 }))
        );
        assert_that!(union_rect([])).is_none();
    }

    #[test]
    fn covers_nan() {
        let a = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 });
        assert_that!(a.covers_coord(coord! { x: f64::NAN, y: 0.5 })).is_false();
        assert_that!(a.covers_coord(coord! { x: 0.0, y: 1.0 })).is_true();
    }
}
