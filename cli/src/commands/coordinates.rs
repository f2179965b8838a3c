use std::ops::Range;

use geo::{coord, Coord};
use thiserror::Error;
use yansi::{Condition, Paint};

/// An error in a `lat,lng` coordinate pair. Every variant carries the byte
/// range of the offending part of the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinateError {
    #[error("Coordinates must not be empty.")]
    Empty,

    #[error("Expected latitude and longitude separated by a comma.")]
    MissingComma { span: Range<usize> },

    #[error("Unexpected value after longitude.")]
    ExtraValue { span: Range<usize> },

    #[error("Invalid number.")]
    InvalidNumber { span: Range<usize> },

    #[error("Latitude must be between -90 and 90.")]
    LatitudeOutOfRange { span: Range<usize> },

    #[error("Longitude must be between -180 and 180.")]
    LongitudeOutOfRange { span: Range<usize> },
}

impl CoordinateError {
    fn span(&self) -> Option<Range<usize>> {
        match self {
            CoordinateError::Empty => None,
            CoordinateError::MissingComma { span }
            | CoordinateError::ExtraValue { span }
            | CoordinateError::InvalidNumber { span }
            | CoordinateError::LatitudeOutOfRange { span }
            | CoordinateError::LongitudeOutOfRange { span } => Some(span.clone()),
        }
    }

    /// Renders the error with the offending part of `input` underlined.
    /// Colors are used if `color` holds.
    pub fn render(&self, input: &str, color: Condition) -> String {
        let Some(span) = self.span() else {
            return self.to_string();
        };

        let msg = self.to_string();
        let before = &input[..span.start];
        let marked = &input[span.clone()];
        let after = &input[span.end..];

        // widths in characters, so the marker lines up with non-ASCII input
        let prefix = before.chars().count();
        let span_len = marked.chars().count();
        let center_prefix = ((span_len + 1) / 2).saturating_sub(1);
        let center_suffix = span_len / 2;

        format!(
            "Invalid coordinates\n\n{}{}{}\n{}{}{}{}\n{}{}{}",
            before,
            marked.red().whenever(color),
            after,
            " ".repeat(prefix),
            "─".repeat(center_prefix).red().whenever(color),
            (if span_len > 0 { "┬" } else { "│" }).red().whenever(color),
            "─".repeat(center_suffix).red().whenever(color),
            " ".repeat(prefix + center_prefix),
            "╰── ".red().whenever(color),
            msg.red().bold().whenever(color)
        )
    }
}

/// Colors are used on stdout if it is a terminal and the environment does
/// not disable them
pub fn stdout_color() -> Condition {
    Condition::from(|| Condition::stdout_is_tty() && Condition::clicolor() && Condition::no_color())
}

/// Narrows `range` of `input` so it does not start or end with whitespace
fn trimmed_span(input: &str, range: Range<usize>) -> Range<usize> {
    let s = &input[range.clone()];
    let start = range.start + (s.len() - s.trim_start().len());
    let end = range.end - (s.len() - s.trim_end().len());
    start..end.max(start)
}

fn parse_number(input: &str, span: Range<usize>) -> Result<f64, CoordinateError> {
    input[span.clone()]
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or(CoordinateError::InvalidNumber { span })
}

/// Checks that latitude and longitude are within their valid ranges and
/// returns a coordinate with x = longitude and y = latitude
pub fn validate(lat: f64, lon: f64) -> Result<Coord, CoordinateError> {
    validate_spans(lat, 0..0, lon, 0..0)
}

fn validate_spans(
    lat: f64,
    lat_span: Range<usize>,
    lon: f64,
    lon_span: Range<usize>,
) -> Result<Coord, CoordinateError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CoordinateError::LatitudeOutOfRange { span: lat_span });
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(CoordinateError::LongitudeOutOfRange { span: lon_span });
    }
    Ok(coord! { x: lon, y: lat })
}

/// Parses a `lat,lng` pair such as `-16.6799, -49.2550`
pub fn parse_coordinates(input: &str) -> Result<Coord, CoordinateError> {
    let whole = trimmed_span(input, 0..input.len());
    if whole.is_empty() {
        return Err(CoordinateError::Empty);
    }

    let Some(comma) = input.find(',') else {
        return Err(CoordinateError::MissingComma { span: whole });
    };
    if let Some(extra) = input[comma + 1..].find(',') {
        let start = comma + 1 + extra;
        return Err(CoordinateError::ExtraValue {
            span: start..whole.end,
        });
    }

    let lat_span = trimmed_span(input, 0..comma);
    let lon_span = trimmed_span(input, comma + 1..input.len());
    let lat = parse_number(input, lat_span.clone())?;
    let lon = parse_number(input, lon_span.clone())?;
    validate_spans(lat, lat_span, lon, lon_span)
}

#[cfg(test)]
mod tests {
    use assertor::{assert_that, EqualityAssertion};
    use geo::coord;
    use pretty_assertions::assert_eq;
    use yansi::Condition;

    use super::{parse_coordinates, validate, CoordinateError};

    #[test]
    fn valid() {
        assert_that!(parse_coordinates("-16.6799,-49.2550"))
            .is_equal_to(Ok(coord! { x: -49.2550, y: -16.6799 }));
        assert_that!(parse_coordinates("  -16.6799 ,  -49.2550 \n"))
            .is_equal_to(Ok(coord! { x: -49.2550, y: -16.6799 }));
        assert_that!(parse_coordinates("90,180")).is_equal_to(Ok(coord! { x: 180.0, y: 90.0 }));
        assert_that!(parse_coordinates("-90,-180"))
            .is_equal_to(Ok(coord! { x: -180.0, y: -90.0 }));
    }

    #[test]
    fn invalid() {
        assert_that!(parse_coordinates("   ")).is_equal_to(Err(CoordinateError::Empty));
        assert_that!(parse_coordinates(" -16.6 -49.2"))
            .is_equal_to(Err(CoordinateError::MissingComma { span: 1..12 }));
        assert_that!(parse_coordinates("1,2,3"))
            .is_equal_to(Err(CoordinateError::ExtraValue { span: 3..5 }));
        assert_that!(parse_coordinates("abc, 2"))
            .is_equal_to(Err(CoordinateError::InvalidNumber { span: 0..3 }));
        assert_that!(parse_coordinates("1,"))
            .is_equal_to(Err(CoordinateError::InvalidNumber { span: 2..2 }));
        assert_that!(parse_coordinates("NaN,1"))
            .is_equal_to(Err(CoordinateError::InvalidNumber { span: 0..3 }));
        assert_that!(parse_coordinates("1,inf"))
            .is_equal_to(Err(CoordinateError::InvalidNumber { span: 2..5 }));
        assert_that!(parse_coordinates("90.5, 0"))
            .is_equal_to(Err(CoordinateError::LatitudeOutOfRange { span: 0..4 }));
        assert_that!(parse_coordinates("0, -180.01"))
            .is_equal_to(Err(CoordinateError::LongitudeOutOfRange { span: 3..10 }));
    }

    #[test]
    fn validate_numbers() {
        assert_that!(validate(-16.0, -49.0)).is_equal_to(Ok(coord! { x: -49.0, y: -16.0 }));
        assert_that!(validate(-91.0, 0.0).is_err()).is_equal_to(true);
        assert_that!(validate(0.0, 181.0).is_err()).is_equal_to(true);
    }

    #[test]
    fn render() {
        let input = "-16.6, abc";
        let err = parse_coordinates(input).unwrap_err();
        assert_eq!(
            err.render(input, Condition::NEVER),
            "Invalid coordinates\n\n-16.6, abc\n       ─┬─\n        ╰── Invalid number."
        );

        assert_eq!(
            CoordinateError::Empty.render("", Condition::NEVER),
            "Coordinates must not be empty."
        );
    }

    #[test]
    fn render_empty_span() {
        let err = parse_coordinates("1,").unwrap_err();
        assert_eq!(
            err.render("1,", Condition::NEVER),
            "Invalid coordinates\n\n1,\n  │\n  ╰── Invalid number."
        );
    }
}
