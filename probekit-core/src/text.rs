//! Plain-text round-trip formats for probe positions.
//!
//! - line columns: `"12 45 130"`
//! - rectangle bounds: `"x0=10 y0=5 x1=80 y1=60"`, empty meaning "delete"
//! - points: `"(12, 5) (30, 7)"`

use crate::error::{Error, Result};
use crate::geometry::{Bounds, Pixel};

const BOUND_KEYS: [&str; 4] = ["x0", "y0", "x1", "y1"];

/// Formats line columns as space-separated integers.
#[must_use]
pub fn format_positions(positions: &[usize]) -> String {
    positions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses space-separated line columns.
///
/// An empty or blank string is an empty list.
///
/// # Errors
/// Returns [`Error::InputParse`] if any token is not a non-negative integer.
pub fn parse_positions(text: &str) -> Result<Vec<usize>> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<usize>()
                .map_err(|_| Error::parse(text, format!("{token:?} is not a column index")))
        })
        .collect()
}

/// Formats bounds in the fixed `x0= y0= x1= y1=` order.
#[must_use]
pub fn format_bounds(bounds: &Bounds) -> String {
    format!(
        "x0={} y0={} x1={} y1={}",
        bounds.x0, bounds.y0, bounds.x1, bounds.y1
    )
}

/// Parses bounds text.
///
/// Returns `Ok(None)` for blank text, which callers treat as a request to
/// delete the current region.
///
/// # Errors
/// Returns [`Error::InputParse`] if the keys are missing, out of order, or
/// the values are not non-negative integers.
pub fn parse_bounds(text: &str) -> Result<Option<Bounds>> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(None);
    }
    if tokens.len() != BOUND_KEYS.len() {
        return Err(Error::parse(
            text,
            format!("expected 4 fields, found {}", tokens.len()),
        ));
    }

    let mut values = [0usize; 4];
    for ((token, key), slot) in tokens.iter().zip(BOUND_KEYS).zip(values.iter_mut()) {
        let Some((name, value)) = token.split_once('=') else {
            return Err(Error::parse(text, format!("{token:?} is not key=value")));
        };
        if name != key {
            return Err(Error::parse(text, format!("expected {key}, found {name}")));
        }
        *slot = value
            .parse()
            .map_err(|_| Error::parse(text, format!("{key} value {value:?} is not an integer")))?;
    }

    let [x0, y0, x1, y1] = values;
    Ok(Some(Bounds::new(x0, y0, x1, y1)))
}

/// Formats points as `(x, y)` pairs separated by spaces.
#[must_use]
pub fn format_points(points: &[Pixel]) -> String {
    points
        .iter()
        .map(|p| format!("({}, {})", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses `(x, y)` pairs.
///
/// # Errors
/// Returns [`Error::InputParse`] for unbalanced parentheses or non-integer
/// coordinates.
pub fn parse_points(text: &str) -> Result<Vec<Pixel>> {
    let mut points = Vec::new();
    let mut rest = text.trim();
    while !rest.is_empty() {
        let Some(body) = rest.strip_prefix('(') else {
            return Err(Error::parse(text, format!("expected '(' at {rest:?}")));
        };
        let Some((pair, tail)) = body.split_once(')') else {
            return Err(Error::parse(text, "unclosed '('"));
        };
        let Some((x, y)) = pair.split_once(',') else {
            return Err(Error::parse(text, format!("{pair:?} is not an x, y pair")));
        };
        let x = x
            .trim()
            .parse()
            .map_err(|_| Error::parse(text, format!("{x:?} is not a column index")))?;
        let y = y
            .trim()
            .parse()
            .map_err(|_| Error::parse(text, format!("{y:?} is not a row index")))?;
        points.push(Pixel::new(x, y));
        rest = tail.trim_start();
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_round_trip() {
        let positions = vec![12, 45, 130, 45, 0];
        let text = format_positions(&positions);
        assert_eq!(text, "12 45 130 45 0");
        assert_eq!(parse_positions(&text).unwrap(), positions);
    }

    #[test]
    fn test_positions_blank_is_empty() {
        assert!(parse_positions("   ").unwrap().is_empty());
        assert_eq!(format_positions(&[]), "");
    }

    #[test]
    fn test_positions_reject_garbage() {
        assert!(matches!(
            parse_positions("12 x4 5"),
            Err(Error::InputParse { .. })
        ));
        assert!(parse_positions("-3").is_err());
    }

    #[test]
    fn test_bounds_round_trip() {
        let bounds = Bounds::new(10, 5, 80, 60);
        let text = format_bounds(&bounds);
        assert_eq!(text, "x0=10 y0=5 x1=80 y1=60");
        assert_eq!(parse_bounds(&text).unwrap(), Some(bounds));
    }

    #[test]
    fn test_bounds_empty_means_delete() {
        assert_eq!(parse_bounds("").unwrap(), None);
    }

    #[test]
    fn test_bounds_reorders_corners() {
        let parsed = parse_bounds("x0=30 y0=25 x1=10 y1=10").unwrap();
        assert_eq!(parsed, Some(Bounds::new(10, 10, 30, 25)));
    }

    #[test]
    fn test_bounds_reject_wrong_keys() {
        assert!(parse_bounds("y0=1 x0=2 x1=3 y1=4").is_err());
        assert!(parse_bounds("x0=1 y0=2 x1=3").is_err());
        assert!(parse_bounds("x0=1 y0=2 x1=3 y1=a").is_err());
    }

    #[test]
    fn test_points_round_trip() {
        let points = vec![Pixel::new(12, 5), Pixel::new(30, 7)];
        let text = format_points(&points);
        assert_eq!(text, "(12, 5) (30, 7)");
        assert_eq!(parse_points(&text).unwrap(), points);
    }

    #[test]
    fn test_points_reject_unbalanced() {
        assert!(parse_points("(1, 2) (3, 4").is_err());
        assert!(parse_points("1, 2").is_err());
        assert!(parse_points("(1 2)").is_err());
    }
}
