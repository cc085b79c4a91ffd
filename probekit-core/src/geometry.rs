//! Probe geometry: data-space points, integer pixels and rectangles.

use crate::convert::{clamp_edge, clamp_index, f64_to_i64, usize_to_f64};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rounds a data coordinate to the nearest pixel index.
///
/// Ties go to the even neighbour, so `12.5` maps to `12` and `13.5` to `14`.
#[inline]
#[must_use]
pub fn round_coord(value: f64) -> i64 {
    f64_to_i64(value.round_ties_even())
}

/// A pointer position in data coordinates (column, row).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DataPoint {
    /// Horizontal coordinate (column axis).
    pub x: f64,
    /// Vertical coordinate (row axis).
    pub y: f64,
}

impl DataPoint {
    /// Creates a new data point.
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Rounds to a pixel clamped into a `width` x `height` raster.
    #[must_use]
    pub fn to_pixel(self, width: usize, height: usize) -> Pixel {
        Pixel {
            x: clamp_index(round_coord(self.x), width),
            y: clamp_index(round_coord(self.y), height),
        }
    }
}

/// Integer pixel position (column, row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pixel {
    /// Column.
    pub x: usize,
    /// Row.
    pub y: usize,
}

impl Pixel {
    /// Creates a new pixel position.
    #[inline]
    #[must_use]
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Returns the pixel as a data point.
    #[must_use]
    pub fn to_data(self) -> DataPoint {
        DataPoint::new(usize_to_f64(self.x), usize_to_f64(self.y))
    }
}

/// Normalized integer box `[x0, x1) x [y0, y1)` inside a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    /// Left edge (inclusive).
    pub x0: usize,
    /// Top edge (inclusive).
    pub y0: usize,
    /// Right edge (exclusive).
    pub x1: usize,
    /// Bottom edge (exclusive).
    pub y1: usize,
}

impl Bounds {
    /// Creates bounds from two corners in any order.
    #[must_use]
    pub fn new(x0: usize, y0: usize, x1: usize, y1: usize) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Bounds covering a whole `width` x `height` raster.
    #[must_use]
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.x1 - self.x0
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.y1 - self.y0
    }

    /// Pixel area.
    #[inline]
    #[must_use]
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// True when either side has zero length.
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.x0 == self.x1 || self.y0 == self.y1
    }

    /// Shrinks the bounds so they fit inside a `width` x `height` raster.
    #[must_use]
    pub fn clamped(&self, width: usize, height: usize) -> Self {
        let x0 = self.x0.min(width);
        let y0 = self.y0.min(height);
        Self {
            x0,
            y0,
            x1: self.x1.clamp(x0, width),
            y1: self.y1.clamp(y0, height),
        }
    }
}

/// Rectangle anchored at `(x, y)` with signed extent.
///
/// Width and height go negative while the pointer is dragged up or left
/// of the anchor; [`Rect::normalized`] resolves this into [`Bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// Anchor column.
    pub x: f64,
    /// Anchor row.
    pub y: f64,
    /// Signed width.
    pub w: f64,
    /// Signed height.
    pub h: f64,
}

impl Rect {
    /// Creates a rectangle.
    #[must_use]
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Zero-size rectangle at a point.
    #[must_use]
    pub fn at(point: DataPoint) -> Self {
        Self::new(point.x, point.y, 0.0, 0.0)
    }

    /// Rectangle spanning the given bounds.
    #[must_use]
    pub fn from_bounds(bounds: Bounds) -> Self {
        Self::new(
            usize_to_f64(bounds.x0),
            usize_to_f64(bounds.y0),
            usize_to_f64(bounds.width()),
            usize_to_f64(bounds.height()),
        )
    }

    /// Sets the extent so the opposite corner sits at `pointer`.
    pub fn resize_to(&mut self, pointer: DataPoint) {
        self.w = pointer.x - self.x;
        self.h = pointer.y - self.y;
    }

    /// Moves the anchor, keeping the extent.
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    /// Unsigned area in data units.
    #[must_use]
    pub fn area(&self) -> f64 {
        (self.w * self.h).abs()
    }

    /// Minimum and maximum corners.
    #[must_use]
    pub fn corners(&self) -> (DataPoint, DataPoint) {
        let (x0, x1) = if self.w >= 0.0 {
            (self.x, self.x + self.w)
        } else {
            (self.x + self.w, self.x)
        };
        let (y0, y1) = if self.h >= 0.0 {
            (self.y, self.y + self.h)
        } else {
            (self.y + self.h, self.y)
        };
        (DataPoint::new(x0, y0), DataPoint::new(x1, y1))
    }

    /// True if the point lies inside or on the edge.
    #[must_use]
    pub fn contains(&self, point: DataPoint) -> bool {
        let (min, max) = self.corners();
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    /// Rounds the anchor and extent, orders the corners and clamps them
    /// into a `width` x `height` raster.
    #[must_use]
    pub fn normalized(&self, width: usize, height: usize) -> Bounds {
        let x = round_coord(self.x);
        let y = round_coord(self.y);
        let w = round_coord(self.w);
        let h = round_coord(self.h);

        let (x0, x1) = if w > 0 { (x, x + w) } else { (x + w, x) };
        let (y0, y1) = if h > 0 { (y, y + h) } else { (y + h, y) };

        let x0 = clamp_edge(x0, width);
        let y0 = clamp_edge(y0, height);
        Bounds {
            x0,
            y0,
            x1: clamp_edge(x1, width).max(x0),
            y1: clamp_edge(y1, height).max(y0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_round_coord_ties_even() {
        assert_eq!(round_coord(12.6), 13);
        assert_eq!(round_coord(40.2), 40);
        assert_eq!(round_coord(12.5), 12);
        assert_eq!(round_coord(13.5), 14);
        assert_eq!(round_coord(-0.4), 0);
    }

    #[test]
    fn test_normalized_forward_drag() {
        let mut rect = Rect::at(DataPoint::new(10.0, 10.0));
        rect.resize_to(DataPoint::new(30.0, 25.0));
        assert_eq!(rect.normalized(50, 50), Bounds::new(10, 10, 30, 25));
    }

    #[test]
    fn test_normalized_backward_drag() {
        let mut rect = Rect::at(DataPoint::new(30.0, 25.0));
        rect.resize_to(DataPoint::new(10.0, 10.0));
        let bounds = rect.normalized(50, 50);
        assert_eq!(bounds, Bounds::new(10, 10, 30, 25));
        assert_eq!(bounds.area(), 300);
    }

    #[test]
    fn test_normalized_clamps_to_raster() {
        let rect = Rect::new(40.0, -5.0, 30.0, 20.0);
        assert_eq!(rect.normalized(50, 50), Bounds::new(40, 0, 50, 15));

        let outside = Rect::new(70.0, 70.0, 5.0, 5.0);
        let bounds = outside.normalized(50, 50);
        assert_eq!(bounds, Bounds::new(50, 50, 50, 50));
        assert!(bounds.is_degenerate());
    }

    #[test]
    fn test_contains_signed_extent() {
        let rect = Rect::new(20.0, 20.0, -10.0, -5.0);
        assert!(rect.contains(DataPoint::new(15.0, 17.0)));
        assert!(rect.contains(DataPoint::new(10.0, 15.0)));
        assert!(!rect.contains(DataPoint::new(21.0, 17.0)));
        assert_relative_eq!(rect.area(), 50.0);
    }

    #[test]
    fn test_bounds_clamped() {
        let bounds = Bounds::new(5, 5, 80, 60).clamped(50, 40);
        assert_eq!(bounds, Bounds::new(5, 5, 50, 40));
    }

    #[test]
    fn test_data_point_to_pixel() {
        let pixel = DataPoint::new(49.7, -0.2).to_pixel(50, 50);
        assert_eq!(pixel, Pixel::new(49, 0));
    }
}
