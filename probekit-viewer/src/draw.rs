//! Rasterization of actor primitives into RGBA framebuffers.

use image::{Rgba, RgbaImage};
use ndarray::ArrayView2;
use probekit_core::convert::{f64_to_pixel, u32_to_f64, usize_to_f64};

use crate::colormap::Colormap;

/// Half-open pixel region `[x0, x1) x [y0, y1)` of a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    /// Left column.
    pub x0: u32,
    /// Top row.
    pub y0: u32,
    /// Right column (exclusive).
    pub x1: u32,
    /// Bottom row (exclusive).
    pub y1: u32,
}

impl PixelRegion {
    /// Region covering a whole `width` x `height` buffer.
    #[must_use]
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: width,
            y1: height,
        }
    }

    /// Smallest region containing both.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    /// Clips a signed half-open box to the buffer, `None` if nothing is left.
    fn clipped(x0: i64, y0: i64, x1: i64, y1: i64, width: u32, height: u32) -> Option<Self> {
        let clip = |v: i64, max: u32| u32::try_from(v.clamp(0, i64::from(max))).unwrap_or(0);
        let region = Self {
            x0: clip(x0, width),
            y0: clip(y0, height),
            x1: clip(x1, width),
            y1: clip(y1, height),
        };
        (region.x0 < region.x1 && region.y0 < region.y1).then_some(region)
    }
}

/// Merges an optional region into an accumulator.
pub(crate) fn merge(acc: Option<PixelRegion>, next: Option<PixelRegion>) -> Option<PixelRegion> {
    match (acc, next) {
        (Some(a), Some(b)) => Some(a.union(b)),
        (a, b) => a.or(b),
    }
}

/// Fills a signed half-open box, clipped to the buffer.
pub(crate) fn fill_box(
    img: &mut RgbaImage,
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
    color: [u8; 4],
) -> Option<PixelRegion> {
    let region = PixelRegion::clipped(x0, y0, x1, y1, img.width(), img.height())?;
    for y in region.y0..region.y1 {
        for x in region.x0..region.x1 {
            img.put_pixel(x, y, Rgba(color));
        }
    }
    Some(region)
}

/// Square stroke stamp of side `width` centered on a pixel.
fn stamp(img: &mut RgbaImage, x: i64, y: i64, width: u32, color: [u8; 4]) -> Option<PixelRegion> {
    let w = i64::from(width.max(1));
    let start = w / 2;
    fill_box(img, x - start, y - start, x - start + w, y - start + w, color)
}

/// Full-height vertical line at a framebuffer column.
pub(crate) fn vline(img: &mut RgbaImage, x: f64, width: u32, color: [u8; 4]) -> Option<PixelRegion> {
    let w = i64::from(width.max(1));
    let x = f64_to_pixel(x) - w / 2;
    let height = i64::from(img.height());
    fill_box(img, x, 0, x + w, height, color)
}

/// Filled square marker.
pub(crate) fn marker(
    img: &mut RgbaImage,
    x: f64,
    y: f64,
    radius: u32,
    color: [u8; 4],
) -> Option<PixelRegion> {
    let (cx, cy, r) = (f64_to_pixel(x), f64_to_pixel(y), i64::from(radius));
    fill_box(img, cx - r, cy - r, cx + r + 1, cy + r + 1, color)
}

/// Rectangle outline between two framebuffer corners.
///
/// Dashed outlines skip every other run of four pixels along each edge.
pub(crate) fn rect_outline(
    img: &mut RgbaImage,
    (ax, ay): (f64, f64),
    (bx, by): (f64, f64),
    width: u32,
    dashed: bool,
    color: [u8; 4],
) -> Option<PixelRegion> {
    let x0 = f64_to_pixel(ax.min(bx));
    let x1 = f64_to_pixel(ax.max(bx));
    let y0 = f64_to_pixel(ay.min(by));
    let y1 = f64_to_pixel(ay.max(by));
    let (w, h) = (i64::from(img.width()), i64::from(img.height()));
    let mut touched = None;
    let mut edge = |from: (i64, i64), to: (i64, i64)| {
        let (mut x, mut y) = from;
        let mut step = 0_i64;
        loop {
            if !dashed || (step / 4) % 2 == 0 {
                touched = merge(touched, stamp(img, x, y, width, color));
            }
            if (x, y) == to {
                break;
            }
            x += (to.0 - x).signum();
            y += (to.1 - y).signum();
            step += 1;
        }
    };
    let cx = |v: i64| v.clamp(-1, w);
    let cy = |v: i64| v.clamp(-1, h);
    edge((cx(x0), cy(y0)), (cx(x1), cy(y0)));
    edge((cx(x0), cy(y1)), (cx(x1), cy(y1)));
    edge((cx(x0), cy(y0)), (cx(x0), cy(y1)));
    edge((cx(x1), cy(y0)), (cx(x1), cy(y1)));
    touched
}

/// Liang-Barsky clip of a segment to a box, `None` if fully outside.
fn clip_segment(
    (x0, y0): (f64, f64),
    (x1, y1): (f64, f64),
    (xmin, ymin, xmax, ymax): (f64, f64, f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
        return None;
    }
    let (dx, dy) = (x1 - x0, y1 - y0);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-dx, x0 - xmin),
        (dx, xmax - x0),
        (-dy, y0 - ymin),
        (dy, ymax - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }
    }
    Some(((x0 + t0 * dx, y0 + t0 * dy), (x0 + t1 * dx, y0 + t1 * dy)))
}

/// Polyline through framebuffer points, rasterized with Bresenham steps.
pub(crate) fn polyline(
    img: &mut RgbaImage,
    points: &[(f64, f64)],
    width: u32,
    color: [u8; 4],
) -> Option<PixelRegion> {
    let pad = u32_to_f64(width) + 1.0;
    let frame = (
        -pad,
        -pad,
        u32_to_f64(img.width()) + pad,
        u32_to_f64(img.height()) + pad,
    );
    let mut touched = None;
    if let [only] = points {
        if let Some((a, _)) = clip_segment(*only, *only, frame) {
            touched = stamp(img, f64_to_pixel(a.0), f64_to_pixel(a.1), width, color);
        }
        return touched;
    }
    for pair in points.windows(2) {
        let Some((a, b)) = clip_segment(pair[0], pair[1], frame) else {
            continue;
        };
        let (mut x, mut y) = (f64_to_pixel(a.0), f64_to_pixel(a.1));
        let (x1, y1) = (f64_to_pixel(b.0), f64_to_pixel(b.1));
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let (sx, sy) = ((x1 - x).signum(), (y1 - y).signum());
        let mut err = dx + dy;
        loop {
            touched = merge(touched, stamp(img, x, y, width, color));
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
    touched
}

/// Stretches a scalar array over the whole buffer with nearest-neighbour
/// sampling, row 0 at the top.
pub(crate) fn stretch(
    img: &mut RgbaImage,
    data: ArrayView2<'_, f64>,
    clim: (f64, f64),
    colormap: Colormap,
) -> Option<PixelRegion> {
    let (rows, cols) = data.dim();
    let (width, height) = img.dimensions();
    if rows == 0 || cols == 0 || width == 0 || height == 0 {
        return None;
    }
    let row_scale = usize_to_f64(rows) / u32_to_f64(height);
    let col_scale = usize_to_f64(cols) / u32_to_f64(width);
    let index = |v: u32, scale: f64, len: usize| {
        probekit_core::convert::clamp_index(f64_to_pixel(u32_to_f64(v) * scale), len)
    };
    for py in 0..height {
        let row = index(py, row_scale, rows);
        for px in 0..width {
            let col = index(px, col_scale, cols);
            img.put_pixel(px, py, Rgba(colormap.map(data[[row, col]], clim)));
        }
    }
    Some(PixelRegion::full(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const RED: [u8; 4] = [255, 0, 0, 255];

    #[test]
    fn test_fill_box_clips() {
        let mut img = RgbaImage::new(10, 10);
        let region = fill_box(&mut img, -5, 8, 3, 20, RED).unwrap();
        assert_eq!(
            region,
            PixelRegion {
                x0: 0,
                y0: 8,
                x1: 3,
                y1: 10
            }
        );
        assert_eq!(img.get_pixel(0, 9).0, RED);
        assert!(fill_box(&mut img, 20, 20, 30, 30, RED).is_none());
    }

    #[test]
    fn test_vline_spans_height() {
        let mut img = RgbaImage::new(10, 6);
        let region = vline(&mut img, 4.0, 1, RED).unwrap();
        assert_eq!((region.x0, region.x1, region.y0, region.y1), (4, 5, 0, 6));
        assert_eq!(img.get_pixel(4, 5).0, RED);
        assert_eq!(img.get_pixel(5, 5).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_polyline_far_outside_is_clipped() {
        let mut img = RgbaImage::new(8, 8);
        let region = polyline(&mut img, &[(-1e12, 4.0), (1e12, 4.0)], 1, RED).unwrap();
        assert_eq!((region.x0, region.x1), (0, 8));
        assert_eq!(img.get_pixel(7, 4).0, RED);
    }

    #[test]
    fn test_rect_outline_leaves_interior() {
        let mut img = RgbaImage::new(10, 10);
        rect_outline(&mut img, (2.0, 2.0), (7.0, 7.0), 1, false, RED);
        assert_eq!(img.get_pixel(2, 5).0, RED);
        assert_eq!(img.get_pixel(7, 7).0, RED);
        assert_eq!(img.get_pixel(4, 4).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_stretch_nearest_neighbour() {
        let mut img = RgbaImage::new(4, 2);
        stretch(
            &mut img,
            array![[0.0, 1.0]].view(),
            (0.0, 1.0),
            Colormap::Grayscale,
        );
        assert_eq!(img.get_pixel(0, 1).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(3, 0).0, [255, 255, 255, 255]);
    }
}
