//! Read-only raster accessor.
//!
//! A [`Raster`] is a `(rows, columns, bands)` array of samples. Derived
//! scalar channels are stored with a single band. Every pixel read clamps
//! its row and column into the raster extent, so probes never index out
//! of range.

use ndarray::{s, Array2, Array3, ArrayView1, ArrayView2, ArrayView3, Axis};

use crate::convert::clamp_index;
use crate::error::{Error, Result};
use crate::geometry::{Bounds, Pixel};

/// Band-indexed raster of floating-point samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    data: Array3<f64>,
}

impl Raster {
    /// Wraps a `(rows, columns, bands)` array.
    ///
    /// # Errors
    /// Returns [`Error::EmptyRaster`] if any axis has zero length.
    pub fn new(data: Array3<f64>) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::EmptyRaster);
        }
        Ok(Self { data })
    }

    /// Wraps a single-band `(rows, columns)` array.
    ///
    /// # Errors
    /// Returns [`Error::EmptyRaster`] if the plane has no samples.
    pub fn from_plane(plane: Array2<f64>) -> Result<Self> {
        Self::new(plane.insert_axis(Axis(2)))
    }

    /// Raster of the given shape with every sample set to `value`.
    ///
    /// # Errors
    /// Returns [`Error::EmptyRaster`] if any dimension is zero.
    pub fn filled(height: usize, width: usize, depth: usize, value: f64) -> Result<Self> {
        Self::new(Array3::from_elem((height, width, depth), value))
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    /// Number of bands.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.data.dim().2
    }

    /// Full extent as bounds.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::full(self.width(), self.height())
    }

    /// View of the whole cube.
    #[must_use]
    pub fn view(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }

    /// The first band, which is the scalar channel for derived rasters.
    #[must_use]
    pub fn plane(&self) -> ArrayView2<'_, f64> {
        self.data.index_axis(Axis(2), 0)
    }

    /// One band as a plane.
    ///
    /// # Errors
    /// Returns [`Error::BandOutOfRange`] if `band` is past the depth.
    pub fn band(&self, band: usize) -> Result<ArrayView2<'_, f64>> {
        if band >= self.depth() {
            return Err(Error::BandOutOfRange {
                band,
                depth: self.depth(),
            });
        }
        Ok(self.data.index_axis(Axis(2), band))
    }

    /// Scalar value at a pixel of the first band, clamped into the extent.
    #[must_use]
    pub fn value(&self, pixel: Pixel) -> f64 {
        let row = clamp_index(to_signed(pixel.y), self.height());
        let col = clamp_index(to_signed(pixel.x), self.width());
        self.data[[row, col, 0]]
    }

    /// Spectrum (all bands) at a pixel, clamped into the extent.
    #[must_use]
    pub fn spectrum(&self, pixel: Pixel) -> ArrayView1<'_, f64> {
        let row = clamp_index(to_signed(pixel.y), self.height());
        let col = clamp_index(to_signed(pixel.x), self.width());
        self.data.slice(s![row, col, ..])
    }

    /// Column of the first band, clamped to the last column.
    #[must_use]
    pub fn column(&self, col: usize) -> ArrayView1<'_, f64> {
        let col = col.min(self.width() - 1);
        self.data.slice(s![.., col, 0])
    }

    /// View of the cube under a box, clamped into the extent.
    ///
    /// The view is empty when the clamped box is degenerate.
    #[must_use]
    pub fn roi(&self, bounds: Bounds) -> ArrayView3<'_, f64> {
        let b = bounds.clamped(self.width(), self.height());
        self.data.slice(s![b.y0..b.y1, b.x0..b.x1, ..])
    }

    /// Owned copy of the cube under a box.
    ///
    /// # Errors
    /// Returns [`Error::DegenerateGeometry`] if the clamped box is empty.
    pub fn crop(&self, bounds: Bounds) -> Result<Self> {
        let b = bounds.clamped(self.width(), self.height());
        if b.is_degenerate() {
            return Err(Error::DegenerateGeometry {
                x0: b.x0,
                y0: b.y0,
                x1: b.x1,
                y1: b.y1,
            });
        }
        Self::new(self.roi(b).to_owned())
    }

    /// Copy with every band zeroed where `mask` is false.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] if the mask does not match the
    /// raster extent.
    pub fn masked(&self, mask: &Array2<bool>) -> Result<Self> {
        let expected = (self.height(), self.width());
        if mask.dim() != expected {
            return Err(Error::ShapeMismatch {
                expected,
                found: mask.dim(),
            });
        }
        let mut data = self.data.clone();
        for ((row, col), keep) in mask.indexed_iter() {
            if !keep {
                data.slice_mut(s![row, col, ..]).fill(0.0);
            }
        }
        Ok(Self { data })
    }

    /// Quarter turn counter-clockwise in the row/column plane.
    ///
    /// The top row becomes the left column read bottom to top, so a
    /// `h x w` raster becomes `w x h` and `out[i, j] = self[j, w - 1 - i]`.
    #[must_use]
    pub fn rot90(&self) -> Self {
        let mut view = self.data.view();
        view.invert_axis(Axis(1));
        view.swap_axes(0, 1);
        Self {
            data: view.as_standard_layout().into_owned(),
        }
    }
}

fn to_signed(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn ramp(height: usize, width: usize, depth: usize) -> Raster {
        let data = Array3::from_shape_fn((height, width, depth), |(r, c, b)| {
            (r * 100 + c * 10 + b) as f64
        });
        Raster::new(data).unwrap()
    }

    #[test]
    fn test_empty_raster_rejected() {
        assert_eq!(
            Raster::new(Array3::zeros((0, 4, 1))).unwrap_err(),
            Error::EmptyRaster
        );
    }

    #[test]
    fn test_dimensions() {
        let raster = ramp(4, 6, 3);
        assert_eq!(raster.height(), 4);
        assert_eq!(raster.width(), 6);
        assert_eq!(raster.depth(), 3);
        assert_eq!(raster.bounds(), Bounds::new(0, 0, 6, 4));
    }

    #[test]
    fn test_reads_are_clamped() {
        let raster = ramp(4, 6, 3);
        assert_eq!(raster.value(Pixel::new(99, 99)), 350.0);
        assert_eq!(raster.spectrum(Pixel::new(1, 2)).to_vec(), vec![210.0, 211.0, 212.0]);
        assert_eq!(raster.column(40).to_vec(), vec![50.0, 150.0, 250.0, 350.0]);
    }

    #[test]
    fn test_crop_shape() {
        let raster = Raster::filled(50, 50, 1, 0.0).unwrap();
        let crop = raster.crop(Bounds::new(10, 10, 30, 25)).unwrap();
        assert_eq!(crop.height(), 15);
        assert_eq!(crop.width(), 20);
        assert!(crop.plane().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_crop_degenerate() {
        let raster = ramp(4, 6, 1);
        let err = raster.crop(Bounds::new(2, 1, 2, 3)).unwrap_err();
        assert!(matches!(err, Error::DegenerateGeometry { .. }));
        assert!(raster.roi(Bounds::new(2, 1, 2, 3)).is_empty());
    }

    #[test]
    fn test_band_out_of_range() {
        let raster = ramp(2, 2, 2);
        assert!(raster.band(1).is_ok());
        assert_eq!(
            raster.band(2).unwrap_err(),
            Error::BandOutOfRange { band: 2, depth: 2 }
        );
    }

    #[test]
    fn test_rot90_swaps_extent_and_turns_left() {
        let raster = ramp(2, 3, 2);
        let turned = raster.rot90();
        assert_eq!((turned.height(), turned.width(), turned.depth()), (3, 2, 2));
        // Top-right corner lands top-left; bottom-left lands bottom-right.
        assert_eq!(turned.spectrum(Pixel::new(0, 0)).to_vec(), vec![20.0, 21.0]);
        assert_eq!(turned.spectrum(Pixel::new(1, 2)).to_vec(), vec![100.0, 101.0]);
        assert_eq!(turned.column(0).to_vec(), vec![20.0, 10.0, 0.0]);
        assert_eq!(turned.rot90().rot90().rot90(), raster);
    }

    #[test]
    fn test_masked_zeroes_excluded_pixels() {
        let raster = ramp(2, 2, 2);
        let mask = ndarray::arr2(&[[true, false], [false, true]]);
        let masked = raster.masked(&mask).unwrap();
        assert_eq!(masked.spectrum(Pixel::new(1, 0)).to_vec(), vec![0.0, 0.0]);
        assert_eq!(masked.spectrum(Pixel::new(1, 1)).to_vec(), vec![110.0, 111.0]);

        let wrong = Array2::from_elem((3, 2), true);
        assert!(matches!(
            raster.masked(&wrong),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
