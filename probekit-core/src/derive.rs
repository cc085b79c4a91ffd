//! Interface to the expression collaborator.
//!
//! Turning a formula string into a per-pixel function is not done here;
//! callers hand in any [`ChannelExpression`]. The built-in expressions
//! cover the common band-index cases.

use ndarray::{Array2, Zip};

use crate::error::Result;
use crate::raster::Raster;

/// Result of evaluating an expression over a cube.
#[derive(Debug, Clone, PartialEq)]
pub enum Derived {
    /// Per-pixel scalar channel.
    Scalar(Array2<f64>),
    /// Per-pixel condition; pixels where it is false are excluded.
    Mask(Array2<bool>),
}

/// Per-pixel derivation over a spectral cube.
pub trait ChannelExpression {
    /// Evaluates the expression over every pixel of `cube`.
    ///
    /// # Errors
    /// Returns an error if the expression references a missing band.
    fn evaluate(&self, cube: &Raster) -> Result<Derived>;

    /// Human-readable formula.
    fn formula(&self) -> String;
}

/// A single band, `bN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandSelect {
    /// Band index.
    pub band: usize,
}

impl ChannelExpression for BandSelect {
    fn evaluate(&self, cube: &Raster) -> Result<Derived> {
        Ok(Derived::Scalar(cube.band(self.band)?.to_owned()))
    }

    fn formula(&self) -> String {
        format!("b{}", self.band)
    }
}

/// Normalized difference index `(bA - bB) / (bA + bB)`.
///
/// Pixels where both bands sum to zero evaluate to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedDifference {
    /// Minuend band.
    pub a: usize,
    /// Subtrahend band.
    pub b: usize,
}

impl ChannelExpression for NormalizedDifference {
    fn evaluate(&self, cube: &Raster) -> Result<Derived> {
        let a = cube.band(self.a)?;
        let b = cube.band(self.b)?;
        let out = Zip::from(&a).and(&b).map_collect(|&a, &b| {
            let sum = a + b;
            if sum == 0.0 {
                0.0
            } else {
                (a - b) / sum
            }
        });
        Ok(Derived::Scalar(out))
    }

    fn formula(&self) -> String {
        format!("(b{a} - b{b}) / (b{a} + b{b})", a = self.a, b = self.b)
    }
}

/// Condition `bN > min`, producing a mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    /// Band index.
    pub band: usize,
    /// Exclusive lower bound.
    pub min: f64,
}

impl ChannelExpression for Threshold {
    fn evaluate(&self, cube: &Raster) -> Result<Derived> {
        let band = cube.band(self.band)?;
        Ok(Derived::Mask(band.mapv(|v| v > self.min)))
    }

    fn formula(&self) -> String {
        format!("b{} > {}", self.band, self.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use approx::assert_relative_eq;
    use ndarray::Array3;

    fn cube() -> Raster {
        let data = Array3::from_shape_fn((2, 2, 3), |(r, c, b)| (r + c + b) as f64);
        Raster::new(data).unwrap()
    }

    #[test]
    fn test_band_select() {
        let Derived::Scalar(plane) = BandSelect { band: 2 }.evaluate(&cube()).unwrap() else {
            panic!("expected scalar");
        };
        assert_eq!(plane, ndarray::arr2(&[[2.0, 3.0], [3.0, 4.0]]));
        assert!(matches!(
            BandSelect { band: 7 }.evaluate(&cube()),
            Err(Error::BandOutOfRange { band: 7, depth: 3 })
        ));
    }

    #[test]
    fn test_normalized_difference() {
        let expr = NormalizedDifference { a: 2, b: 0 };
        assert_eq!(expr.formula(), "(b2 - b0) / (b2 + b0)");
        let Derived::Scalar(plane) = expr.evaluate(&cube()).unwrap() else {
            panic!("expected scalar");
        };
        assert_relative_eq!(plane[[0, 0]], 1.0);
        assert_relative_eq!(plane[[1, 1]], 2.0 / 6.0);
    }

    #[test]
    fn test_threshold_mask() {
        let Derived::Mask(mask) = (Threshold { band: 0, min: 0.5 }).evaluate(&cube()).unwrap()
        else {
            panic!("expected mask");
        };
        assert_eq!(mask, ndarray::arr2(&[[false, true], [true, true]]));
    }
}
