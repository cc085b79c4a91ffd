//! Synthetic spectral cubes for replaying scripts without input files.

use std::f64::consts::PI;

use ndarray::Array3;
use probekit_core::{
    BandSelect, ChannelExpression, Derived, NormalizedDifference, Raster, Threshold,
};

use crate::{CliError, Result};

/// Smooth `size x size x bands` cube with values in `[0, 1]`.
///
/// Each band is a product of a row wave and a column wave whose frequency
/// grows with the band index, so neighbouring bands differ everywhere.
pub fn synthetic_cube(size: usize, bands: usize) -> Result<Raster> {
    let scale = size.max(1) as f64;
    let data = Array3::from_shape_fn((size, size, bands), |(r, c, b)| {
        let freq = (b + 1) as f64;
        let row = (PI * freq * r as f64 / scale).sin();
        let col = (PI * c as f64 / scale).cos();
        0.5 + 0.5 * row * col
    });
    Ok(Raster::new(data)?)
}

/// How the displayed scalar channel is derived from the cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelSource {
    Band(usize),
    NormalizedDifference(usize, usize),
}

impl ChannelSource {
    fn expression(self) -> Box<dyn ChannelExpression> {
        match self {
            Self::Band(band) => Box::new(BandSelect { band }),
            Self::NormalizedDifference(a, b) => Box::new(NormalizedDifference { a, b }),
        }
    }
}

/// Evaluates the channel expression into a single-band raster.
pub fn derive_channel(cube: &Raster, source: ChannelSource) -> Result<(Raster, String)> {
    let expression = source.expression();
    match expression.evaluate(cube)? {
        Derived::Scalar(plane) => Ok((Raster::from_plane(plane)?, expression.formula())),
        Derived::Mask(_) => Err(CliError::Expression(format!(
            "{} yields a mask, not a channel",
            expression.formula()
        ))),
    }
}

/// Evaluates `b{band} > min` into a pixel mask.
pub fn derive_mask(cube: &Raster, band: usize, min: f64) -> Result<ndarray::Array2<bool>> {
    let expression = Threshold { band, min };
    match expression.evaluate(cube)? {
        Derived::Mask(mask) => Ok(mask),
        Derived::Scalar(_) => Err(CliError::Expression(format!(
            "{} yields a channel, not a mask",
            expression.formula()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_cube_range() {
        let cube = synthetic_cube(16, 4).unwrap();
        assert_eq!((cube.height(), cube.width(), cube.depth()), (16, 16, 4));
        assert!(cube.view().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_derived_channel_and_mask() {
        let cube = synthetic_cube(8, 3).unwrap();
        let (channel, formula) = derive_channel(&cube, ChannelSource::NormalizedDifference(0, 2)).unwrap();
        assert_eq!(formula, "(b0 - b2) / (b0 + b2)");
        assert_eq!(channel.depth(), 1);

        let mask = derive_mask(&cube, 0, 2.0).unwrap();
        assert!(mask.iter().all(|keep| !keep));

        assert!(matches!(
            derive_channel(&cube, ChannelSource::Band(7)),
            Err(CliError::Core(probekit_core::Error::BandOutOfRange { .. }))
        ));
    }
}
