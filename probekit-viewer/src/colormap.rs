//! Colormaps for raster backgrounds, sub-images and the ratio matrix.

use probekit_core::convert::f32_to_u8;

/// Available colormaps for scalar images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colormap {
    /// Grayscale - black to white.
    Grayscale,
    /// Hot (Thermal) - black to red to yellow to white.
    Hot,
    /// Viridis (approximate) - blue to teal to green to yellow.
    #[default]
    Viridis,
    /// Spectral (approximate) - black through violet, blue, green, yellow, red to white.
    Spectral,
}

impl std::fmt::Display for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Colormap::Grayscale => write!(f, "Grayscale"),
            Colormap::Hot => write!(f, "Hot (Thermal)"),
            Colormap::Viridis => write!(f, "Viridis"),
            Colormap::Spectral => write!(f, "Spectral"),
        }
    }
}

// Control points for the spectral ramp, evenly spaced over [0, 1].
const SPECTRAL_STOPS: [[f32; 3]; 7] = [
    [0.0, 0.0, 0.0],
    [0.47, 0.0, 0.53],
    [0.0, 0.27, 0.87],
    [0.0, 0.67, 0.33],
    [0.93, 0.93, 0.0],
    [0.87, 0.0, 0.0],
    [0.8, 0.8, 0.8],
];

impl Colormap {
    /// Apply the colormap to a normalized value [0, 1] and return RGBA bytes.
    ///
    /// Values outside the unit interval are clamped; NaN maps to the low end.
    #[must_use]
    pub fn apply(self, val: f32) -> [u8; 4] {
        let val = if val.is_nan() { 0.0 } else { val.clamp(0.0, 1.0) };
        match self {
            Colormap::Grayscale => {
                let v = f32_to_u8(val * 255.0);
                [v, v, v, 255]
            }
            Colormap::Hot => {
                // Simple Red-Yellow-White heatmap
                if val < 0.5 {
                    let g = f32_to_u8(val * 2.0 * 255.0);
                    [255, g, 0, 255]
                } else {
                    let b = f32_to_u8((val - 0.5) * 2.0 * 255.0);
                    [255, 255, b, 255]
                }
            }
            Colormap::Viridis => {
                let r = f32_to_u8(255.0 * val.powf(2.0));
                let g = f32_to_u8(255.0 * val);
                let b = f32_to_u8(255.0 * (1.0 - val));
                [r, g, b, 255]
            }
            Colormap::Spectral => {
                let scaled = val * 6.0;
                let lower = scaled.floor().clamp(0.0, 5.0);
                let t = scaled - lower;
                // `lower` is an integral value in 0..=5.
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let i = lower as usize;
                let (a, b) = (SPECTRAL_STOPS[i], SPECTRAL_STOPS[i + 1]);
                let mix = |k: usize| f32_to_u8((a[k] + (b[k] - a[k]) * t) * 255.0);
                [mix(0), mix(1), mix(2), 255]
            }
        }
    }

    /// Map a raw value through color limits `(lo, hi)`.
    ///
    /// Flat limits map every value to the middle of the ramp.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn map(self, value: f64, clim: (f64, f64)) -> [u8; 4] {
        let (lo, hi) = clim;
        let span = hi - lo;
        let normalized = if span.abs() <= f64::EPSILON {
            0.5
        } else {
            (value - lo) / span
        };
        self.apply(normalized as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grayscale_endpoints() {
        assert_eq!(Colormap::Grayscale.apply(0.0), [0, 0, 0, 255]);
        assert_eq!(Colormap::Grayscale.apply(1.0), [255, 255, 255, 255]);
        assert_eq!(Colormap::Grayscale.apply(7.0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_spectral_endpoints() {
        assert_eq!(Colormap::Spectral.apply(0.0), [0, 0, 0, 255]);
        assert_eq!(Colormap::Spectral.apply(1.0), [204, 204, 204, 255]);
    }

    #[test]
    fn test_map_flat_limits() {
        assert_eq!(
            Colormap::Grayscale.map(3.0, (3.0, 3.0)),
            Colormap::Grayscale.apply(0.5)
        );
        assert_eq!(Colormap::Grayscale.map(10.0, (0.0, 10.0)), [255, 255, 255, 255]);
    }
}
