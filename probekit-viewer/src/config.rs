//! Viewer configuration.

use probekit_core::{Color, Raster};

use crate::colormap::Colormap;
use crate::surface::{Surface, SurfaceStyle, ViewBox};

/// Configuration for probe surfaces and linked views.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Framebuffer pixels per raster pixel on input surfaces.
    pub input_scale: u32,
    /// Framebuffer size of secondary surfaces (width, height).
    pub output_size: (u32, u32),
    /// Marker half-size in framebuffer pixels.
    pub marker_radius: u32,
    /// Stroke width of lines and rectangle outlines.
    pub line_width: u32,
    /// Margin added around spectrum axis limits.
    pub curve_margin: f64,
    /// Colormap for the bound raster on input surfaces.
    pub background_colormap: Colormap,
    /// Colormap for cropped sub-images.
    pub image_colormap: Colormap,
    /// Colormap for the band ratio matrix.
    pub matrix_colormap: Colormap,
    /// Color of the mean-spectrum curve.
    pub mean_curve_color: Color,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            input_scale: 4,
            output_size: (320, 240),
            marker_radius: 3,
            line_width: 2,
            curve_margin: 0.05,
            background_colormap: Colormap::Viridis,
            image_colormap: Colormap::Viridis,
            matrix_colormap: Colormap::Spectral,
            mean_curve_color: Color::rgb(0x00, 0xFF, 0x00),
        }
    }
}

impl ViewerConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the input scale.
    #[must_use]
    pub fn with_input_scale(mut self, scale: u32) -> Self {
        self.input_scale = scale.max(1);
        self
    }

    /// Sets the secondary surface size.
    #[must_use]
    pub fn with_output_size(mut self, width: u32, height: u32) -> Self {
        self.output_size = (width.max(1), height.max(1));
        self
    }

    /// Sets the marker radius.
    #[must_use]
    pub fn with_marker_radius(mut self, radius: u32) -> Self {
        self.marker_radius = radius;
        self
    }

    /// Sets the line width.
    #[must_use]
    pub fn with_line_width(mut self, width: u32) -> Self {
        self.line_width = width.max(1);
        self
    }

    /// Sets the spectrum axis margin.
    #[must_use]
    pub fn with_curve_margin(mut self, margin: f64) -> Self {
        self.curve_margin = margin;
        self
    }

    /// Sets the sub-image colormap.
    #[must_use]
    pub fn with_image_colormap(mut self, colormap: Colormap) -> Self {
        self.image_colormap = colormap;
        self
    }

    /// Sets the matrix colormap.
    #[must_use]
    pub fn with_matrix_colormap(mut self, colormap: Colormap) -> Self {
        self.matrix_colormap = colormap;
        self
    }

    fn style(&self) -> SurfaceStyle {
        SurfaceStyle {
            marker_radius: self.marker_radius,
            line_width: self.line_width,
        }
    }

    /// Input surface sized to `raster` and bound to it.
    #[must_use]
    pub fn input_surface(&self, name: &str, raster: Raster) -> Surface {
        Surface::scaled(name, raster, self.input_scale, self.background_colormap, self.style())
    }

    /// Fixed-size secondary surface with an initial view.
    #[must_use]
    pub fn output_surface(&self, name: &str, view: ViewBox) -> Surface {
        let (width, height) = self.output_size;
        Surface::fixed(name, width, height, view, self.style())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_viewer_config_builder() {
        let config = ViewerConfig::new()
            .with_input_scale(0)
            .with_output_size(100, 50)
            .with_line_width(3)
            .with_curve_margin(0.1);
        assert_eq!(config.input_scale, 1);
        assert_eq!(config.output_size, (100, 50));
        assert_eq!(config.line_width, 3);
        assert_relative_eq!(config.curve_margin, 0.1);
    }

    #[test]
    fn test_input_surface_matches_raster() {
        let raster = Raster::filled(10, 20, 1, 0.0).unwrap();
        let surface = ViewerConfig::new().with_input_scale(2).input_surface("in", raster);
        assert_eq!(surface.pixel_size(), (40, 20));
    }
}
