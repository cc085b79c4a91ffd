use std::rc::Rc;

use log::{debug, warn};
use ndarray::{Array1, Array2};
use probekit_algorithms::{
    finite_range, mean_spectrum_with, padded_range, ratio_matrix_with, SpectralConfig,
};
use probekit_core::convert::usize_to_f64;
use probekit_core::text::{format_bounds, parse_bounds};
use probekit_core::{Bounds, Color, Raster};

use super::TextEdit;
use crate::actor::{ActorId, ActorRef, Geometry, Pane};
use crate::colormap::Colormap;
use crate::error::{Error, Result};
use crate::probe::{RegionId, WindowProbe};
use crate::session::{PointerEvent, Probe};
use crate::surface::{Surface, ViewBox};

/// Rectangle probe with the mean spectrum of the cube under the selected
/// rectangle and the band ratio matrix `(s_i - s_j) / (s_i + s_j)` of that
/// spectrum.
///
/// With no rectangle selected both views show the whole-cube mean.
#[derive(Debug)]
pub struct MeanSign {
    window: WindowProbe,
    cube: Rc<Raster>,
    spectrum_view: Surface,
    matrix_view: Surface,
    curve: ActorId,
    matrix: ActorId,
    spectrum: Array1<f64>,
    colormap: Colormap,
    config: SpectralConfig,
    text: String,
}

impl MeanSign {
    /// Creates the probe showing the whole-cube mean.
    ///
    /// # Errors
    /// Returns an error if the linked views could not be initialized.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        window: Surface,
        cube: Rc<Raster>,
        mut spectrum_view: Surface,
        mut matrix_view: Surface,
        curve_color: Color,
        colormap: Colormap,
        config: SpectralConfig,
    ) -> Result<Self> {
        let curve = spectrum_view.add_actor(Geometry::Curve { points: Vec::new() }, curve_color);
        let matrix = matrix_view.add_actor(
            Geometry::Image {
                data: Array2::zeros((1, 1)),
                clim: (0.0, 1.0),
                colormap,
            },
            curve_color,
        );
        let mut mean_sign = Self {
            window: WindowProbe::new(window),
            cube,
            spectrum_view,
            matrix_view,
            curve,
            matrix,
            spectrum: Array1::zeros(0),
            colormap,
            config,
            text: String::new(),
        };
        mean_sign.show(mean_sign.whole_mean())?;
        mean_sign.redraw();
        Ok(mean_sign)
    }

    /// The rectangle probe.
    #[must_use]
    pub fn window(&self) -> &WindowProbe {
        &self.window
    }

    /// The spectral cube.
    #[must_use]
    pub fn cube(&self) -> &Raster {
        &self.cube
    }

    /// Mean spectrum currently shown.
    #[must_use]
    pub fn spectrum(&self) -> &Array1<f64> {
        &self.spectrum
    }

    /// Ratio matrix currently shown.
    #[must_use]
    pub fn matrix(&self) -> Option<&Array2<f64>> {
        match self.matrix_view.actor(self.matrix)?.geometry() {
            Geometry::Image { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Color limits of the matrix image.
    #[must_use]
    pub fn matrix_clim(&self) -> Option<(f64, f64)> {
        match self.matrix_view.actor(self.matrix)?.geometry() {
            Geometry::Image { clim, .. } => Some(*clim),
            _ => None,
        }
    }

    /// Spectrum surface.
    #[must_use]
    pub fn spectrum_view(&self) -> &Surface {
        &self.spectrum_view
    }

    /// Matrix surface.
    #[must_use]
    pub fn matrix_view(&self) -> &Surface {
        &self.matrix_view
    }

    /// Bounds text of the selected rectangle, empty with none selected.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    fn whole_mean(&self) -> Array1<f64> {
        mean_spectrum_with(self.cube.view(), &self.config)
            .unwrap_or_else(|| Array1::zeros(self.cube.depth()))
    }

    /// Mean spectrum under a region, `None` for an empty crop.
    #[must_use]
    pub fn region_spectrum(&self, bounds: Bounds) -> Option<Array1<f64>> {
        if bounds.is_degenerate() {
            return None;
        }
        mean_spectrum_with(self.cube.roi(bounds), &self.config)
    }

    /// Ratio matrix of a spectrum.
    #[must_use]
    pub fn ratio_matrix(&self, spectrum: &Array1<f64>) -> Array2<f64> {
        ratio_matrix_with(spectrum.view(), &self.config)
    }

    fn show(&mut self, spectrum: Array1<f64>) -> Result<()> {
        let points = spectrum
            .iter()
            .enumerate()
            .map(|(band, &value)| [usize_to_f64(band), value])
            .collect();
        self.spectrum_view
            .set_geometry(self.curve, Geometry::Curve { points })?;
        let (lo, hi) = padded_range(finite_range(spectrum.iter().copied()), 0.0);
        let last = usize_to_f64(spectrum.len().saturating_sub(1));
        self.spectrum_view
            .set_view(ViewBox::new((0.0, last.max(1.0)), (lo, hi)));

        let matrix = self.ratio_matrix(&spectrum);
        let clim = finite_range(matrix.iter().copied()).unwrap_or((0.0, 0.0));
        self.matrix_view
            .set_view(ViewBox::image(matrix.ncols(), matrix.nrows()));
        self.matrix_view.set_geometry(
            self.matrix,
            Geometry::Image {
                data: matrix,
                clim,
                colormap: self.colormap,
            },
        )?;
        self.spectrum = spectrum;
        Ok(())
    }

    /// Recomputes both views from the selected rectangle.
    ///
    /// Returns false, leaving both views untouched, when nothing is
    /// selected or the rectangle covers no pixels.
    ///
    /// # Errors
    /// Returns an error if a view actor is gone.
    pub fn update_actors(&mut self) -> Result<bool> {
        let Some(spectrum) = self.window.points().and_then(|b| self.region_spectrum(b)) else {
            return Ok(false);
        };
        self.show(spectrum)?;
        Ok(true)
    }

    fn update_text(&mut self) {
        self.text = self
            .window
            .points()
            .map(|bounds| format_bounds(&bounds))
            .unwrap_or_default();
    }

    /// Full redraw of every surface.
    pub fn redraw(&mut self) {
        self.window.surface_mut().redraw();
        self.spectrum_view.redraw();
        self.matrix_view.redraw();
    }

    /// Removes the selected rectangle and shows the whole-cube mean.
    ///
    /// # Errors
    /// Returns an error if a view actor is gone.
    pub fn remove_selected(&mut self) -> Result<Option<RegionId>> {
        let removed = self.window.remove_selected();
        self.show(self.whole_mean())?;
        self.update_text();
        self.redraw();
        Ok(removed)
    }

    /// Applies edited bounds text to the selected rectangle.
    ///
    /// Empty text removes the rectangle. Malformed text leaves everything
    /// untouched.
    ///
    /// # Errors
    /// Returns [`Error::Core`] for malformed text and [`Error::NoRegion`]
    /// with nothing selected.
    pub fn apply_text(&mut self, text: &str) -> Result<TextEdit> {
        let parsed = parse_bounds(text).inspect_err(|err| warn!("rejected bounds text: {err}"))?;
        if self.window.selected().is_none() {
            return Err(Error::NoRegion);
        }
        let Some(bounds) = parsed else {
            self.remove_selected()?;
            return Ok(TextEdit::Removed);
        };
        if self.window.points() == Some(bounds) {
            return Ok(TextEdit::Unchanged);
        }
        self.window.set_points(bounds)?;
        self.update_actors()?;
        self.update_text();
        self.redraw();
        debug!("mean sign bounds set to {bounds:?}");
        Ok(TextEdit::Applied)
    }

    /// Replaces the spectral cube, e.g. after a new mask.
    ///
    /// # Errors
    /// Returns an error if a view actor is gone.
    pub fn set_cube(&mut self, cube: Rc<Raster>) -> Result<()> {
        self.cube = cube;
        if !self.update_actors()? {
            self.show(self.whole_mean())?;
        }
        self.redraw();
        Ok(())
    }

    /// Replaces the scalar channel on the input surface.
    pub fn set_channel(&mut self, channel: Raster) {
        self.window.surface_mut().bind(channel);
        self.update_text();
        self.redraw();
    }
}

impl Probe for MeanSign {
    fn pane(&self, pane: Pane) -> Option<&Surface> {
        Some(match pane {
            Pane::Input => self.window.surface(),
            Pane::Output => &self.spectrum_view,
            Pane::Detail => &self.matrix_view,
        })
    }

    fn pane_mut(&mut self, pane: Pane) -> Option<&mut Surface> {
        Some(match pane {
            Pane::Input => self.window.surface_mut(),
            Pane::Output => &mut self.spectrum_view,
            Pane::Detail => &mut self.matrix_view,
        })
    }

    fn actors(&self) -> Vec<ActorRef> {
        let mut actors = self.window.actors();
        actors.push(ActorRef::new(Pane::Output, self.curve));
        actors.push(ActorRef::new(Pane::Detail, self.matrix));
        actors
    }

    fn on_primary_press(&mut self, event: &PointerEvent) -> Result<()> {
        self.window.create(event.point());
        Ok(())
    }

    fn on_secondary_press(&mut self, event: &PointerEvent) -> Result<()> {
        self.window.select_at(event.point());
        Ok(())
    }

    fn exit_condition(&self) -> bool {
        self.window.exit_condition()
    }

    fn after_press(&mut self, _event: &PointerEvent) -> Result<()> {
        self.update_actors()?;
        self.update_text();
        Ok(())
    }

    fn on_primary_drag(&mut self, event: &PointerEvent) -> Result<()> {
        self.window.resize_selected(event.point())
    }

    fn on_secondary_drag(&mut self, event: &PointerEvent) -> Result<()> {
        self.window.translate_selected(event.point())
    }

    fn after_drag(&mut self, _event: &PointerEvent) -> Result<()> {
        self.update_actors()?;
        self.update_text();
        Ok(())
    }
}
