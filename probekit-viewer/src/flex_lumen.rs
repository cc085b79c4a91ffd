//! Point spectra with an editable point list.

use std::rc::Rc;

use log::{debug, warn};
use probekit_core::text::{format_points, parse_points};
use probekit_core::{Pixel, Raster};

use crate::actor::{ActorRef, Pane};
use crate::composite::{Lumen, TextEdit};
use crate::error::Result;
use crate::session::{PointerEvent, Probe};
use crate::surface::Surface;

/// [`Lumen`] whose points round-trip through `(x, y)` text.
///
/// The text lists committed points followed by the point being dragged,
/// so it tracks the pointer during a drag.
#[derive(Debug)]
pub struct FlexLumen {
    lumen: Lumen,
    text: String,
}

impl FlexLumen {
    /// Creates the probe with no points.
    #[must_use]
    pub fn new(points: Surface, cube: Rc<Raster>, spectra: Surface, margin: f64) -> Self {
        Self {
            lumen: Lumen::new(points, cube, spectra, margin),
            text: String::new(),
        }
    }

    /// The underlying point spectra probe.
    #[must_use]
    pub fn lumen(&self) -> &Lumen {
        &self.lumen
    }

    /// Text of every point.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    fn update_text(&mut self) {
        self.text = format_points(&self.lumen.points().all_points());
    }

    /// Replaces every point with the points parsed from text.
    ///
    /// Malformed text or a point outside the channel leaves the probe
    /// untouched.
    ///
    /// # Errors
    /// Returns [`crate::Error::Core`] for malformed or out-of-range points.
    pub fn apply_text(&mut self, text: &str) -> Result<TextEdit> {
        let points = parse_points(text).inspect_err(|err| warn!("rejected point text: {err}"))?;
        if points == self.lumen.points().all_points() {
            return Ok(TextEdit::Unchanged);
        }
        let (width, height) = self
            .lumen
            .points()
            .surface()
            .raster()
            .map_or((0, 0), |r| (r.width(), r.height()));
        if let Some(p) = points.iter().find(|p| p.x >= width || p.y >= height) {
            warn!("point ({}, {}) is outside a {width}x{height} channel", p.x, p.y);
            return Err(probekit_core::Error::parse(
                text,
                format!("({}, {}) is outside the channel", p.x, p.y),
            )
            .into());
        }
        self.lumen.set_points(&points);
        self.update_text();
        debug!("flex lumen set to {} points", points.len());
        Ok(TextEdit::Applied)
    }

    /// Replaces every point.
    pub fn set_points(&mut self, pixels: &[Pixel]) {
        self.lumen.set_points(pixels);
        self.update_text();
    }

    /// Replaces the scalar channel on the input surface.
    pub fn set_channel(&mut self, channel: Raster) {
        self.lumen.set_channel(channel);
    }

    /// Replaces the spectral cube and resamples every curve.
    ///
    /// # Errors
    /// See [`Lumen::set_cube`].
    pub fn set_cube(&mut self, cube: Rc<Raster>) -> Result<()> {
        self.lumen.set_cube(cube)
    }

    /// Full redraw of both surfaces.
    pub fn redraw(&mut self) {
        self.lumen.redraw();
    }
}

impl Probe for FlexLumen {
    fn pane(&self, pane: Pane) -> Option<&Surface> {
        self.lumen.pane(pane)
    }

    fn pane_mut(&mut self, pane: Pane) -> Option<&mut Surface> {
        self.lumen.pane_mut(pane)
    }

    fn actors(&self) -> Vec<ActorRef> {
        self.lumen.actors()
    }

    fn on_primary_press(&mut self, event: &PointerEvent) -> Result<()> {
        self.lumen.on_primary_press(event)
    }

    fn on_secondary_press(&mut self, event: &PointerEvent) -> Result<()> {
        self.lumen.on_secondary_press(event)
    }

    fn after_press(&mut self, _event: &PointerEvent) -> Result<()> {
        self.lumen.fix_lim();
        self.update_text();
        Ok(())
    }

    fn after_drag(&mut self, event: &PointerEvent) -> Result<()> {
        self.lumen.after_drag(event)?;
        self.update_text();
        Ok(())
    }

    fn on_release(&mut self, event: &PointerEvent) -> Result<()> {
        self.lumen.on_release(event)
    }

    fn after_release(&mut self, event: &PointerEvent) -> Result<()> {
        self.lumen.after_release(event)?;
        self.update_text();
        Ok(())
    }
}
