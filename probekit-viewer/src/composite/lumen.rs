use std::rc::Rc;

use log::{debug, warn};
use probekit_core::convert::usize_to_f64;
use probekit_core::{DataPoint, Pixel, Raster};

use crate::actor::{ActorId, ActorRef, Geometry, Pane};
use crate::error::Result;
use crate::probe::{PointMarker, PointProbe};
use crate::session::{PointerEvent, Probe};
use crate::surface::Surface;

/// Point probe with the full spectrum under each marker.
///
/// Spectra are drawn as curves of band index against value on a second
/// surface whose vertical range covers every curve.
#[derive(Debug)]
pub struct Lumen {
    points: PointProbe,
    cube: Rc<Raster>,
    spectra: Surface,
    current: Option<ActorId>,
    curves: Vec<ActorId>,
    margin: f64,
}

fn spectrum_curve(cube: &Raster, pixel: Pixel) -> Geometry {
    let points = cube
        .spectrum(pixel)
        .iter()
        .enumerate()
        .map(|(band, &value)| [usize_to_f64(band), value])
        .collect();
    Geometry::Curve { points }
}

fn curve_max(surface: &Surface, id: ActorId) -> f64 {
    match surface.actor(id).map(|a| a.geometry()) {
        Some(Geometry::Curve { points }) => points
            .iter()
            .map(|p| p[1])
            .filter(|v| v.is_finite())
            .fold(f64::NEG_INFINITY, f64::max),
        _ => f64::NEG_INFINITY,
    }
}

impl Lumen {
    /// Creates the probe.
    ///
    /// `points` shows the scalar channel, `cube` supplies spectra and
    /// `spectra` receives the curves; `margin` pads the vertical range.
    #[must_use]
    pub fn new(points: Surface, cube: Rc<Raster>, spectra: Surface, margin: f64) -> Self {
        let mut lumen = Self {
            points: PointProbe::new(points),
            cube,
            spectra,
            current: None,
            curves: Vec::new(),
            margin,
        };
        lumen.fit_bands();
        lumen.fix_lim();
        lumen
    }

    /// The point probe.
    #[must_use]
    pub fn points(&self) -> &PointProbe {
        &self.points
    }

    /// The spectra surface.
    #[must_use]
    pub fn spectra(&self) -> &Surface {
        &self.spectra
    }

    /// The spectral cube.
    #[must_use]
    pub fn cube(&self) -> &Raster {
        &self.cube
    }

    /// Spectrum at a pixel, clamped into the cube.
    #[must_use]
    pub fn spectrum(&self, pixel: Pixel) -> Vec<f64> {
        self.cube.spectrum(pixel).to_vec()
    }

    /// Curve actors of committed points, aligned with
    /// [`PointProbe::committed`].
    #[must_use]
    pub fn curves(&self) -> &[ActorId] {
        &self.curves
    }

    fn fit_bands(&mut self) {
        let last = usize_to_f64(self.cube.depth().saturating_sub(1));
        self.spectra.set_xlim(0.0, last.max(1.0));
    }

    /// Sets the vertical range to `[-eps, max + eps]`, where `max` is the
    /// largest value over every curve and never below `1 + eps`.
    pub fn fix_lim(&mut self) {
        let eps = self.margin;
        let top = self
            .curves
            .iter()
            .chain(self.current.iter())
            .map(|&id| curve_max(&self.spectra, id))
            .fold(1.0 + eps, f64::max);
        self.spectra.set_ylim(-eps, top + eps);
    }

    fn start(&mut self, point: DataPoint) -> PointMarker {
        self.commit();
        let marker = self.points.create(point);
        let curve = spectrum_curve(&self.cube, marker.pixel);
        self.current = Some(self.spectra.add_actor(curve, marker.color));
        marker
    }

    fn track(&mut self, point: DataPoint) -> Result<()> {
        let (Some(pixel), Some(curve)) = (self.points.place(point)?, self.current) else {
            return Ok(());
        };
        self.spectra
            .set_geometry(curve, spectrum_curve(&self.cube, pixel))?;
        self.fix_lim();
        Ok(())
    }

    fn commit(&mut self) {
        self.points.commit();
        if let Some(curve) = self.current.take() {
            self.curves.push(curve);
        }
    }

    /// Full redraw of both surfaces.
    pub fn redraw(&mut self) {
        self.points.surface_mut().redraw();
        self.spectra.redraw();
    }

    /// Removes every point and spectrum.
    pub fn clear(&mut self) {
        for curve in self.curves.drain(..).chain(self.current.take()) {
            if let Err(err) = self.spectra.remove_actor(curve) {
                warn!("spectrum curve: {err}");
            }
        }
        self.points.clear();
        self.fix_lim();
    }

    /// Replaces every point with committed ones at the given pixels and
    /// redraws.
    pub fn set_points(&mut self, pixels: &[Pixel]) {
        self.clear();
        for marker in self.points.set_points(pixels) {
            let curve = spectrum_curve(&self.cube, marker.pixel);
            self.curves.push(self.spectra.add_actor(curve, marker.color));
        }
        self.fix_lim();
        self.redraw();
        debug!("lumen rebuilt with {} points", self.curves.len());
    }

    /// Replaces the scalar channel on the input surface.
    pub fn set_channel(&mut self, channel: Raster) {
        self.points.surface_mut().bind(channel);
        self.redraw();
    }

    /// Replaces the spectral cube and resamples every curve.
    ///
    /// # Errors
    /// Returns an error if a curve actor is gone from the spectra surface.
    pub fn set_cube(&mut self, cube: Rc<Raster>) -> Result<()> {
        self.cube = cube;
        let markers = self.points.committed().iter().chain(self.points.current());
        for (marker, &curve) in markers.zip(self.curves.iter().chain(self.current.iter())) {
            self.spectra
                .set_geometry(curve, spectrum_curve(&self.cube, marker.pixel))?;
        }
        self.fit_bands();
        self.fix_lim();
        self.redraw();
        Ok(())
    }
}

impl Probe for Lumen {
    fn pane(&self, pane: Pane) -> Option<&Surface> {
        match pane {
            Pane::Input => Some(self.points.surface()),
            Pane::Output => Some(&self.spectra),
            Pane::Detail => None,
        }
    }

    fn pane_mut(&mut self, pane: Pane) -> Option<&mut Surface> {
        match pane {
            Pane::Input => Some(self.points.surface_mut()),
            Pane::Output => Some(&mut self.spectra),
            Pane::Detail => None,
        }
    }

    fn actors(&self) -> Vec<ActorRef> {
        let mut actors = self.points.actors();
        actors.extend(self.current.map(|id| ActorRef::new(Pane::Output, id)));
        actors
    }

    fn on_primary_press(&mut self, event: &PointerEvent) -> Result<()> {
        self.start(event.point());
        Ok(())
    }

    fn on_secondary_press(&mut self, event: &PointerEvent) -> Result<()> {
        self.start(event.point());
        Ok(())
    }

    fn after_drag(&mut self, event: &PointerEvent) -> Result<()> {
        self.track(event.point())
    }

    fn on_release(&mut self, event: &PointerEvent) -> Result<()> {
        self.track(event.point())
    }

    fn after_release(&mut self, _event: &PointerEvent) -> Result<()> {
        self.commit();
        Ok(())
    }
}
