use log::warn;
use probekit_algorithms::{column_profile, padded_range, plane_range};
use probekit_core::convert::usize_to_f64;
use probekit_core::Raster;

use crate::actor::{ActorId, ActorRef, Geometry, Pane};
use crate::error::Result;
use crate::probe::{LineMarker, LineProbe};
use crate::session::{PointerEvent, Probe};
use crate::surface::Surface;

/// Line probe with the intensity profile of each column.
///
/// The profile surface spans the raster height horizontally and the
/// raster's global value range vertically.
#[derive(Debug)]
pub struct Slice {
    lines: LineProbe,
    profile: Surface,
    current: Option<ActorId>,
    curves: Vec<ActorId>,
}

fn profile_curve(raster: Option<&Raster>, column: usize) -> Geometry {
    let points = raster
        .map(|raster| column_profile(raster.plane(), column))
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(row, value)| [usize_to_f64(row), value])
        .collect();
    Geometry::Curve { points }
}

impl Slice {
    /// Creates the probe with lines on `lines` and profiles on `profile`.
    #[must_use]
    pub fn new(lines: Surface, profile: Surface) -> Self {
        let mut slice = Self {
            lines: LineProbe::new(lines),
            profile,
            current: None,
            curves: Vec::new(),
        };
        slice.fix_lim();
        slice
    }

    /// The line probe.
    #[must_use]
    pub fn lines(&self) -> &LineProbe {
        &self.lines
    }

    /// Surface holding the lines and the sampled raster.
    #[must_use]
    pub fn surface(&self) -> &Surface {
        self.lines.surface()
    }

    /// Mutable surface holding the lines.
    pub fn surface_mut(&mut self) -> &mut Surface {
        self.lines.surface_mut()
    }

    /// The profile surface.
    #[must_use]
    pub fn profile(&self) -> &Surface {
        &self.profile
    }

    /// Curve actors of committed lines, aligned with
    /// [`LineProbe::committed`].
    #[must_use]
    pub fn curves(&self) -> &[ActorId] {
        &self.curves
    }

    /// Actor of the line being dragged and its curve.
    pub(crate) fn current_actors(&self) -> Option<(ActorId, ActorId)> {
        Some((self.lines.current()?.actor, self.current?))
    }

    /// Committed columns.
    #[must_use]
    pub fn positions(&self) -> Vec<usize> {
        self.lines.positions()
    }

    /// Fits the profile view to the raster height and value range.
    pub fn fix_lim(&mut self) {
        let Some(raster) = self.lines.surface().raster() else {
            return;
        };
        let height = usize_to_f64(raster.height());
        let (lo, hi) = padded_range(plane_range(raster.plane()), 0.0);
        self.profile.set_xlim(0.0, height);
        self.profile.set_ylim(lo, hi);
    }

    pub(crate) fn start(&mut self, x: f64) -> LineMarker {
        self.commit();
        let marker = self.lines.create(x);
        let curve = profile_curve(self.lines.surface().raster(), marker.x);
        self.current = Some(self.profile.add_actor(curve, marker.color));
        marker
    }

    pub(crate) fn track(&mut self, x: f64) -> Result<()> {
        let (Some(column), Some(curve)) = (self.lines.place(x)?, self.current) else {
            return Ok(());
        };
        let geometry = profile_curve(self.lines.surface().raster(), column);
        self.profile.set_geometry(curve, geometry)
    }

    pub(crate) fn commit(&mut self) -> Option<LineMarker> {
        let marker = self.lines.commit();
        if let Some(curve) = self.current.take() {
            self.curves.push(curve);
        }
        marker
    }

    /// Adds a committed line and its profile at a column.
    pub fn add_committed(&mut self, x: usize) -> LineMarker {
        let marker = self.start(usize_to_f64(x));
        self.commit();
        marker
    }

    /// Removes every line and curve without redrawing.
    pub fn clear(&mut self) {
        for curve in self.curves.drain(..).chain(self.current.take()) {
            if let Err(err) = self.profile.remove_actor(curve) {
                warn!("profile curve: {err}");
            }
        }
        self.lines.remove_all();
    }

    /// Restarts the line color cycle.
    pub fn reset_colors(&mut self) {
        self.lines.reset_colors();
    }

    /// Moves committed lines to `positions`, each clamped to the last
    /// column, and resamples their profiles from the bound raster.
    ///
    /// # Errors
    /// Returns an error if a line or curve actor is gone.
    pub fn resample(&mut self, positions: &[usize]) -> Result<()> {
        let width = self.lines.surface().raster().map_or(0, Raster::width);
        for (index, &x) in positions.iter().enumerate() {
            let Some(&curve) = self.curves.get(index) else {
                break;
            };
            let column = x.min(width.saturating_sub(1));
            self.lines.set_committed(index, column)?;
            let geometry = profile_curve(self.lines.surface().raster(), column);
            self.profile.set_geometry(curve, geometry)?;
        }
        self.fix_lim();
        Ok(())
    }

    /// Binds a new raster to the line surface and resamples every line.
    ///
    /// # Errors
    /// Returns an error if a line or curve actor is gone.
    pub fn set_raster(&mut self, raster: Raster) -> Result<()> {
        self.lines.surface_mut().bind(raster);
        let positions = self.positions();
        self.resample(&positions)?;
        self.redraw();
        Ok(())
    }

    /// Full redraw of both surfaces.
    pub fn redraw(&mut self) {
        self.lines.surface_mut().redraw();
        self.profile.redraw();
    }
}

impl Probe for Slice {
    fn pane(&self, pane: Pane) -> Option<&Surface> {
        match pane {
            Pane::Input => Some(self.lines.surface()),
            Pane::Output => Some(&self.profile),
            Pane::Detail => None,
        }
    }

    fn pane_mut(&mut self, pane: Pane) -> Option<&mut Surface> {
        match pane {
            Pane::Input => Some(self.lines.surface_mut()),
            Pane::Output => Some(&mut self.profile),
            Pane::Detail => None,
        }
    }

    fn actors(&self) -> Vec<ActorRef> {
        self.current_actors()
            .map(|(line, curve)| {
                vec![
                    ActorRef::new(Pane::Input, line),
                    ActorRef::new(Pane::Output, curve),
                ]
            })
            .unwrap_or_default()
    }

    fn on_primary_press(&mut self, event: &PointerEvent) -> Result<()> {
        self.start(event.x);
        Ok(())
    }

    fn on_secondary_press(&mut self, event: &PointerEvent) -> Result<()> {
        self.start(event.x);
        Ok(())
    }

    fn after_drag(&mut self, event: &PointerEvent) -> Result<()> {
        self.track(event.x)
    }

    fn on_release(&mut self, event: &PointerEvent) -> Result<()> {
        self.track(event.x)
    }

    fn after_release(&mut self, _event: &PointerEvent) -> Result<()> {
        self.commit();
        Ok(())
    }
}
