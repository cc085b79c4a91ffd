use log::{debug, warn};
use probekit_core::Raster;

use super::Slice;
use crate::actor::{ActorRef, Pane};
use crate::error::Result;
use crate::session::{PointerEvent, Probe};
use crate::surface::Surface;

/// Column profile previewed under the hovering pointer.
///
/// Moving without a button shows a line and its profile; a click commits
/// the previewed line and starts a new hidden preview; leaving the input
/// surface hides the preview.
#[derive(Debug)]
pub struct HoverSlice {
    slice: Slice,
    shown: bool,
}

impl HoverSlice {
    /// Creates the probe with a hidden preview.
    #[must_use]
    pub fn new(lines: Surface, profile: Surface) -> Self {
        let mut hover = Self {
            slice: Slice::new(lines, profile),
            shown: false,
        };
        if let Err(err) = hover.start_preview() {
            warn!("hover preview: {err}");
        }
        hover
    }

    /// The underlying slice.
    #[must_use]
    pub fn slice(&self) -> &Slice {
        &self.slice
    }

    /// Committed columns.
    #[must_use]
    pub fn positions(&self) -> Vec<usize> {
        self.slice.positions()
    }

    /// True while the preview is visible.
    #[must_use]
    pub fn is_previewing(&self) -> bool {
        self.shown
    }

    fn start_preview(&mut self) -> Result<()> {
        self.slice.start(0.0);
        self.show(false)
    }

    fn show(&mut self, visible: bool) -> Result<()> {
        if let Some((line, curve)) = self.slice.current_actors() {
            self.slice.surface_mut().set_visible(line, visible)?;
            self.slice
                .pane_mut(Pane::Output)
                .map_or(Ok(()), |profile| profile.set_visible(curve, visible))?;
        }
        self.shown = visible;
        Ok(())
    }

    fn commit_at(&mut self, x: f64) -> Result<()> {
        self.slice.track(x)?;
        self.show(true)?;
        if let Some(marker) = self.slice.commit() {
            debug!("hover slice committed column {}", marker.x);
        }
        self.start_preview()?;
        self.slice.redraw();
        Ok(())
    }

    /// Binds a new raster, refits the profile view and resamples every
    /// committed line.
    ///
    /// # Errors
    /// Returns an error if a line or curve actor is gone.
    pub fn set_raster(&mut self, raster: Raster) -> Result<()> {
        self.slice.set_raster(raster)
    }
}

impl Probe for HoverSlice {
    fn pane(&self, pane: Pane) -> Option<&Surface> {
        self.slice.pane(pane)
    }

    fn pane_mut(&mut self, pane: Pane) -> Option<&mut Surface> {
        self.slice.pane_mut(pane)
    }

    fn actors(&self) -> Vec<ActorRef> {
        self.slice.actors()
    }

    fn on_primary_press(&mut self, event: &PointerEvent) -> Result<()> {
        self.commit_at(event.x)
    }

    fn on_secondary_press(&mut self, event: &PointerEvent) -> Result<()> {
        self.commit_at(event.x)
    }

    fn exit_condition(&self) -> bool {
        true
    }

    fn on_hover(&mut self, event: &PointerEvent) -> Result<bool> {
        if !self.shown {
            self.show(true)?;
        }
        self.slice.track(event.x)?;
        Ok(true)
    }

    fn on_leave(&mut self) -> Result<()> {
        self.show(false)
    }
}
