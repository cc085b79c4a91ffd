//! Rectangles whose sub-images carry their own column profiles.
//!
//! The input surface holds rectangles. The selected rectangle's crop is
//! shown on the crop surface, where a [`KeyedLineContainer`] keeps one
//! set of column lines per rectangle. Selecting another rectangle swaps
//! the drawn lines for that rectangle's stored set; moving or resizing a
//! rectangle resamples its lines from the new crop.

use log::{debug, warn};
use probekit_core::text::{format_bounds, parse_bounds};
use probekit_core::{Bounds, Raster};

use crate::actor::{ActorRef, Pane};
use crate::colormap::Colormap;
use crate::composite::{CropImage, TextEdit};
use crate::error::{Error, Result};
use crate::probe::{RegionId, WindowProbe};
use crate::session::{PointerEvent, Probe};
use crate::storage::KeyedLineContainer;
use crate::surface::Surface;

/// Rectangle probe with per-rectangle column profiles of the crop.
#[derive(Debug)]
pub struct LimSlice {
    window: WindowProbe,
    image: CropImage,
    container: KeyedLineContainer,
    text: String,
}

impl LimSlice {
    /// Creates the probe. The crop surface initially shows the whole
    /// channel bound to `window`.
    #[must_use]
    pub fn new(window: Surface, mut crop: Surface, profile: Surface, colormap: Colormap) -> Self {
        let image = match window.raster() {
            Some(source) => CropImage::new(&mut crop, source, colormap),
            None => CropImage::placeholder(&mut crop, colormap),
        };
        Self {
            window: WindowProbe::new(window),
            image,
            container: KeyedLineContainer::new(crop, profile),
            text: String::new(),
        }
    }

    /// The rectangle probe.
    #[must_use]
    pub fn window(&self) -> &WindowProbe {
        &self.window
    }

    /// The crop image state.
    #[must_use]
    pub fn image(&self) -> &CropImage {
        &self.image
    }

    /// The per-rectangle line storage drawn on the crop surface.
    #[must_use]
    pub fn container(&self) -> &KeyedLineContainer {
        &self.container
    }

    /// Mutable line storage, driven by its own session on the crop surface.
    pub fn container_mut(&mut self) -> &mut KeyedLineContainer {
        &mut self.container
    }

    /// Bounds text of the selected rectangle.
    #[must_use]
    pub fn bounds_text(&self) -> &str {
        &self.text
    }

    /// Line text of the selected rectangle.
    #[must_use]
    pub fn lines_text(&self) -> &str {
        self.container.text()
    }

    /// Bounds of every rectangle with stored lines, in key order.
    pub fn stored_regions(&self) -> impl Iterator<Item = (RegionId, Bounds)> + '_ {
        self.container
            .keys()
            .filter_map(|key| self.window.bounds(key).map(|bounds| (key, bounds)))
    }

    fn update_text(&mut self) {
        self.text = self
            .window
            .points()
            .map(|bounds| format_bounds(&bounds))
            .unwrap_or_default();
        self.container.update_text();
    }

    fn refresh(&mut self) -> Result<bool> {
        let (Some(bounds), Some(source)) = (self.window.points(), self.window.surface().raster())
        else {
            return Ok(false);
        };
        self.image
            .refresh(self.container.surface_mut(), source, bounds)
    }

    /// Full redraw of every surface.
    pub fn redraw(&mut self) {
        self.window.surface_mut().redraw();
        self.container.redraw();
    }

    /// Removes the selected rectangle together with its stored lines.
    pub fn remove_selected(&mut self) -> Option<RegionId> {
        let removed = self.window.remove_selected()?;
        if self.container.key() == Some(removed) {
            self.container.delete_key();
        }
        self.update_text();
        self.redraw();
        debug!("removed region {removed}");
        Some(removed)
    }

    /// Applies edited bounds text to the selected rectangle.
    ///
    /// Empty text removes the rectangle and its lines. Malformed text
    /// leaves everything untouched.
    ///
    /// # Errors
    /// Returns [`Error::Core`] for malformed text and [`Error::NoRegion`]
    /// with nothing selected.
    pub fn apply_bounds_text(&mut self, text: &str) -> Result<TextEdit> {
        let parsed = parse_bounds(text).inspect_err(|err| warn!("rejected bounds text: {err}"))?;
        if self.window.selected().is_none() {
            return Err(Error::NoRegion);
        }
        let Some(bounds) = parsed else {
            self.remove_selected();
            return Ok(TextEdit::Removed);
        };
        if self.window.points() == Some(bounds) {
            return Ok(TextEdit::Unchanged);
        }
        self.window.set_points(bounds)?;
        self.refresh()?;
        self.container.resample()?;
        self.update_text();
        self.redraw();
        Ok(TextEdit::Applied)
    }

    /// Applies edited line text to the selected rectangle.
    ///
    /// # Errors
    /// See [`KeyedLineContainer::apply_text`].
    pub fn apply_lines_text(&mut self, text: &str) -> Result<TextEdit> {
        self.container.apply_text(text)
    }

    /// Replaces the scalar channel. The crop follows the selected
    /// rectangle and stored lines are resampled with width clamping.
    ///
    /// # Errors
    /// Returns an error if a view actor is gone.
    pub fn set_channel(&mut self, channel: Raster) -> Result<()> {
        self.image.set_source(&channel);
        self.window.surface_mut().bind(channel);
        self.refresh()?;
        self.container.resample()?;
        self.update_text();
        self.redraw();
        Ok(())
    }
}

impl Probe for LimSlice {
    fn pane(&self, pane: Pane) -> Option<&Surface> {
        match pane {
            Pane::Input => Some(self.window.surface()),
            Pane::Output => Some(self.container.surface()),
            Pane::Detail => Some(self.container.slice().profile()),
        }
    }

    fn pane_mut(&mut self, pane: Pane) -> Option<&mut Surface> {
        match pane {
            Pane::Input => Some(self.window.surface_mut()),
            Pane::Output => self.container.pane_mut(Pane::Input),
            Pane::Detail => self.container.pane_mut(Pane::Output),
        }
    }

    fn actors(&self) -> Vec<ActorRef> {
        let mut actors = self.window.actors();
        actors.push(ActorRef::new(Pane::Output, self.image.actor()));
        let slice = self.container.slice();
        actors.extend(
            slice
                .lines()
                .committed()
                .iter()
                .map(|marker| ActorRef::new(Pane::Output, marker.actor)),
        );
        actors.extend(
            slice
                .curves()
                .iter()
                .map(|&curve| ActorRef::new(Pane::Detail, curve)),
        );
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
        self.refresh()?;
        self.container.set_key(self.window.selected());
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
        self.refresh()?;
        self.update_text();
        self.container.resample()
    }

    fn on_release(&mut self, _event: &PointerEvent) -> Result<()> {
        self.refresh()?;
        self.container.resample()
    }
}
