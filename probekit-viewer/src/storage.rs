//! Per-region line storage for nested line probes.
//!
//! A [`KeyedLineContainer`] keeps one ordered list of line columns per
//! region identity. Exactly one key is current; the lines drawn on screen
//! always mirror the current key's list, so switching keys tears down the
//! drawn set and rebuilds it from storage.

use std::collections::BTreeMap;

use log::{debug, warn};
use probekit_core::text::{format_positions, parse_positions};
use probekit_core::Raster;

use crate::actor::{ActorRef, Pane};
use crate::composite::{Slice, TextEdit};
use crate::error::{Error, Result};
use crate::probe::RegionId;
use crate::session::{PointerEvent, Probe};
use crate::surface::Surface;

/// Line positions stored per region, drawn for the current region only.
#[derive(Debug)]
pub struct KeyedLineContainer {
    slice: Slice,
    lists: BTreeMap<RegionId, Vec<usize>>,
    key: Option<RegionId>,
    text: String,
}

impl KeyedLineContainer {
    /// Creates an empty container drawing lines on `lines` and profiles on
    /// `profile`.
    #[must_use]
    pub fn new(lines: Surface, profile: Surface) -> Self {
        Self {
            slice: Slice::new(lines, profile),
            lists: BTreeMap::new(),
            key: None,
            text: String::new(),
        }
    }

    /// The slice drawing the current key's lines.
    #[must_use]
    pub fn slice(&self) -> &Slice {
        &self.slice
    }

    /// Surface holding the lines and the sampled raster.
    #[must_use]
    pub fn surface(&self) -> &Surface {
        self.slice.surface()
    }

    /// Mutable surface holding the lines.
    pub fn surface_mut(&mut self) -> &mut Surface {
        self.slice.surface_mut()
    }

    /// The current key.
    #[must_use]
    pub fn key(&self) -> Option<RegionId> {
        self.key
    }

    /// Every stored key in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.lists.keys().copied()
    }

    /// Stored positions for a key, empty if the key is unknown.
    #[must_use]
    pub fn positions(&self, key: RegionId) -> &[usize] {
        self.lists.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Stored positions for the current key.
    #[must_use]
    pub fn current_positions(&self) -> &[usize] {
        match self.key {
            Some(key) => self.positions(key),
            None => &[],
        }
    }

    /// Text of the current key's positions, including a line being dragged.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn update_text(&mut self) {
        let mut positions = self.current_positions().to_vec();
        positions.extend(self.slice.lines().current().map(|m| m.x));
        self.text = format_positions(&positions);
    }

    /// Makes `key` current. Returns false, doing nothing, if it already is.
    ///
    /// Otherwise the drawn lines are removed and, for a known key, rebuilt
    /// from storage with colors from a restarted cycle; an unknown key is
    /// stored with an empty list.
    pub fn set_key(&mut self, key: Option<RegionId>) -> bool {
        if self.key == key {
            return false;
        }
        self.key = key;
        self.draw_container();
        debug!("container key set to {key:?}");
        true
    }

    fn draw_container(&mut self) {
        self.slice.clear();
        self.slice.reset_colors();
        if let Some(key) = self.key {
            let positions = self.lists.entry(key).or_default().clone();
            for x in positions {
                self.slice.add_committed(x);
            }
        }
        self.update_text();
        self.slice.redraw();
    }

    /// Appends a position to the current key's list.
    pub fn append(&mut self, x: usize) {
        if let Some(key) = self.key {
            self.lists.entry(key).or_default().push(x);
        }
    }

    /// Drops the current key's list and clears the drawn lines.
    pub fn delete_key(&mut self) -> Option<Vec<usize>> {
        let key = self.key.take()?;
        self.slice.clear();
        self.update_text();
        self.slice.redraw();
        self.lists.remove(&key)
    }

    /// Resamples every drawn line from the bound raster, clamping stored
    /// columns to the raster width.
    ///
    /// # Errors
    /// Returns an error if a line or curve actor is gone.
    pub fn resample(&mut self) -> Result<()> {
        let positions = self.current_positions().to_vec();
        self.slice.resample(&positions)
    }

    /// Binds a new raster and resamples.
    ///
    /// # Errors
    /// Returns an error if a line or curve actor is gone.
    pub fn set_raster(&mut self, raster: Raster) -> Result<()> {
        let positions = self.current_positions().to_vec();
        self.slice.surface_mut().bind(raster);
        self.slice.resample(&positions)?;
        self.slice.redraw();
        Ok(())
    }

    /// Full redraw of both surfaces.
    pub fn redraw(&mut self) {
        self.slice.redraw();
    }

    /// Replaces the current key's list with positions parsed from text.
    ///
    /// On any failure the stored list and the drawn lines are left as
    /// they were.
    ///
    /// # Errors
    /// Returns [`Error::Core`] for malformed text or a column outside the
    /// bound raster, and [`Error::NoRegion`] with no current key.
    pub fn apply_text(&mut self, text: &str) -> Result<TextEdit> {
        let positions = parse_positions(text).inspect_err(|err| warn!("rejected line text: {err}"))?;
        let key = self.key.ok_or(Error::NoRegion)?;
        if positions == self.positions(key) {
            return Ok(TextEdit::Unchanged);
        }
        let width = self.surface().raster().map_or(0, Raster::width);
        if let Some(&x) = positions.iter().find(|&&x| x >= width) {
            warn!("line {x} is outside a {width} column raster");
            return Err(probekit_core::Error::parse(
                text,
                format!("column {x} is outside the raster width {width}"),
            )
            .into());
        }
        self.lists.insert(key, positions);
        self.draw_container();
        Ok(TextEdit::Applied)
    }
}

impl Probe for KeyedLineContainer {
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
        if self.key.is_some() {
            self.slice.start(event.x);
        }
        Ok(())
    }

    fn on_secondary_press(&mut self, event: &PointerEvent) -> Result<()> {
        self.on_primary_press(event)
    }

    fn exit_condition(&self) -> bool {
        self.key.is_none()
    }

    fn after_press(&mut self, _event: &PointerEvent) -> Result<()> {
        self.update_text();
        Ok(())
    }

    fn after_drag(&mut self, event: &PointerEvent) -> Result<()> {
        self.slice.track(event.x)?;
        self.update_text();
        Ok(())
    }

    fn on_release(&mut self, event: &PointerEvent) -> Result<()> {
        self.slice.track(event.x)?;
        if let Some(x) = self.slice.lines().current().map(|m| m.x) {
            self.append(x);
        }
        Ok(())
    }

    fn after_release(&mut self, _event: &PointerEvent) -> Result<()> {
        self.slice.commit();
        self.update_text();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::Colormap;
    use crate::surface::{SurfaceStyle, ViewBox};

    fn container() -> KeyedLineContainer {
        let raster = Raster::filled(10, 20, 1, 1.0).unwrap();
        let lines = Surface::scaled("crop", raster, 1, Colormap::Grayscale, SurfaceStyle::default());
        let profile = Surface::fixed(
            "profile",
            32,
            24,
            ViewBox::new((0.0, 10.0), (0.0, 2.0)),
            SurfaceStyle::default(),
        );
        KeyedLineContainer::new(lines, profile)
    }

    #[test]
    fn test_set_key_rebuilds_from_storage() {
        let mut container = container();
        assert!(container.set_key(Some(RegionId(0))));
        assert!(!container.set_key(Some(RegionId(0))));
        container.append(3);
        container.append(12);

        assert!(container.set_key(Some(RegionId(1))));
        assert!(container.slice().positions().is_empty());
        assert!(container.positions(RegionId(1)).is_empty());

        container.set_key(Some(RegionId(0)));
        assert_eq!(container.slice().positions(), vec![3, 12]);
        assert_eq!(container.text(), "3 12");
        assert_eq!(container.keys().collect::<Vec<_>>(), vec![RegionId(0), RegionId(1)]);
    }

    #[test]
    fn test_delete_key_drops_lines() {
        let mut container = container();
        container.set_key(Some(RegionId(4)));
        container.append(5);
        assert_eq!(container.delete_key(), Some(vec![5]));
        assert_eq!(container.key(), None);
        assert!(container.exit_condition());
        assert_eq!(container.delete_key(), None);
    }
}
