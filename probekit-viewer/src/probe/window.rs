use std::fmt;

use log::{debug, warn};
use probekit_core::{Bounds, Color, ColorCycle, DataPoint, Rect};
use serde::Serialize;

use super::raster_extent;
use crate::actor::{ActorId, ActorRef, Geometry, Pane};
use crate::error::{Error, Result};
use crate::session::{PointerEvent, Probe};
use crate::surface::Surface;

/// Stable identity of a rectangle, never reused within one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One rectangle owned by a [`WindowProbe`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowRegion {
    /// Region identity.
    pub id: RegionId,
    /// Outline actor on the input surface.
    pub actor: ActorId,
    /// Raw geometry; the extent is signed while dragging backwards.
    pub rect: Rect,
    /// Color assigned at creation.
    pub color: Color,
}

#[derive(Debug, Clone, Copy)]
struct DragAnchor {
    origin: (f64, f64),
    press: DataPoint,
}

/// Resizable, movable rectangles.
///
/// The primary button creates a rectangle and resizes it; the secondary
/// button selects the smallest rectangle under the pointer and moves it.
#[derive(Debug)]
pub struct WindowProbe {
    surface: Surface,
    colors: ColorCycle,
    regions: Vec<WindowRegion>,
    selected: Option<RegionId>,
    anchor: Option<DragAnchor>,
    next_id: u32,
}

impl WindowProbe {
    /// Creates a probe drawing on `surface`.
    #[must_use]
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            colors: ColorCycle::new(),
            regions: Vec::new(),
            selected: None,
            anchor: None,
            next_id: 0,
        }
    }

    /// Input surface.
    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Mutable input surface.
    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    /// Rectangles in creation order.
    #[must_use]
    pub fn regions(&self) -> &[WindowRegion] {
        &self.regions
    }

    /// Looks up a rectangle.
    #[must_use]
    pub fn region(&self, id: RegionId) -> Option<&WindowRegion> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Identity of the selected rectangle.
    #[must_use]
    pub fn selected(&self) -> Option<RegionId> {
        self.selected
    }

    /// The selected rectangle.
    #[must_use]
    pub fn selected_region(&self) -> Option<&WindowRegion> {
        self.selected.and_then(|id| self.region(id))
    }

    fn emphasize(&mut self, id: Option<RegionId>, on: bool) {
        if let Some(region) = id.and_then(|id| self.region(id)) {
            let (id, actor) = (region.id, region.actor);
            if let Err(err) = self.surface.set_emphasized(actor, on) {
                warn!("region {id} outline: {err}");
            }
        }
    }

    /// Selects a rectangle by identity. Returns false if it does not exist.
    pub fn select(&mut self, id: Option<RegionId>) -> bool {
        if id.is_some_and(|id| self.region(id).is_none()) {
            return false;
        }
        self.emphasize(self.selected, false);
        self.selected = id;
        self.emphasize(id, true);
        true
    }

    /// Adds a zero-size rectangle at `point` and selects it.
    pub fn create(&mut self, point: DataPoint) -> RegionId {
        let id = RegionId(self.next_id);
        self.next_id += 1;
        let rect = Rect::at(point);
        let color = self.colors.next_color();
        let actor = self.surface.add_actor(Geometry::Rect(rect), color);
        self.regions.push(WindowRegion {
            id,
            actor,
            rect,
            color,
        });
        self.select(Some(id));
        debug!("created region {id} at ({:.1}, {:.1})", point.x, point.y);
        id
    }

    /// Selects the smallest rectangle containing `point`.
    ///
    /// Among rectangles of equal area the earliest created wins. Clears the
    /// selection when nothing contains the point.
    pub fn select_at(&mut self, point: DataPoint) -> Option<RegionId> {
        let mut best: Option<(RegionId, f64)> = None;
        for region in &self.regions {
            let area = region.rect.area();
            if region.rect.contains(point) && best.map_or(true, |(_, min)| area < min) {
                best = Some((region.id, area));
            }
        }
        let hit = best.map(|(id, _)| id);
        self.select(hit);
        self.anchor = self.selected_region().map(|region| DragAnchor {
            origin: (region.rect.x, region.rect.y),
            press: point,
        });
        hit
    }

    fn update_selected(&mut self, change: impl FnOnce(&mut Rect)) -> Result<()> {
        let id = self.selected.ok_or(Error::NoRegion)?;
        let Some(region) = self.regions.iter_mut().find(|r| r.id == id) else {
            return Err(Error::NoRegion);
        };
        change(&mut region.rect);
        self.surface
            .set_geometry(region.actor, Geometry::Rect(region.rect))
    }

    /// Moves the selected rectangle's opposite corner to `pointer`.
    ///
    /// # Errors
    /// Returns [`Error::NoRegion`] with nothing selected.
    pub fn resize_selected(&mut self, pointer: DataPoint) -> Result<()> {
        self.update_selected(|rect| rect.resize_to(pointer))
    }

    /// Moves the selected rectangle by the pointer travel since the
    /// secondary press.
    ///
    /// # Errors
    /// Returns [`Error::NoRegion`] with nothing selected.
    pub fn translate_selected(&mut self, pointer: DataPoint) -> Result<()> {
        let Some(anchor) = self.anchor else {
            return Err(Error::NoRegion);
        };
        let x = anchor.origin.0 + pointer.x - anchor.press.x;
        let y = anchor.origin.1 + pointer.y - anchor.press.y;
        self.update_selected(|rect| rect.move_to(x, y))
    }

    /// Normalized bounds of a rectangle, clamped to the bound raster.
    #[must_use]
    pub fn bounds(&self, id: RegionId) -> Option<Bounds> {
        let (width, height) = raster_extent(&self.surface);
        self.region(id).map(|r| r.rect.normalized(width, height))
    }

    /// Normalized bounds of the selected rectangle.
    #[must_use]
    pub fn points(&self) -> Option<Bounds> {
        self.selected.and_then(|id| self.bounds(id))
    }

    /// Sets the selected rectangle to span `bounds`.
    ///
    /// # Errors
    /// Returns [`Error::NoRegion`] with nothing selected.
    pub fn set_points(&mut self, bounds: Bounds) -> Result<()> {
        self.update_selected(|rect| *rect = Rect::from_bounds(bounds))
    }

    /// Removes the selected rectangle and returns its identity.
    pub fn remove_selected(&mut self) -> Option<RegionId> {
        let id = self.selected.take()?;
        self.anchor = None;
        let index = self.regions.iter().position(|r| r.id == id)?;
        let region = self.regions.remove(index);
        if let Err(err) = self.surface.remove_actor(region.actor) {
            warn!("region {id} outline: {err}");
        }
        debug!("removed region {id}");
        Some(id)
    }

    /// Removes every rectangle and redraws.
    pub fn clear(&mut self) {
        for region in self.regions.drain(..) {
            if let Err(err) = self.surface.remove_actor(region.actor) {
                warn!("region {} outline: {err}", region.id);
            }
        }
        self.selected = None;
        self.anchor = None;
        self.surface.redraw();
    }
}

impl Probe for WindowProbe {
    fn pane(&self, pane: Pane) -> Option<&Surface> {
        (pane == Pane::Input).then_some(&self.surface)
    }

    fn pane_mut(&mut self, pane: Pane) -> Option<&mut Surface> {
        (pane == Pane::Input).then_some(&mut self.surface)
    }

    fn actors(&self) -> Vec<ActorRef> {
        self.selected_region()
            .map(|r| ActorRef::new(Pane::Input, r.actor))
            .into_iter()
            .collect()
    }

    fn on_primary_press(&mut self, event: &PointerEvent) -> Result<()> {
        self.create(event.point());
        Ok(())
    }

    fn on_secondary_press(&mut self, event: &PointerEvent) -> Result<()> {
        self.select_at(event.point());
        Ok(())
    }

    fn exit_condition(&self) -> bool {
        self.selected.is_none()
    }

    fn on_primary_drag(&mut self, event: &PointerEvent) -> Result<()> {
        self.resize_selected(event.point())
    }

    fn on_secondary_drag(&mut self, event: &PointerEvent) -> Result<()> {
        self.translate_selected(event.point())
    }
}
