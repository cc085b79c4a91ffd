use log::{debug, warn};
use probekit_core::{Color, ColorCycle, DataPoint, Pixel};

use super::raster_extent;
use crate::actor::{ActorId, ActorRef, Geometry, Pane};
use crate::error::Result;
use crate::session::{PointerEvent, Probe};
use crate::surface::Surface;

/// A marker placed by a [`PointProbe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointMarker {
    /// Marker actor on the input surface.
    pub actor: ActorId,
    /// Rounded pixel position.
    pub pixel: Pixel,
    /// Color assigned at creation.
    pub color: Color,
}

/// Drops markers at rounded pixel positions.
///
/// Both buttons create a new marker; dragging moves it and releasing
/// commits it.
#[derive(Debug)]
pub struct PointProbe {
    surface: Surface,
    colors: ColorCycle,
    current: Option<PointMarker>,
    committed: Vec<PointMarker>,
}

impl PointProbe {
    /// Creates a probe drawing on `surface`.
    #[must_use]
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            colors: ColorCycle::new(),
            current: None,
            committed: Vec::new(),
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

    fn pixel(&self, point: DataPoint) -> Pixel {
        let (width, height) = raster_extent(&self.surface);
        point.to_pixel(width, height)
    }

    /// Starts a new marker at the rounded point with the next cycle color.
    ///
    /// A marker still being dragged is committed first.
    pub fn create(&mut self, point: DataPoint) -> PointMarker {
        self.commit();
        let pixel = self.pixel(point);
        let color = self.colors.next_color();
        let at = pixel.to_data();
        let actor = self
            .surface
            .add_actor(Geometry::Marker { x: at.x, y: at.y }, color);
        let marker = PointMarker {
            actor,
            pixel,
            color,
        };
        self.current = Some(marker);
        marker
    }

    /// Moves the current marker to the rounded point.
    ///
    /// # Errors
    /// Returns an error if the marker actor is gone from the surface.
    pub fn place(&mut self, point: DataPoint) -> Result<Option<Pixel>> {
        let pixel = self.pixel(point);
        let Some(marker) = self.current.as_mut() else {
            return Ok(None);
        };
        marker.pixel = pixel;
        let at = pixel.to_data();
        self.surface
            .set_geometry(marker.actor, Geometry::Marker { x: at.x, y: at.y })?;
        Ok(Some(pixel))
    }

    /// Commits the current marker.
    pub fn commit(&mut self) {
        if let Some(marker) = self.current.take() {
            self.committed.push(marker);
        }
    }

    /// Marker being dragged.
    #[must_use]
    pub fn current(&self) -> Option<&PointMarker> {
        self.current.as_ref()
    }

    /// Committed markers in creation order.
    #[must_use]
    pub fn committed(&self) -> &[PointMarker] {
        &self.committed
    }

    /// Committed pixel positions.
    #[must_use]
    pub fn points(&self) -> Vec<Pixel> {
        self.committed.iter().map(|m| m.pixel).collect()
    }

    /// Committed positions followed by the marker being dragged.
    #[must_use]
    pub fn all_points(&self) -> Vec<Pixel> {
        self.committed
            .iter()
            .chain(self.current.iter())
            .map(|m| m.pixel)
            .collect()
    }

    /// Removes every marker and restarts the color cycle.
    pub fn clear(&mut self) {
        for marker in self.committed.drain(..).chain(self.current.take()) {
            if let Err(err) = self.surface.remove_actor(marker.actor) {
                warn!("point marker: {err}");
            }
        }
        self.colors.reset();
    }

    /// Replaces every marker with committed ones at the given pixels.
    pub fn set_points(&mut self, pixels: &[Pixel]) -> Vec<PointMarker> {
        self.clear();
        for pixel in pixels {
            self.create(pixel.to_data());
            self.commit();
        }
        debug!("rebuilt {} points", self.committed.len());
        self.committed.clone()
    }
}

impl Probe for PointProbe {
    fn pane(&self, pane: Pane) -> Option<&Surface> {
        (pane == Pane::Input).then_some(&self.surface)
    }

    fn pane_mut(&mut self, pane: Pane) -> Option<&mut Surface> {
        (pane == Pane::Input).then_some(&mut self.surface)
    }

    fn actors(&self) -> Vec<ActorRef> {
        self.current
            .iter()
            .map(|m| ActorRef::new(Pane::Input, m.actor))
            .collect()
    }

    fn on_primary_press(&mut self, event: &PointerEvent) -> Result<()> {
        self.create(event.point());
        Ok(())
    }

    fn on_secondary_press(&mut self, event: &PointerEvent) -> Result<()> {
        self.create(event.point());
        Ok(())
    }

    fn after_drag(&mut self, event: &PointerEvent) -> Result<()> {
        self.place(event.point()).map(|_| ())
    }

    fn on_release(&mut self, event: &PointerEvent) -> Result<()> {
        self.place(event.point()).map(|_| ())
    }

    fn after_release(&mut self, _event: &PointerEvent) -> Result<()> {
        self.commit();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::Colormap;
    use crate::session::{Button, Interactive};
    use crate::surface::SurfaceStyle;
    use probekit_core::{Raster, PALETTE};

    fn probe() -> Interactive<PointProbe> {
        let raster = Raster::filled(20, 30, 1, 0.0).unwrap();
        let surface = Surface::scaled(
            "points",
            raster,
            1,
            Colormap::Grayscale,
            SurfaceStyle::default(),
        );
        Interactive::new(PointProbe::new(surface))
    }

    #[test]
    fn test_press_drag_release_commits_rounded_point() {
        let mut points = probe();
        assert!(points
            .press(PointerEvent::new(3.2, 4.7, Button::Primary))
            .unwrap());
        assert_eq!(points.probe().current().unwrap().pixel, Pixel::new(3, 5));
        points
            .motion(PointerEvent::new(10.6, 2.4, Button::Primary))
            .unwrap();
        points
            .release(PointerEvent::new(11.4, 2.4, Button::Primary))
            .unwrap();
        assert!(points.probe().current().is_none());
        assert_eq!(points.probe().points(), vec![Pixel::new(11, 2)]);
    }

    #[test]
    fn test_both_buttons_create_with_cycle_colors() {
        let mut points = probe();
        for button in [Button::Primary, Button::Secondary, Button::Primary] {
            points.press(PointerEvent::new(1.0, 1.0, button)).unwrap();
            points.release(PointerEvent::new(1.0, 1.0, button)).unwrap();
        }
        let colors: Vec<Color> = points.probe().committed().iter().map(|m| m.color).collect();
        assert_eq!(colors, PALETTE[..3].to_vec());
    }

    #[test]
    fn test_press_outside_is_ignored() {
        let mut points = probe();
        assert!(!points
            .press(PointerEvent::new(-3.0, 4.0, Button::Primary))
            .unwrap());
        assert!(points.probe().current().is_none());
        assert!(!points.session().is_active());
    }

    #[test]
    fn test_set_points_rebuilds() {
        let mut points = probe();
        points.press(PointerEvent::new(1.0, 1.0, Button::Primary)).unwrap();
        points.release(PointerEvent::new(1.0, 1.0, Button::Primary)).unwrap();
        let rebuilt = points
            .probe_mut()
            .set_points(&[Pixel::new(4, 5), Pixel::new(6, 7)]);
        assert_eq!(rebuilt.len(), 2);
        assert_eq!(rebuilt[0].color, PALETTE[0]);
        assert_eq!(points.probe().surface().actors().len(), 2);
    }
}
