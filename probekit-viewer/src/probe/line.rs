use log::{debug, warn};
use probekit_core::convert::usize_to_f64;
use probekit_core::text::format_positions;
use probekit_core::{Color, ColorCycle};

use super::{raster_extent, round_column};
use crate::actor::{ActorId, ActorRef, Geometry, Pane};
use crate::error::Result;
use crate::session::{PointerEvent, Probe};
use crate::surface::Surface;

/// A vertical line placed by a [`LineProbe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMarker {
    /// Line actor on the input surface.
    pub actor: ActorId,
    /// Rounded column.
    pub x: usize,
    /// Color assigned at creation.
    pub color: Color,
}

/// Drops full-height vertical lines at rounded columns.
#[derive(Debug)]
pub struct LineProbe {
    surface: Surface,
    colors: ColorCycle,
    current: Option<LineMarker>,
    committed: Vec<LineMarker>,
}

impl LineProbe {
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

    /// Rounds a horizontal coordinate to a column of the bound raster.
    #[must_use]
    pub fn column(&self, x: f64) -> usize {
        round_column(x, raster_extent(&self.surface).0)
    }

    /// Starts a new line at the rounded column with the next cycle color.
    ///
    /// A line still being dragged is committed first.
    pub fn create(&mut self, x: f64) -> LineMarker {
        self.commit();
        let x = self.column(x);
        let color = self.colors.next_color();
        let actor = self.surface.add_actor(
            Geometry::Line {
                x: usize_to_f64(x),
            },
            color,
        );
        let marker = LineMarker { actor, x, color };
        self.current = Some(marker);
        marker
    }

    /// Moves the current line to the rounded column.
    ///
    /// # Errors
    /// Returns an error if the line actor is gone from the surface.
    pub fn place(&mut self, x: f64) -> Result<Option<usize>> {
        let column = self.column(x);
        let Some(marker) = self.current.as_mut() else {
            return Ok(None);
        };
        marker.x = column;
        self.surface.set_geometry(
            marker.actor,
            Geometry::Line {
                x: usize_to_f64(column),
            },
        )?;
        Ok(Some(column))
    }

    /// Commits the current line.
    pub fn commit(&mut self) -> Option<LineMarker> {
        let marker = self.current.take()?;
        self.committed.push(marker);
        Some(marker)
    }

    /// Moves a committed line to a column without rounding or clamping.
    ///
    /// # Errors
    /// Returns an error if the line actor is gone from the surface.
    pub(crate) fn set_committed(&mut self, index: usize, x: usize) -> Result<()> {
        if let Some(marker) = self.committed.get_mut(index) {
            marker.x = x;
            self.surface.set_geometry(
                marker.actor,
                Geometry::Line {
                    x: usize_to_f64(x),
                },
            )?;
        }
        Ok(())
    }

    /// Line being dragged.
    #[must_use]
    pub fn current(&self) -> Option<&LineMarker> {
        self.current.as_ref()
    }

    /// Committed lines in creation order.
    #[must_use]
    pub fn committed(&self) -> &[LineMarker] {
        &self.committed
    }

    /// Committed columns.
    #[must_use]
    pub fn positions(&self) -> Vec<usize> {
        self.committed.iter().map(|m| m.x).collect()
    }

    /// Committed columns as space-separated text.
    #[must_use]
    pub fn text(&self) -> String {
        format_positions(&self.positions())
    }

    /// Restarts the color cycle.
    pub fn reset_colors(&mut self) {
        self.colors.reset();
    }

    /// Removes every line without touching the color cycle.
    pub fn remove_all(&mut self) {
        for marker in self.committed.drain(..).chain(self.current.take()) {
            if let Err(err) = self.surface.remove_actor(marker.actor) {
                warn!("line marker at column {}: {err}", marker.x);
            }
        }
    }

    /// Replaces every line with committed ones at the given columns,
    /// colored from a restarted cycle.
    pub fn set_positions(&mut self, positions: &[usize]) -> Vec<LineMarker> {
        self.remove_all();
        self.reset_colors();
        for &x in positions {
            self.create(usize_to_f64(x));
            self.commit();
        }
        debug!("rebuilt {} lines", self.committed.len());
        self.committed.clone()
    }
}

impl Probe for LineProbe {
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
        self.create(event.x);
        Ok(())
    }

    fn on_secondary_press(&mut self, event: &PointerEvent) -> Result<()> {
        self.create(event.x);
        Ok(())
    }

    fn after_drag(&mut self, event: &PointerEvent) -> Result<()> {
        self.place(event.x).map(|_| ())
    }

    fn on_release(&mut self, event: &PointerEvent) -> Result<()> {
        self.place(event.x).map(|_| ())
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
    use probekit_core::text::parse_positions;
    use probekit_core::{Raster, PALETTE};

    fn probe(width: usize) -> Interactive<LineProbe> {
        let raster = Raster::filled(10, width, 1, 0.0).unwrap();
        let surface = Surface::scaled("lines", raster, 1, Colormap::Grayscale, SurfaceStyle::default());
        Interactive::new(LineProbe::new(surface))
    }

    #[test]
    fn test_line_rounds_on_create_and_release() {
        let mut lines = probe(64);
        lines.press(PointerEvent::new(12.6, 3.0, Button::Primary)).unwrap();
        assert_eq!(lines.probe().current().unwrap().x, 13);
        lines.motion(PointerEvent::new(30.0, 3.0, Button::Primary)).unwrap();
        lines.release(PointerEvent::new(40.2, 3.0, Button::Primary)).unwrap();
        assert_eq!(lines.probe().positions(), vec![40]);
    }

    #[test]
    fn test_text_round_trip() {
        let mut lines = probe(200);
        lines.probe_mut().set_positions(&[12, 45, 130]);
        let text = lines.probe().text();
        assert_eq!(text, "12 45 130");
        assert_eq!(parse_positions(&text).unwrap(), lines.probe().positions());
    }

    #[test]
    fn test_set_positions_restarts_colors() {
        let mut lines = probe(50);
        for x in [1.0, 2.0, 3.0] {
            lines.press(PointerEvent::new(x, 1.0, Button::Secondary)).unwrap();
            lines.release(PointerEvent::new(x, 1.0, Button::Secondary)).unwrap();
        }
        assert_eq!(lines.probe().committed()[2].color, PALETTE[2]);
        let rebuilt = lines.probe_mut().set_positions(&[7]);
        assert_eq!(rebuilt[0].color, PALETTE[0]);
        assert_eq!(lines.probe().surface().actors().len(), 1);
    }
}
