//! Render targets with full and partial (animated) redraw.
//!
//! A [`Surface`] keeps two RGBA buffers. Actors are painted into the
//! framebuffer, and only [`Surface::redraw`] and the present step of
//! [`Surface::step_animated`] copy pixels into the display buffer.
//!
//! Animated sessions follow the usual blitting scheme:
//!
//! 1. [`Surface::begin_animated`] flags the moving actors, redraws
//!    everything else and keeps a copy of the result as the snapshot.
//! 2. [`Surface::step_animated`] restores the snapshot, paints only the
//!    flagged actors and presents the region they cover (plus the region
//!    they covered on the previous step).
//! 3. [`Surface::end_animated`] clears the flags, drops the snapshot and
//!    redraws in full.

use std::path::Path;

use image::{imageops, ImageResult, RgbaImage};
use log::{debug, trace, warn};
use probekit_core::convert::{u32_to_f64, usize_to_f64};
use probekit_core::{Color, DataPoint, Raster};

use crate::actor::{Actor, ActorId, Geometry};
use crate::colormap::Colormap;
use crate::draw::{self, PixelRegion};
use crate::error::{Error, Result};

const BLANK: [u8; 4] = [255, 255, 255, 255];

/// Stroke sizes shared by every actor on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceStyle {
    /// Marker half-size in framebuffer pixels.
    pub marker_radius: u32,
    /// Stroke width of lines, outlines and curves.
    pub line_width: u32,
}

impl Default for SurfaceStyle {
    fn default() -> Self {
        Self {
            marker_radius: 3,
            line_width: 2,
        }
    }
}

/// Data-space extent mapped onto the framebuffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    /// Horizontal limits (left, right).
    pub x: (f64, f64),
    /// Vertical limits (first, second).
    pub y: (f64, f64),
    /// When true the first vertical limit is at the top (image layout);
    /// otherwise it is at the bottom (plot layout).
    pub y_down: bool,
}

impl ViewBox {
    /// Plot-style view with `y` growing upwards.
    #[must_use]
    pub fn new(x: (f64, f64), y: (f64, f64)) -> Self {
        Self {
            x,
            y,
            y_down: false,
        }
    }

    /// Image-style view over a `width` x `height` raster with pixel
    /// centers on integer coordinates.
    #[must_use]
    pub fn image(width: usize, height: usize) -> Self {
        Self {
            x: (-0.5, usize_to_f64(width) - 0.5),
            y: (-0.5, usize_to_f64(height) - 0.5),
            y_down: true,
        }
    }

    /// True if the point lies within the limits, edges included.
    #[must_use]
    pub fn contains(&self, point: DataPoint) -> bool {
        let within = |v: f64, (a, b): (f64, f64)| v >= a.min(b) && v <= a.max(b);
        within(point.x, self.x) && within(point.y, self.y)
    }

    fn fraction(value: f64, (lo, hi): (f64, f64)) -> f64 {
        let span = hi - lo;
        if span.abs() <= f64::EPSILON {
            0.5
        } else {
            (value - lo) / span
        }
    }

    /// Maps a data point to fractional framebuffer coordinates.
    #[must_use]
    pub fn to_pixel(&self, point: DataPoint, (width, height): (u32, u32)) -> (f64, f64) {
        let fx = Self::fraction(point.x, self.x);
        let fy = Self::fraction(point.y, self.y);
        let fy = if self.y_down { fy } else { 1.0 - fy };
        (fx * u32_to_f64(width), fy * u32_to_f64(height))
    }

    /// Maps framebuffer coordinates back to data space.
    #[must_use]
    pub fn to_data(&self, (px, py): (f64, f64), (width, height): (u32, u32)) -> DataPoint {
        let fx = px / u32_to_f64(width.max(1));
        let fy = py / u32_to_f64(height.max(1));
        let fy = if self.y_down { fy } else { 1.0 - fy };
        DataPoint::new(
            self.x.0 + fx * (self.x.1 - self.x.0),
            self.y.0 + fy * (self.y.1 - self.y.0),
        )
    }
}

/// Counters for rendering work done by a surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Calls to [`Surface::redraw`], including those made by animation
    /// begin/end.
    pub full_redraws: u64,
    /// Partial presents made by [`Surface::step_animated`].
    pub partial_presents: u64,
    /// Actors added over the surface lifetime.
    pub actors_added: u64,
    /// Actors removed over the surface lifetime.
    pub actors_removed: u64,
}

#[derive(Debug, Clone, Copy)]
enum Sizing {
    Fixed,
    Scale(u32),
}

#[derive(Debug)]
enum RenderState {
    Idle,
    Animating {
        snapshot: RgbaImage,
        presented: Option<PixelRegion>,
        stale: bool,
    },
}

/// Addressable 2-D render target owning its actors.
#[derive(Debug)]
pub struct Surface {
    name: String,
    sizing: Sizing,
    view: ViewBox,
    raster: Option<Raster>,
    colormap: Colormap,
    background: Option<RgbaImage>,
    actors: Vec<Actor>,
    next_id: u64,
    framebuffer: RgbaImage,
    display: RgbaImage,
    state: RenderState,
    stats: RenderStats,
    style: SurfaceStyle,
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

impl Surface {
    /// Fixed-size surface with no bound raster.
    #[must_use]
    pub fn fixed(name: &str, width: u32, height: u32, view: ViewBox, style: SurfaceStyle) -> Self {
        Self {
            name: name.to_string(),
            sizing: Sizing::Fixed,
            view,
            raster: None,
            colormap: Colormap::default(),
            background: None,
            actors: Vec::new(),
            next_id: 0,
            framebuffer: RgbaImage::from_pixel(width, height, image::Rgba(BLANK)),
            display: RgbaImage::from_pixel(width, height, image::Rgba(BLANK)),
            state: RenderState::Idle,
            stats: RenderStats::default(),
            style,
        }
    }

    /// Surface showing `raster` with `scale` framebuffer pixels per sample.
    ///
    /// The view follows the raster extent whenever a new raster is bound.
    #[must_use]
    pub fn scaled(
        name: &str,
        raster: Raster,
        scale: u32,
        colormap: Colormap,
        style: SurfaceStyle,
    ) -> Self {
        let mut surface = Self::fixed(name, 1, 1, ViewBox::image(1, 1), style);
        surface.sizing = Sizing::Scale(scale.max(1));
        surface.colormap = colormap;
        surface.bind(raster);
        surface
    }

    /// Name used in log messages and errors.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binds a raster as the surface data source.
    ///
    /// Scaled surfaces resize to the raster and render it as background,
    /// dropping any running animation. Fixed surfaces keep their size, view
    /// and animation. The display is untouched until the next redraw.
    pub fn bind(&mut self, raster: Raster) {
        if let Sizing::Scale(scale) = self.sizing {
            if self.is_animating() {
                warn!("{}: raster bound during animation, dropping snapshot", self.name);
                self.state = RenderState::Idle;
                for actor in &mut self.actors {
                    actor.animated = false;
                }
            }
            let width = to_u32(raster.width()).saturating_mul(scale);
            let height = to_u32(raster.height()).saturating_mul(scale);
            self.view = ViewBox::image(raster.width(), raster.height());
            self.framebuffer = RgbaImage::from_pixel(width, height, image::Rgba(BLANK));
            let mut background = self.framebuffer.clone();
            let plane = raster.plane();
            let clim = probekit_algorithms::plane_range(plane).unwrap_or((0.0, 1.0));
            draw::stretch(&mut background, plane, clim, self.colormap);
            self.background = Some(background);
        }
        trace!(
            "{}: bound {}x{}x{} raster",
            self.name,
            raster.height(),
            raster.width(),
            raster.depth()
        );
        self.raster = Some(raster);
    }

    /// The bound raster, if any.
    #[must_use]
    pub fn raster(&self) -> Option<&Raster> {
        self.raster.as_ref()
    }

    /// Current view limits.
    #[must_use]
    pub fn view(&self) -> ViewBox {
        self.view
    }

    /// Replaces the view limits.
    ///
    /// During an animation a changed view invalidates the snapshot, which
    /// is rebuilt on the next step.
    pub fn set_view(&mut self, view: ViewBox) {
        if view == self.view {
            return;
        }
        self.view = view;
        if let RenderState::Animating { stale, .. } = &mut self.state {
            *stale = true;
        }
    }

    /// Replaces the horizontal limits.
    pub fn set_xlim(&mut self, lo: f64, hi: f64) {
        self.set_view(ViewBox {
            x: (lo, hi),
            ..self.view
        });
    }

    /// Replaces the vertical limits.
    pub fn set_ylim(&mut self, lo: f64, hi: f64) {
        self.set_view(ViewBox {
            y: (lo, hi),
            ..self.view
        });
    }

    /// Framebuffer size in pixels (width, height).
    #[must_use]
    pub fn pixel_size(&self) -> (u32, u32) {
        self.framebuffer.dimensions()
    }

    /// True if a data point lies inside the view.
    #[must_use]
    pub fn contains(&self, point: DataPoint) -> bool {
        self.view.contains(point)
    }

    /// Maps a data point to framebuffer coordinates.
    #[must_use]
    pub fn to_pixel(&self, point: DataPoint) -> (f64, f64) {
        self.view.to_pixel(point, self.pixel_size())
    }

    /// Maps framebuffer coordinates to a data point.
    #[must_use]
    pub fn to_data(&self, px: f64, py: f64) -> DataPoint {
        self.view.to_data((px, py), self.pixel_size())
    }

    /// Pixels last presented to the display.
    #[must_use]
    pub fn display(&self) -> &RgbaImage {
        &self.display
    }

    /// Rendering counters.
    #[must_use]
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// True while an animated session holds a snapshot.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        matches!(self.state, RenderState::Animating { .. })
    }

    /// Adds an actor and returns its handle.
    pub fn add_actor(&mut self, geometry: Geometry, color: Color) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        self.actors.push(Actor::new(id, geometry, color));
        self.stats.actors_added += 1;
        id
    }

    /// Removes an actor.
    ///
    /// # Errors
    /// Returns [`Error::UnknownActor`] if the surface does not own `id`.
    pub fn remove_actor(&mut self, id: ActorId) -> Result<Actor> {
        let index = self.index_of(id)?;
        self.stats.actors_removed += 1;
        Ok(self.actors.remove(index))
    }

    /// Removes every actor.
    pub fn clear_actors(&mut self) {
        self.stats.actors_removed += u64::try_from(self.actors.len()).unwrap_or(u64::MAX);
        self.actors.clear();
    }

    /// All actors in paint order.
    #[must_use]
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// Looks up an actor.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id() == id)
    }

    fn index_of(&self, id: ActorId) -> Result<usize> {
        self.actors
            .iter()
            .position(|a| a.id() == id)
            .ok_or(Error::UnknownActor(id))
    }

    fn actor_mut(&mut self, id: ActorId) -> Result<&mut Actor> {
        let index = self.index_of(id)?;
        Ok(&mut self.actors[index])
    }

    /// Replaces an actor's geometry.
    ///
    /// # Errors
    /// Returns [`Error::UnknownActor`] for a foreign handle and
    /// [`Error::KindMismatch`] if the new geometry is of another kind.
    pub fn set_geometry(&mut self, id: ActorId, geometry: Geometry) -> Result<()> {
        let actor = self.actor_mut(id)?;
        if actor.kind() != geometry.kind() {
            return Err(Error::KindMismatch {
                id,
                expected: actor.kind(),
                found: geometry.kind(),
            });
        }
        *actor.geometry_mut() = geometry;
        Ok(())
    }

    /// Shows or hides an actor.
    ///
    /// # Errors
    /// Returns [`Error::UnknownActor`] for a foreign handle.
    pub fn set_visible(&mut self, id: ActorId, visible: bool) -> Result<()> {
        self.actor_mut(id)?.visible = visible;
        Ok(())
    }

    /// Toggles the selection emphasis of an actor.
    ///
    /// # Errors
    /// Returns [`Error::UnknownActor`] for a foreign handle.
    pub fn set_emphasized(&mut self, id: ActorId, emphasized: bool) -> Result<()> {
        self.actor_mut(id)?.emphasized = emphasized;
        Ok(())
    }

    /// Repaints the background and every visible, non-animated actor, then
    /// copies the framebuffer to the display.
    pub fn redraw(&mut self) {
        match &self.background {
            Some(background) if background.dimensions() == self.framebuffer.dimensions() => {
                self.framebuffer.copy_from_slice(background.as_raw());
            }
            _ => {
                for pixel in self.framebuffer.pixels_mut() {
                    pixel.0 = BLANK;
                }
            }
        }
        let size = self.pixel_size();
        for actor in self.actors.iter().filter(|a| !a.animated) {
            paint(&mut self.framebuffer, actor, &self.view, self.style, size);
        }
        self.display.clone_from(&self.framebuffer);
        self.stats.full_redraws += 1;
    }

    /// Starts an animated session for the given actors.
    ///
    /// # Errors
    /// Returns [`Error::AlreadyAnimating`] if a session is running and
    /// [`Error::UnknownActor`] for a foreign handle; the surface is left
    /// unchanged in both cases.
    pub fn begin_animated(&mut self, ids: &[ActorId]) -> Result<()> {
        if self.is_animating() {
            warn!("{}: refused to start a second animation", self.name);
            return Err(Error::AlreadyAnimating(self.name.clone()));
        }
        for &id in ids {
            self.index_of(id)?;
        }
        for actor in &mut self.actors {
            actor.animated = ids.contains(&actor.id());
        }
        self.redraw();
        self.state = RenderState::Animating {
            snapshot: self.framebuffer.clone(),
            presented: None,
            stale: false,
        };
        debug!("{}: animating {} actors", self.name, ids.len());
        self.step_animated(ids)
    }

    /// Restores the snapshot, paints the given actors and presents only
    /// the region they cover now or covered on the previous step.
    ///
    /// # Errors
    /// Returns [`Error::NotAnimating`] if no session is running.
    pub fn step_animated(&mut self, ids: &[ActorId]) -> Result<()> {
        if matches!(self.state, RenderState::Animating { stale: true, .. }) {
            self.redraw();
            let (width, height) = self.framebuffer.dimensions();
            self.state = RenderState::Animating {
                snapshot: self.framebuffer.clone(),
                presented: Some(PixelRegion::full(width, height)),
                stale: false,
            };
            debug!("{}: snapshot rebuilt after view change", self.name);
        }
        let RenderState::Animating {
            snapshot,
            presented,
            ..
        } = &mut self.state
        else {
            return Err(Error::NotAnimating(self.name.clone()));
        };
        self.framebuffer.copy_from_slice(snapshot.as_raw());

        let size = self.framebuffer.dimensions();
        let mut touched = None;
        for actor in self.actors.iter().filter(|a| ids.contains(&a.id())) {
            let region = paint(&mut self.framebuffer, actor, &self.view, self.style, size);
            touched = draw::merge(touched, region);
        }

        if let Some(region) = draw::merge(touched, *presented) {
            let patch = imageops::crop_imm(
                &self.framebuffer,
                region.x0,
                region.y0,
                region.width(),
                region.height(),
            )
            .to_image();
            imageops::replace(
                &mut self.display,
                &patch,
                i64::from(region.x0),
                i64::from(region.y0),
            );
            trace!(
                "{}: presented {}x{} at ({}, {})",
                self.name,
                region.width(),
                region.height(),
                region.x0,
                region.y0
            );
        }
        *presented = touched;
        self.stats.partial_presents += 1;
        Ok(())
    }

    /// Clears the animation flags, drops the snapshot and redraws.
    pub fn end_animated(&mut self, ids: &[ActorId]) {
        for actor in self.actors.iter_mut().filter(|a| ids.contains(&a.id())) {
            actor.animated = false;
        }
        if matches!(self.state, RenderState::Idle) {
            debug!("{}: end requested with no animation running", self.name);
        }
        self.state = RenderState::Idle;
        self.redraw();
    }

    /// Writes the display buffer as a PNG file.
    ///
    /// # Errors
    /// Returns the encoder or I/O error.
    pub fn save_png(&self, path: &Path) -> ImageResult<()> {
        self.display.save_with_format(path, image::ImageFormat::Png)
    }
}

fn paint(
    img: &mut RgbaImage,
    actor: &Actor,
    view: &ViewBox,
    style: SurfaceStyle,
    size: (u32, u32),
) -> Option<PixelRegion> {
    if !actor.visible {
        return None;
    }
    let rgba = actor.color().to_rgba();
    match actor.geometry() {
        Geometry::Marker { x, y } => {
            let (px, py) = view.to_pixel(DataPoint::new(*x, *y), size);
            draw::marker(img, px, py, style.marker_radius, rgba)
        }
        Geometry::Line { x } => {
            let (px, _) = view.to_pixel(DataPoint::new(*x, view.y.0), size);
            draw::vline(img, px, style.line_width, rgba)
        }
        Geometry::Rect(rect) => {
            let (min, max) = rect.corners();
            let width = style.line_width + u32::from(actor.emphasized);
            draw::rect_outline(
                img,
                view.to_pixel(min, size),
                view.to_pixel(max, size),
                width,
                actor.emphasized,
                rgba,
            )
        }
        Geometry::Curve { points } => {
            let mapped: Vec<(f64, f64)> = points
                .iter()
                .map(|[x, y]| view.to_pixel(DataPoint::new(*x, *y), size))
                .collect();
            draw::polyline(img, &mapped, style.line_width, rgba)
        }
        Geometry::Image {
            data,
            clim,
            colormap,
        } => draw::stretch(img, data.view(), *clim, *colormap),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const RED: Color = Color::rgb(255, 0, 0);

    fn canvas() -> Surface {
        let view = ViewBox {
            x: (0.0, 20.0),
            y: (0.0, 20.0),
            y_down: true,
        };
        Surface::fixed("test", 20, 20, view, SurfaceStyle::default())
    }

    #[test]
    fn test_view_round_trip() {
        let view = ViewBox::new((0.0, 10.0), (-1.0, 1.0));
        let px = view.to_pixel(DataPoint::new(5.0, 1.0), (100, 50));
        assert_eq!(px, (50.0, 0.0));
        let back = view.to_data(px, (100, 50));
        assert_abs_diff_eq!(back.x, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(back.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scaled_surface_tracks_raster() {
        let raster = Raster::filled(4, 6, 1, 2.0).unwrap();
        let mut surface = Surface::scaled(
            "in",
            raster,
            3,
            Colormap::Grayscale,
            SurfaceStyle::default(),
        );
        assert_eq!(surface.pixel_size(), (18, 12));
        assert!(surface.contains(DataPoint::new(-0.5, 3.5)));
        assert!(!surface.contains(DataPoint::new(6.0, 1.0)));

        surface.bind(Raster::filled(2, 2, 1, 0.0).unwrap());
        assert_eq!(surface.pixel_size(), (6, 6));
        assert_eq!(surface.view(), ViewBox::image(2, 2));
    }

    #[test]
    fn test_set_geometry_rejects_kind_change() {
        let mut surface = canvas();
        let id = surface.add_actor(Geometry::Line { x: 1.0 }, RED);
        let err = surface
            .set_geometry(id, Geometry::Marker { x: 1.0, y: 1.0 })
            .unwrap_err();
        assert!(matches!(err, Error::KindMismatch { .. }));
        surface.set_geometry(id, Geometry::Line { x: 4.0 }).unwrap();
        assert_eq!(surface.actor(id).unwrap().geometry(), &Geometry::Line { x: 4.0 });
    }

    #[test]
    fn test_animation_state_machine() {
        let mut surface = canvas();
        let id = surface.add_actor(Geometry::Marker { x: 5.0, y: 5.0 }, RED);
        assert_eq!(
            surface.step_animated(&[id]),
            Err(Error::NotAnimating("test".to_string()))
        );
        surface.begin_animated(&[id]).unwrap();
        assert!(surface.is_animating());
        assert!(surface.actor(id).unwrap().is_animated());
        assert_eq!(
            surface.begin_animated(&[id]),
            Err(Error::AlreadyAnimating("test".to_string()))
        );
        surface.end_animated(&[id]);
        assert!(!surface.is_animating());
        assert!(!surface.actor(id).unwrap().is_animated());
    }

    #[test]
    fn test_step_leaves_no_trail() {
        let mut surface = canvas();
        let id = surface.add_actor(Geometry::Marker { x: 5.0, y: 5.0 }, RED);
        surface.begin_animated(&[id]).unwrap();
        assert_eq!(surface.display().get_pixel(5, 5).0, RED.to_rgba());

        surface
            .set_geometry(id, Geometry::Marker { x: 15.0, y: 15.0 })
            .unwrap();
        let redraws = surface.stats().full_redraws;
        surface.step_animated(&[id]).unwrap();
        assert_eq!(surface.stats().full_redraws, redraws);
        assert_eq!(surface.display().get_pixel(5, 5).0, BLANK);
        assert_eq!(surface.display().get_pixel(15, 15).0, RED.to_rgba());
    }

    #[test]
    fn test_view_change_rebuilds_snapshot() {
        let mut surface = canvas();
        let still = surface.add_actor(Geometry::Marker { x: 5.0, y: 5.0 }, RED);
        let moving = surface.add_actor(Geometry::Marker { x: 15.0, y: 15.0 }, RED);
        surface.begin_animated(&[moving]).unwrap();
        let redraws = surface.stats().full_redraws;

        surface.set_xlim(0.0, 40.0);
        surface.step_animated(&[moving]).unwrap();
        assert_eq!(surface.stats().full_redraws, redraws + 1);
        assert_eq!(surface.display().get_pixel(2, 5).0, RED.to_rgba());
        assert_eq!(surface.display().get_pixel(8, 5).0, BLANK);
        assert!(surface.actor(still).is_some());
    }

    #[test]
    fn test_begin_refuses_unknown_actor() {
        let mut surface = canvas();
        let id = surface.add_actor(Geometry::Line { x: 2.0 }, RED);
        surface.remove_actor(id).unwrap();
        assert_eq!(surface.begin_animated(&[id]), Err(Error::UnknownActor(id)));
        assert!(!surface.is_animating());
    }

    #[test]
    fn test_hidden_actor_not_painted() {
        let mut surface = canvas();
        let id = surface.add_actor(Geometry::Marker { x: 5.0, y: 5.0 }, RED);
        surface.set_visible(id, false).unwrap();
        surface.redraw();
        assert_eq!(surface.display().get_pixel(5, 5).0, BLANK);
    }
}
