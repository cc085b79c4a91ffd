use log::trace;
use ndarray::Array2;
use probekit_algorithms::plane_range;
use probekit_core::{Bounds, Color, Raster};

use crate::actor::{ActorId, ActorRef, Geometry, Pane};
use crate::colormap::Colormap;
use crate::error::Result;
use crate::probe::WindowProbe;
use crate::session::{PointerEvent, Probe};
use crate::surface::{Surface, ViewBox};

/// Sub-image of the scalar channel under a rectangle.
///
/// The color limits stay at the source channel's range so crops of the
/// same data compare directly. The target surface is bound to the crop,
/// which makes it the data source for probes drawn on top of it.
#[derive(Debug, Clone)]
pub struct CropImage {
    actor: ActorId,
    extent: (usize, usize),
    clim: (f64, f64),
    colormap: Colormap,
}

impl CropImage {
    /// Shows the whole `source` channel on `target`.
    pub fn new(target: &mut Surface, source: &Raster, colormap: Colormap) -> Self {
        let clim = plane_range(source.plane()).unwrap_or((0.0, 1.0));
        let actor = target.add_actor(
            Geometry::Image {
                data: source.plane().to_owned(),
                clim,
                colormap,
            },
            Color::rgb(0, 0, 0),
        );
        let mut image = Self {
            actor,
            extent: (0, 0),
            clim,
            colormap,
        };
        image.show(target, source.clone());
        image
    }

    pub(crate) fn placeholder(target: &mut Surface, colormap: Colormap) -> Self {
        let clim = (0.0, 1.0);
        let actor = target.add_actor(
            Geometry::Image {
                data: Array2::zeros((1, 1)),
                clim,
                colormap,
            },
            Color::rgb(0, 0, 0),
        );
        Self {
            actor,
            extent: (0, 0),
            clim,
            colormap,
        }
    }

    /// Image actor on the target surface.
    #[must_use]
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Width and height of the shown crop.
    #[must_use]
    pub fn extent(&self) -> (usize, usize) {
        self.extent
    }

    fn show(&mut self, target: &mut Surface, crop: Raster) {
        let extent = (crop.width(), crop.height());
        if extent != self.extent {
            target.set_view(ViewBox::image(extent.0, extent.1));
            self.extent = extent;
        }
        target.bind(crop);
    }

    /// Shows the crop of `source` under `bounds`.
    ///
    /// Returns false and leaves the image untouched when the crop would be
    /// empty.
    ///
    /// # Errors
    /// Returns an error if the image actor is gone from `target`.
    pub fn refresh(&mut self, target: &mut Surface, source: &Raster, bounds: Bounds) -> Result<bool> {
        let Ok(crop) = source.crop(bounds) else {
            trace!("skipping empty crop {bounds:?}");
            return Ok(false);
        };
        target.set_geometry(
            self.actor,
            Geometry::Image {
                data: crop.plane().to_owned(),
                clim: self.clim,
                colormap: self.colormap,
            },
        )?;
        self.show(target, crop);
        Ok(true)
    }

    /// Takes color limits from a new source channel.
    pub fn set_source(&mut self, source: &Raster) {
        self.clim = plane_range(source.plane()).unwrap_or((0.0, 1.0));
    }
}

/// Rectangle probe with the sub-image under the selected rectangle.
#[derive(Debug)]
pub struct Roi {
    window: WindowProbe,
    crop: Surface,
    image: CropImage,
}

impl Roi {
    /// Creates the probe. The crop surface initially shows the whole
    /// channel bound to `window`.
    #[must_use]
    pub fn new(window: Surface, mut crop: Surface, colormap: Colormap) -> Self {
        let image = match window.raster() {
            Some(source) => CropImage::new(&mut crop, source, colormap),
            None => CropImage::placeholder(&mut crop, colormap),
        };
        Self {
            window: WindowProbe::new(window),
            crop,
            image,
        }
    }

    /// The rectangle probe.
    #[must_use]
    pub fn window(&self) -> &WindowProbe {
        &self.window
    }

    /// Mutable rectangle probe.
    pub fn window_mut(&mut self) -> &mut WindowProbe {
        &mut self.window
    }

    /// The crop surface.
    #[must_use]
    pub fn crop(&self) -> &Surface {
        &self.crop
    }

    /// The crop image state.
    #[must_use]
    pub fn image(&self) -> &CropImage {
        &self.image
    }

    /// Crop of the channel under the selected rectangle, if any.
    #[must_use]
    pub fn roi(&self) -> Option<Raster> {
        let bounds = self.window.points()?;
        self.window.surface().raster()?.crop(bounds).ok()
    }

    /// Refreshes the sub-image from the selected rectangle.
    ///
    /// # Errors
    /// Returns an error if the image actor is gone.
    pub fn refresh(&mut self) -> Result<bool> {
        let (Some(bounds), Some(source)) = (self.window.points(), self.window.surface().raster())
        else {
            return Ok(false);
        };
        self.image.refresh(&mut self.crop, source, bounds)
    }
}

impl Probe for Roi {
    fn pane(&self, pane: Pane) -> Option<&Surface> {
        match pane {
            Pane::Input => Some(self.window.surface()),
            Pane::Output => Some(&self.crop),
            Pane::Detail => None,
        }
    }

    fn pane_mut(&mut self, pane: Pane) -> Option<&mut Surface> {
        match pane {
            Pane::Input => Some(self.window.surface_mut()),
            Pane::Output => Some(&mut self.crop),
            Pane::Detail => None,
        }
    }

    fn actors(&self) -> Vec<ActorRef> {
        let mut actors = self.window.actors();
        actors.push(ActorRef::new(Pane::Output, self.image.actor));
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
        self.refresh().map(|_| ())
    }

    fn on_primary_drag(&mut self, event: &PointerEvent) -> Result<()> {
        self.window.resize_selected(event.point())
    }

    fn on_secondary_drag(&mut self, event: &PointerEvent) -> Result<()> {
        self.window.translate_selected(event.point())
    }

    fn after_drag(&mut self, _event: &PointerEvent) -> Result<()> {
        self.refresh().map(|_| ())
    }

    fn on_release(&mut self, _event: &PointerEvent) -> Result<()> {
        self.refresh().map(|_| ())
    }
}
