//! Geometric probes: points, vertical lines and rectangles.
//!
//! Each probe owns the surface it is drawn on and implements
//! [`Probe`](crate::session::Probe) on its own, so it can be driven
//! directly or embedded in a composite that adds linked views.

mod line;
mod point;
mod window;

pub use line::{LineMarker, LineProbe};
pub use point::{PointMarker, PointProbe};
pub use window::{RegionId, WindowProbe, WindowRegion};

use probekit_core::convert::clamp_index;
use probekit_core::round_coord;

use crate::surface::Surface;

/// Width and height of the raster bound to a surface, zero if unbound.
pub(crate) fn raster_extent(surface: &Surface) -> (usize, usize) {
    surface
        .raster()
        .map_or((0, 0), |raster| (raster.width(), raster.height()))
}

/// Rounds a horizontal coordinate to a column inside `[0, width)`.
pub(crate) fn round_column(x: f64, width: usize) -> usize {
    clamp_index(round_coord(x), width)
}
