//! Probes bound to raster-derived data shown on linked surfaces.

mod hover;
mod lumen;
mod mean_sign;
mod roi;
mod slice;

pub use hover::HoverSlice;
pub use lumen::Lumen;
pub use mean_sign::MeanSign;
pub use roi::{CropImage, Roi};
pub use slice::Slice;

/// Outcome of applying an edited text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEdit {
    /// The parsed value replaced the probe state.
    Applied,
    /// The parsed value matched the current state; nothing was redrawn.
    Unchanged,
    /// Empty text removed the selected region.
    Removed,
}
