//! probekit-core: Core types for interactive raster probing.
//!
//! This crate provides the read-only raster accessor, probe geometry
//! (signed rectangles and their normalized bounds), the probe color cycle,
//! the plain-text round-trip formats and the interface of the expression
//! collaborator that derives a scalar channel from a spectral cube.
//!

pub mod color;
pub mod convert;
pub mod derive;
pub mod error;
pub mod geometry;
pub mod raster;
pub mod text;

pub use color::{Color, ColorCycle, PALETTE};
pub use derive::{BandSelect, ChannelExpression, Derived, NormalizedDifference, Threshold};
pub use error::{Error, Result};
pub use geometry::{round_coord, Bounds, DataPoint, Pixel, Rect};
pub use raster::Raster;
