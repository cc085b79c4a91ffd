//! probekit-viewer: Interactive probes over a raster with linked views.
//!
//! This crate provides:
//! - **Surfaces** - framebuffer render targets with actors and animated
//!   partial redraw
//! - **Sessions** - the press/drag/release protocol shared by all probes
//! - **Probes** - points, vertical lines and rectangles
//! - **Composites** - probes tied to spectra, profiles, sub-images and
//!   band ratio matrices
//! - **Modes** - switching between the three top-level probes, with text
//!   round-trip and export
//!
//! Everything is single-threaded; surfaces, actors and probes are owned
//! by the probe that draws them.

pub mod actor;
pub mod colormap;
pub mod composite;
pub mod config;
mod draw;
pub mod error;
pub mod export;
pub mod flex_lumen;
pub mod lim_slice;
pub mod mode;
pub mod probe;
pub mod session;
pub mod storage;
pub mod surface;

pub use actor::{Actor, ActorId, ActorKind, ActorRef, Geometry, Pane};
pub use colormap::Colormap;
pub use composite::{CropImage, HoverSlice, Lumen, MeanSign, Roi, Slice, TextEdit};
pub use config::ViewerConfig;
pub use error::{Error, Result};
pub use export::{ExportReport, LineProfileRecord, MeanSignRecord, PointSpectrumRecord, RegionRecord};
pub use flex_lumen::FlexLumen;
pub use lim_slice::LimSlice;
pub use mode::{ModeKind, ModeTexts, ProbeModes, Sources, Target, TextField};
pub use probe::{LineMarker, LineProbe, PointMarker, PointProbe, RegionId, WindowProbe, WindowRegion};
pub use session::{Button, Interactive, PointerAction, PointerEvent, Probe, ProbeSession};
pub use storage::KeyedLineContainer;
pub use surface::{RenderStats, Surface, SurfaceStyle, ViewBox};
