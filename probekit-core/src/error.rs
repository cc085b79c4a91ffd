//! Error types for probekit-core.

use thiserror::Error;

/// Result type alias for probekit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for probekit operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed text in a round-trip field.
    #[error("cannot parse {input:?}: {reason}")]
    InputParse { input: String, reason: String },

    /// A crop or statistic was requested over an empty box.
    #[error("degenerate region: x0={x0} y0={y0} x1={x1} y1={y1}")]
    DegenerateGeometry {
        x0: usize,
        y0: usize,
        x1: usize,
        y1: usize,
    },

    /// Band index past the cube depth.
    #[error("band {band} out of range (depth {depth})")]
    BandOutOfRange { band: usize, depth: usize },

    /// Two arrays that must agree in shape do not.
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Raster with a zero-length axis.
    #[error("raster has no samples")]
    EmptyRaster,
}

impl Error {
    /// Builds an [`Error::InputParse`] from the offending text.
    pub fn parse(input: &str, reason: impl Into<String>) -> Self {
        Self::InputParse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
