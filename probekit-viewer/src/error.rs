//! Error types for probekit-viewer.

use thiserror::Error;

use crate::actor::{ActorId, ActorKind};
use crate::mode::{ModeKind, TextField};

/// Result type for viewer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Viewer error types.
///
/// None of these are fatal; callers keep the previously visible state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// An animated session is already running on the surface.
    #[error("surface {0:?} is already animating")]
    AlreadyAnimating(String),

    /// A step was requested with no snapshot to restore.
    #[error("surface {0:?} has no animation snapshot")]
    NotAnimating(String),

    /// The actor does not belong to the surface.
    #[error("unknown actor {0:?}")]
    UnknownActor(ActorId),

    /// Geometry update would change the kind of an actor.
    #[error("actor {id:?} is a {expected:?}, not a {found:?}")]
    KindMismatch {
        id: ActorId,
        expected: ActorKind,
        found: ActorKind,
    },

    /// A region-scoped edit arrived with no region selected.
    #[error("no region is selected")]
    NoRegion,

    /// The active mode has no such text field, or no mode is active.
    #[error("no {field:?} text field in mode {mode:?}")]
    NoTextField {
        mode: Option<ModeKind>,
        field: TextField,
    },

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] probekit_core::Error),
}
