//! Drawable overlay primitives.

use ndarray::Array2;
use probekit_core::{Color, Rect};
use serde::Serialize;

use crate::colormap::Colormap;

/// Handle of an actor within its surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ActorId(pub(crate) u64);

/// The kind of primitive an actor draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorKind {
    /// Point marker.
    Marker,
    /// Full-height vertical line.
    Line,
    /// Rectangle outline.
    Rect,
    /// Polyline through data points.
    Curve,
    /// Scalar image filling the surface view.
    Image,
}

/// Geometry of an actor in its surface's data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Marker centered on a point.
    Marker { x: f64, y: f64 },
    /// Vertical line at a column.
    Line { x: f64 },
    /// Rectangle with signed extent.
    Rect(Rect),
    /// Polyline.
    Curve { points: Vec<[f64; 2]> },
    /// Scalar image stretched over the whole view.
    Image {
        data: Array2<f64>,
        clim: (f64, f64),
        colormap: Colormap,
    },
}

impl Geometry {
    /// Kind of primitive.
    #[must_use]
    pub fn kind(&self) -> ActorKind {
        match self {
            Geometry::Marker { .. } => ActorKind::Marker,
            Geometry::Line { .. } => ActorKind::Line,
            Geometry::Rect(_) => ActorKind::Rect,
            Geometry::Curve { .. } => ActorKind::Curve,
            Geometry::Image { .. } => ActorKind::Image,
        }
    }
}

/// One drawable element owned by a surface.
///
/// The color is fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    id: ActorId,
    geometry: Geometry,
    color: Color,
    pub(crate) visible: bool,
    pub(crate) animated: bool,
    pub(crate) emphasized: bool,
}

impl Actor {
    pub(crate) fn new(id: ActorId, geometry: Geometry, color: Color) -> Self {
        Self {
            id,
            geometry,
            color,
            visible: true,
            animated: false,
            emphasized: false,
        }
    }

    /// Handle of this actor.
    #[must_use]
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Kind of primitive.
    #[must_use]
    pub fn kind(&self) -> ActorKind {
        self.geometry.kind()
    }

    /// Current geometry.
    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub(crate) fn geometry_mut(&mut self) -> &mut Geometry {
        &mut self.geometry
    }

    /// Color assigned at creation.
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Whether the actor is drawn at all.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the actor is excluded from full redraws and drawn only by
    /// animation steps.
    #[must_use]
    pub fn is_animated(&self) -> bool {
        self.animated
    }

    /// Whether the actor is drawn with a selection emphasis.
    #[must_use]
    pub fn is_emphasized(&self) -> bool {
        self.emphasized
    }
}

/// Which of a probe's surfaces an actor lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pane {
    /// The surface bound to the probed raster; receives pointer events.
    Input,
    /// First linked view.
    Output,
    /// Second linked view.
    Detail,
}

/// An actor on one of a probe's surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorRef {
    /// Surface holding the actor.
    pub pane: Pane,
    /// Handle on that surface.
    pub id: ActorId,
}

impl ActorRef {
    /// Creates a reference.
    #[must_use]
    pub fn new(pane: Pane, id: ActorId) -> Self {
        Self { pane, id }
    }
}

/// Groups actor references by pane, keeping first-seen pane order.
#[must_use]
pub fn group_by_pane(actors: &[ActorRef]) -> Vec<(Pane, Vec<ActorId>)> {
    let mut groups: Vec<(Pane, Vec<ActorId>)> = Vec::new();
    for actor in actors {
        match groups.iter_mut().find(|(pane, _)| *pane == actor.pane) {
            Some((_, ids)) => ids.push(actor.id),
            None => groups.push((actor.pane, vec![actor.id])),
        }
    }
    groups
}
