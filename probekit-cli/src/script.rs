//! Pointer and text event scripts.
//!
//! A script is a JSON object with a list of steps:
//!
//! ```json
//! {"steps": [
//!   {"op": "press", "x": 10, "y": 10, "button": "primary"},
//!   {"op": "motion", "x": 30, "y": 25, "button": "primary"},
//!   {"op": "release", "x": 30, "y": 25, "button": "primary"},
//!   {"op": "text", "field": "bounds", "text": "x0=5 y0=5 x1=20 y1=20"},
//!   {"op": "switch", "mode": "mean_sign"},
//!   {"op": "rotate"}
//! ]}
//! ```
//!
//! Pointer coordinates are in raster data coordinates of the target
//! surface.

use std::fs;
use std::io::Write;
use std::path::Path;

use log::{debug, warn};
use probekit_viewer::{
    Button, ModeKind, PointerAction, PointerEvent, ProbeModes, Target, TextField,
};
use serde::Deserialize;

use crate::Result;

/// Button named in a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptButton {
    Primary,
    Middle,
    Secondary,
}

impl From<ScriptButton> for Button {
    fn from(button: ScriptButton) -> Self {
        match button {
            ScriptButton::Primary => Self::Primary,
            ScriptButton::Middle => Self::Middle,
            ScriptButton::Secondary => Self::Secondary,
        }
    }
}

/// One scripted event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Press {
        x: f64,
        y: f64,
        button: ScriptButton,
        #[serde(default)]
        target: Target,
    },
    Motion {
        x: f64,
        y: f64,
        #[serde(default)]
        button: Option<ScriptButton>,
        #[serde(default)]
        target: Target,
    },
    Release {
        x: f64,
        y: f64,
        button: ScriptButton,
        #[serde(default)]
        target: Target,
    },
    Leave {
        #[serde(default)]
        target: Target,
    },
    Text {
        field: TextField,
        text: String,
    },
    Switch {
        mode: ModeKind,
    },
    /// Quarter turn of the channel and cube.
    Rotate,
}

impl Step {
    fn pointer(&self) -> Option<(Target, PointerAction)> {
        let event = |x: f64, y: f64, button: Option<ScriptButton>| PointerEvent {
            x,
            y,
            button: button.map(Button::from),
        };
        Some(match *self {
            Self::Press {
                x,
                y,
                button,
                target,
            } => (target, PointerAction::Press(event(x, y, Some(button)))),
            Self::Motion {
                x,
                y,
                button,
                target,
            } => (target, PointerAction::Motion(event(x, y, button))),
            Self::Release {
                x,
                y,
                button,
                target,
            } => (target, PointerAction::Release(event(x, y, Some(button)))),
            Self::Leave { target } => (target, PointerAction::Leave),
            Self::Text { .. } | Self::Switch { .. } | Self::Rotate => return None,
        })
    }
}

/// A list of steps replayed in order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    /// Reads a script from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Counts of what happened during a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub steps: usize,
    pub rejected: usize,
}

/// Replays every step against `modes`, reporting text edits to `out`.
///
/// Steps the probes reject are logged and counted; replay continues with
/// the next step.
pub fn replay(modes: &mut ProbeModes, script: &Script, out: &mut impl Write) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();
    for (index, step) in script.steps.iter().enumerate() {
        summary.steps += 1;
        let outcome = match step {
            Step::Text { field, text } => match modes.apply_text(*field, text) {
                Ok(edit) => {
                    writeln!(out, "step {index}: {field:?} text {edit:?}")?;
                    Ok(())
                }
                Err(err) => Err(err),
            },
            Step::Switch { mode } => modes.switch(*mode).map(|switched| {
                debug!("step {index}: switch to {mode} ({switched})");
            }),
            Step::Rotate => modes.rotate(),
            pointer => match pointer.pointer() {
                Some((target, action)) => modes.handle(target, action),
                None => Ok(()),
            },
        };
        if let Err(err) = outcome {
            warn!("step {index} rejected: {err}");
            writeln!(out, "step {index}: rejected: {err}")?;
            summary.rejected += 1;
        }
    }
    Ok(summary)
}
