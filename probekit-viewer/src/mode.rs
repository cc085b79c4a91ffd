//! Switching between the three top-level probes.
//!
//! [`ProbeModes`] owns the data sources and exactly one active probe with
//! its surfaces and sessions. Switching drops the previous probe after
//! ending any running animation, so nothing it drew survives into the
//! next mode.

use std::fmt;
use std::rc::Rc;

use log::{debug, info, trace};
use ndarray::Array2;
use probekit_algorithms::SpectralConfig;
use probekit_core::convert::usize_to_f64;
use probekit_core::Raster;
use serde::{Deserialize, Serialize};

use crate::actor::Pane;
use crate::composite::{MeanSign, TextEdit};
use crate::config::ViewerConfig;
use crate::error::{Error, Result};
use crate::export::{flex_lumen_report, lim_slice_report, mean_sign_report, ExportReport};
use crate::flex_lumen::FlexLumen;
use crate::lim_slice::LimSlice;
use crate::session::{PointerAction, Probe, ProbeSession};
use crate::surface::{Surface, ViewBox};

/// Top-level probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    /// Rectangles with per-rectangle column profiles.
    LimSlice,
    /// Point spectra with editable point text.
    FlexLumen,
    /// Rectangle mean spectrum and band ratio matrix.
    MeanSign,
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LimSlice => "lim_slice",
            Self::FlexLumen => "flex_lumen",
            Self::MeanSign => "mean_sign",
        })
    }
}

/// Surface receiving pointer events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// The channel surface.
    #[default]
    Main,
    /// The crop surface of [`ModeKind::LimSlice`].
    Secondary,
}

/// Editable text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    /// Selected rectangle bounds.
    Bounds,
    /// Line positions of the selected rectangle.
    Lines,
    /// Point list.
    Points,
}

/// Current text of every field the active mode shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModeTexts {
    /// Selected rectangle as `x0=.. y0=.. x1=.. y1=..`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<String>,
    /// Stored lines of the selected rectangle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<String>,
    /// Points as `(x, y)` pairs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<String>,
}

/// Scalar channel, spectral cube and optional pixel mask.
#[derive(Debug, Clone)]
pub struct Sources {
    /// Scalar field shown on the input surface.
    pub channel: Raster,
    /// Band-indexed cube the spectra are read from.
    pub cube: Raster,
    /// Pixels to keep; excluded pixels read as zero.
    pub mask: Option<Array2<bool>>,
}

#[derive(Debug)]
enum ActiveMode {
    LimSlice {
        probe: LimSlice,
        main: ProbeSession,
        secondary: ProbeSession,
    },
    FlexLumen {
        probe: FlexLumen,
        session: ProbeSession,
    },
    MeanSign {
        probe: MeanSign,
        session: ProbeSession,
    },
}

impl ActiveMode {
    fn kind(&self) -> ModeKind {
        match self {
            Self::LimSlice { .. } => ModeKind::LimSlice,
            Self::FlexLumen { .. } => ModeKind::FlexLumen,
            Self::MeanSign { .. } => ModeKind::MeanSign,
        }
    }

    fn probe(&self) -> &dyn Probe {
        match self {
            Self::LimSlice { probe, .. } => probe,
            Self::FlexLumen { probe, .. } => probe,
            Self::MeanSign { probe, .. } => probe,
        }
    }

    fn reset(&mut self) {
        match self {
            Self::LimSlice {
                probe,
                main,
                secondary,
            } => {
                secondary.reset(probe.container_mut());
                main.reset(probe);
            }
            Self::FlexLumen { probe, session } => session.reset(probe),
            Self::MeanSign { probe, session } => session.reset(probe),
        }
    }
}

/// Holder of the active top-level probe.
#[derive(Debug)]
pub struct ProbeModes {
    config: ViewerConfig,
    spectral: SpectralConfig,
    channel: Raster,
    cube: Rc<Raster>,
    masked: Rc<Raster>,
    active: Option<ActiveMode>,
}

impl ProbeModes {
    /// Creates the switcher with no active mode.
    ///
    /// # Errors
    /// Returns an error if the mask does not match the raster shapes.
    pub fn new(config: ViewerConfig, spectral: SpectralConfig, sources: Sources) -> Result<Self> {
        let (channel, cube, masked) = prepare(sources)?;
        Ok(Self {
            config,
            spectral,
            channel,
            cube,
            masked,
            active: None,
        })
    }

    /// Kind of the active mode.
    #[must_use]
    pub fn kind(&self) -> Option<ModeKind> {
        self.active.as_ref().map(ActiveMode::kind)
    }

    /// The displayed scalar channel, with masked pixels zeroed.
    #[must_use]
    pub fn channel(&self) -> &Raster {
        &self.channel
    }

    /// The spectral cube with masked pixels zeroed.
    #[must_use]
    pub fn masked_cube(&self) -> &Raster {
        &self.masked
    }

    /// Active [`LimSlice`], if that is the mode.
    #[must_use]
    pub fn lim_slice(&self) -> Option<&LimSlice> {
        match &self.active {
            Some(ActiveMode::LimSlice { probe, .. }) => Some(probe),
            _ => None,
        }
    }

    /// Active [`FlexLumen`], if that is the mode.
    #[must_use]
    pub fn flex_lumen(&self) -> Option<&FlexLumen> {
        match &self.active {
            Some(ActiveMode::FlexLumen { probe, .. }) => Some(probe),
            _ => None,
        }
    }

    /// Active [`MeanSign`], if that is the mode.
    #[must_use]
    pub fn mean_sign(&self) -> Option<&MeanSign> {
        match &self.active {
            Some(ActiveMode::MeanSign { probe, .. }) => Some(probe),
            _ => None,
        }
    }

    /// Makes `kind` the active mode. Returns false if it already is.
    ///
    /// # Errors
    /// Returns an error if the new probe's views could not be built; no
    /// mode is active afterwards.
    pub fn switch(&mut self, kind: ModeKind) -> Result<bool> {
        if self.kind() == Some(kind) {
            return Ok(false);
        }
        self.takedown();
        self.active = Some(self.build(kind)?);
        info!("switched to {kind}");
        Ok(true)
    }

    /// Ends running animations and drops the active probe with every
    /// surface it drew on.
    pub fn takedown(&mut self) {
        if let Some(mut mode) = self.active.take() {
            mode.reset();
            debug!("took down {}", mode.kind());
        }
    }

    fn build(&self, kind: ModeKind) -> Result<ActiveMode> {
        let config = &self.config;
        let input = config.input_surface("channel", self.channel.clone());
        let mode = match kind {
            ModeKind::LimSlice => {
                let (width, height) = (self.channel.width(), self.channel.height());
                let crop = config.output_surface("crop", ViewBox::image(width, height));
                let profile = config.output_surface(
                    "profile",
                    ViewBox::new((0.0, usize_to_f64(height)), (0.0, 1.0)),
                );
                ActiveMode::LimSlice {
                    probe: LimSlice::new(input, crop, profile, config.image_colormap),
                    main: ProbeSession::new(),
                    secondary: ProbeSession::new(),
                }
            }
            ModeKind::FlexLumen => {
                let spectra = config.output_surface("spectra", self.band_view());
                ActiveMode::FlexLumen {
                    probe: FlexLumen::new(
                        input,
                        Rc::clone(&self.cube),
                        spectra,
                        config.curve_margin,
                    ),
                    session: ProbeSession::new(),
                }
            }
            ModeKind::MeanSign => {
                let depth = self.masked.depth();
                let spectrum = config.output_surface("mean", self.band_view());
                let matrix = config.output_surface("matrix", ViewBox::image(depth, depth));
                ActiveMode::MeanSign {
                    probe: MeanSign::new(
                        input,
                        Rc::clone(&self.masked),
                        spectrum,
                        matrix,
                        config.mean_curve_color,
                        config.matrix_colormap,
                        self.spectral.clone(),
                    )?,
                    session: ProbeSession::new(),
                }
            }
        };
        Ok(mode)
    }

    fn band_view(&self) -> ViewBox {
        let last = usize_to_f64(self.cube.depth().saturating_sub(1));
        ViewBox::new((0.0, last.max(1.0)), (0.0, 1.0))
    }

    /// Routes a pointer action to the session of `target`.
    ///
    /// A press on one LimSlice surface ends any session still running on
    /// the other. Secondary events in modes without a crop surface are
    /// ignored.
    ///
    /// # Errors
    /// Propagates session errors.
    pub fn handle(&mut self, target: Target, action: PointerAction) -> Result<()> {
        let press = matches!(action, PointerAction::Press(_));
        match (&mut self.active, target) {
            (None, _) => {
                trace!("no active mode");
                Ok(())
            }
            (
                Some(ActiveMode::LimSlice {
                    probe,
                    main,
                    secondary,
                }),
                target,
            ) => {
                if target == Target::Main {
                    if press {
                        secondary.reset(probe.container_mut());
                    }
                    main.handle(probe, action)
                } else {
                    if press {
                        main.reset(probe);
                    }
                    secondary.handle(probe.container_mut(), action)
                }
            }
            (Some(ActiveMode::FlexLumen { probe, session }), Target::Main) => {
                session.handle(probe, action)
            }
            (Some(ActiveMode::MeanSign { probe, session }), Target::Main) => {
                session.handle(probe, action)
            }
            (Some(mode), Target::Secondary) => {
                trace!("{} has no secondary surface", mode.kind());
                Ok(())
            }
        }
    }

    /// Text fields of the active mode.
    #[must_use]
    pub fn texts(&self) -> ModeTexts {
        match &self.active {
            None => ModeTexts::default(),
            Some(ActiveMode::LimSlice { probe, .. }) => ModeTexts {
                bounds: Some(probe.bounds_text().to_owned()),
                lines: Some(probe.lines_text().to_owned()),
                points: None,
            },
            Some(ActiveMode::FlexLumen { probe, .. }) => ModeTexts {
                points: Some(probe.text().to_owned()),
                ..ModeTexts::default()
            },
            Some(ActiveMode::MeanSign { probe, .. }) => ModeTexts {
                bounds: Some(probe.text().to_owned()),
                ..ModeTexts::default()
            },
        }
    }

    /// Applies an edited text field to the active mode.
    ///
    /// # Errors
    /// Returns [`Error::NoTextField`] if the mode has no such field, and
    /// otherwise whatever the probe's text handler reports.
    pub fn apply_text(&mut self, field: TextField, text: &str) -> Result<TextEdit> {
        let kind = self.kind();
        match (&mut self.active, field) {
            (Some(ActiveMode::LimSlice { probe, .. }), TextField::Bounds) => {
                probe.apply_bounds_text(text)
            }
            (Some(ActiveMode::LimSlice { probe, .. }), TextField::Lines) => {
                probe.apply_lines_text(text)
            }
            (Some(ActiveMode::FlexLumen { probe, .. }), TextField::Points) => {
                probe.apply_text(text)
            }
            (Some(ActiveMode::MeanSign { probe, .. }), TextField::Bounds) => {
                probe.apply_text(text)
            }
            _ => Err(Error::NoTextField { mode: kind, field }),
        }
    }

    /// Export report of the active mode.
    #[must_use]
    pub fn export(&self) -> Option<ExportReport> {
        Some(match self.active.as_ref()? {
            ActiveMode::LimSlice { probe, .. } => lim_slice_report(probe),
            ActiveMode::FlexLumen { probe, .. } => flex_lumen_report(probe),
            ActiveMode::MeanSign { probe, .. } => mean_sign_report(probe),
        })
    }

    /// Every surface of the active mode, with its pane.
    #[must_use]
    pub fn surfaces(&self) -> Vec<(Pane, &Surface)> {
        let Some(mode) = &self.active else {
            return Vec::new();
        };
        let probe = mode.probe();
        [Pane::Input, Pane::Output, Pane::Detail]
            .into_iter()
            .filter_map(|pane| probe.pane(pane).map(|surface| (pane, surface)))
            .collect()
    }

    /// Replaces the channel, cube and mask, and hands them to the active
    /// mode.
    ///
    /// LimSlice resamples its stored lines from the new channel,
    /// FlexLumen reads spectra from the unmasked cube and MeanSign
    /// averages over the masked cube.
    ///
    /// # Errors
    /// Returns an error if the mask does not match the raster shapes or a
    /// view actor is gone.
    pub fn set_sources(&mut self, sources: Sources) -> Result<()> {
        let (channel, cube, masked) = prepare(sources)?;
        self.install(channel, cube, masked)?;
        if let Some(kind) = self.kind() {
            debug!("sources replaced for {kind}");
        }
        Ok(())
    }

    /// Turns the channel and both cubes a quarter turn counter-clockwise.
    ///
    /// Probes keep their data coordinates; stored lines clamp to the new
    /// crop widths and points read from their clamped pixels.
    ///
    /// # Errors
    /// Returns an error if a view actor is gone.
    pub fn rotate(&mut self) -> Result<()> {
        let channel = self.channel.rot90();
        let cube = Rc::new(self.cube.rot90());
        let masked = if Rc::ptr_eq(&self.cube, &self.masked) {
            Rc::clone(&cube)
        } else {
            Rc::new(self.masked.rot90())
        };
        self.install(channel, cube, masked)?;
        debug!(
            "rotated to {}x{}",
            self.channel.width(),
            self.channel.height()
        );
        Ok(())
    }

    fn install(&mut self, channel: Raster, cube: Rc<Raster>, masked: Rc<Raster>) -> Result<()> {
        self.channel = channel;
        self.cube = cube;
        self.masked = masked;
        let Some(mode) = self.active.as_mut() else {
            return Ok(());
        };
        mode.reset();
        match mode {
            ActiveMode::LimSlice { probe, .. } => probe.set_channel(self.channel.clone())?,
            ActiveMode::FlexLumen { probe, .. } => {
                probe.set_channel(self.channel.clone());
                probe.set_cube(Rc::clone(&self.cube))?;
            }
            ActiveMode::MeanSign { probe, .. } => {
                probe.set_channel(self.channel.clone());
                probe.set_cube(Rc::clone(&self.masked))?;
            }
        }
        Ok(())
    }
}

fn prepare(sources: Sources) -> Result<(Raster, Rc<Raster>, Rc<Raster>)> {
    let Sources {
        channel,
        cube,
        mask,
    } = sources;
    let Some(mask) = mask else {
        let cube = Rc::new(cube);
        return Ok((channel, Rc::clone(&cube), cube));
    };
    let channel = channel.masked(&mask)?;
    let masked = Rc::new(cube.masked(&mask)?);
    Ok((channel, Rc::new(cube), masked))
}
