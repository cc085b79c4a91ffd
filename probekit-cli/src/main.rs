//! probekit: replay pointer and text scripts against the raster probes.
//!
//! The binary builds a synthetic spectral cube, derives the displayed
//! channel (and optionally a pixel mask) from it, activates one of the
//! three probe modes and replays a JSON event script. Text fields are
//! printed at the end; the export report and surface snapshots can be
//! written to disk.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::too_many_lines
)]

mod script;
mod synth;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use probekit_algorithms::{plane_range, SpectralConfig};
use probekit_viewer::{ModeKind, ProbeModes, Sources, ViewerConfig};
use thiserror::Error;

use crate::script::{replay, Script};
use crate::synth::{derive_channel, derive_mask, synthetic_cube, ChannelSource};

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Core error: {0}")]
    Core(#[from] probekit_core::Error),

    #[error("Viewer error: {0}")]
    Viewer(#[from] probekit_viewer::Error),

    #[error("Expression error: {0}")]
    Expression(String),
}

/// Probe mode selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Rectangles with per-rectangle column profiles
    LimSlice,
    /// Point spectra with editable point list
    FlexLumen,
    /// Rectangle mean spectrum and band ratio matrix
    MeanSign,
}

impl From<Mode> for ModeKind {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::LimSlice => Self::LimSlice,
            Mode::FlexLumen => Self::FlexLumen,
            Mode::MeanSign => Self::MeanSign,
        }
    }
}

/// Synthetic cube and channel options shared by every command.
#[derive(Debug, clap::Args)]
struct CubeArgs {
    /// Width and height of the synthetic cube (pixels)
    #[arg(long, default_value = "64")]
    size: usize,

    /// Number of spectral bands
    #[arg(long, default_value = "8")]
    bands: usize,

    /// Band shown as the channel
    #[arg(long, default_value = "0", conflicts_with = "ndi")]
    band: usize,

    /// Show the normalized difference of two bands, e.g. `--ndi 3,1`
    #[arg(long, value_delimiter = ',', num_args = 2)]
    ndi: Option<Vec<usize>>,

    /// Mask out pixels where this band is at or below `--mask-min`
    #[arg(long, requires = "mask_min")]
    mask_band: Option<usize>,

    /// Exclusive lower bound for the mask band
    #[arg(long)]
    mask_min: Option<f64>,
}

impl CubeArgs {
    fn channel_source(&self) -> ChannelSource {
        match self.ndi.as_deref() {
            Some(&[a, b]) => ChannelSource::NormalizedDifference(a, b),
            _ => ChannelSource::Band(self.band),
        }
    }

    fn sources(&self) -> Result<(Sources, String)> {
        let cube = synthetic_cube(self.size, self.bands)?;
        let (channel, formula) = derive_channel(&cube, self.channel_source())?;
        let mask = match (self.mask_band, self.mask_min) {
            (Some(band), Some(min)) => Some(derive_mask(&cube, band, min)?),
            _ => None,
        };
        Ok((
            Sources {
                channel,
                cube,
                mask,
            },
            formula,
        ))
    }
}

/// Interactive raster probes, driven from scripts.
#[derive(Parser)]
#[command(name = "probekit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON event script against a synthetic cube
    Replay {
        /// JSON script of pointer and text steps
        script: PathBuf,

        /// Probe mode active before the first step
        #[arg(short, long, value_enum, default_value = "lim-slice")]
        mode: Mode,

        #[command(flatten)]
        cube: CubeArgs,

        /// Framebuffer pixels per raster pixel on the channel surface
        #[arg(long, default_value = "4")]
        scale: u32,

        /// Write the export report of the final mode as JSON
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Directory receiving a PNG of every surface
        #[arg(long)]
        snapshots: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the synthetic cube and derived channel
    Info {
        #[command(flatten)]
        cube: CubeArgs,
    },
}

fn write_snapshots(modes: &ProbeModes, dir: &Path) -> Result<usize> {
    fs::create_dir_all(dir)?;
    let surfaces = modes.surfaces();
    for (_, surface) in &surfaces {
        let path = dir.join(format!("{}.png", surface.name()));
        surface.save_png(&path)?;
        info!("wrote {}", path.display());
    }
    Ok(surfaces.len())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            script,
            mode,
            cube,
            scale,
            export,
            snapshots,
            verbose,
        } => {
            let level = if verbose { "debug" } else { "warn" };
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
                .init();

            let script = Script::load(&script)?;
            let (sources, formula) = cube.sources()?;
            if verbose {
                eprintln!("Cube: {0}x{0}x{1}", cube.size, cube.bands);
                eprintln!("Channel: {}", formula);
                eprintln!("Steps: {}", script.steps.len());
            }

            let config = ViewerConfig::new().with_input_scale(scale);
            let mut modes = ProbeModes::new(config, SpectralConfig::default(), sources)?;
            modes.switch(mode.into())?;

            let mut stdout = std::io::stdout().lock();
            let summary = replay(&mut modes, &script, &mut stdout)?;

            let texts = modes.texts();
            if let Some(kind) = modes.kind() {
                println!("Mode: {}", kind);
            }
            for (name, text) in [
                ("bounds", &texts.bounds),
                ("lines", &texts.lines),
                ("points", &texts.points),
            ] {
                if let Some(text) = text {
                    println!("{}: {}", name, text);
                }
            }
            println!(
                "Replayed {} steps ({} rejected)",
                summary.steps, summary.rejected
            );

            if let Some(path) = export {
                if let Some(report) = modes.export() {
                    fs::write(&path, serde_json::to_string_pretty(&report)?)?;
                    println!("Export written to {}", path.display());
                }
            }
            if let Some(dir) = snapshots {
                let count = write_snapshots(&modes, &dir)?;
                println!("{} snapshots written to {}", count, dir.display());
            }
        }

        Commands::Info { cube } => {
            env_logger::init();
            let (sources, formula) = cube.sources()?;
            println!(
                "Cube: {} x {} x {}",
                sources.cube.height(),
                sources.cube.width(),
                sources.cube.depth()
            );
            println!("Channel: {}", formula);
            if let Some((lo, hi)) = plane_range(sources.channel.plane()) {
                println!("Channel range: {:.4} - {:.4}", lo, hi);
            }
            if let Some(mask) = &sources.mask {
                let kept = mask.iter().filter(|keep| **keep).count();
                println!("Mask keeps {} of {} pixels", kept, mask.len());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_args(ndi: Option<Vec<usize>>) -> CubeArgs {
        CubeArgs {
            size: 16,
            bands: 4,
            band: 1,
            ndi,
            mask_band: Some(0),
            mask_min: Some(0.5),
        }
    }

    #[test]
    fn test_cli_parses_replay() {
        let cli = Cli::try_parse_from([
            "probekit",
            "replay",
            "script.json",
            "--mode",
            "mean-sign",
            "--ndi",
            "3,1",
            "--export",
            "out.json",
        ])
        .unwrap();
        let Commands::Replay { mode, cube, export, .. } = cli.command else {
            panic!("expected replay");
        };
        assert!(matches!(mode, Mode::MeanSign));
        assert_eq!(cube.channel_source(), ChannelSource::NormalizedDifference(3, 1));
        assert_eq!(export, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_sources_apply_mask() {
        let (sources, formula) = cube_args(None).sources().unwrap();
        assert_eq!(formula, "b1");
        let mask = sources.mask.unwrap();
        assert_eq!(mask.dim(), (16, 16));
    }

    #[test]
    fn test_replay_writes_export_and_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let (sources, _) = cube_args(Some(vec![0, 2])).sources().unwrap();
        let config = ViewerConfig::new().with_input_scale(2).with_output_size(40, 30);
        let mut modes = ProbeModes::new(config, SpectralConfig::default(), sources).unwrap();
        modes.switch(ModeKind::MeanSign).unwrap();

        let script: Script = serde_json::from_str(
            r#"{"steps": [
                {"op": "press", "x": 2, "y": 2, "button": "primary"},
                {"op": "motion", "x": 8, "y": 6, "button": "primary"},
                {"op": "release", "x": 8, "y": 6, "button": "primary"}
            ]}"#,
        )
        .unwrap();
        replay(&mut modes, &script, &mut Vec::new()).unwrap();

        let report = serde_json::to_value(modes.export().unwrap()).unwrap();
        let path = dir.path().join("export.json");
        fs::write(&path, serde_json::to_string_pretty(&report).unwrap()).unwrap();
        let read: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read["mode"], "mean_sign");
        assert_eq!(read["regions"][0]["area"], 24);
        assert_eq!(read["spectra"][0]["spectrum"].as_array().unwrap().len(), 4);

        let count = write_snapshots(&modes, &dir.path().join("png")).unwrap();
        assert_eq!(count, 3);
        assert!(dir.path().join("png").join("channel.png").exists());
        assert!(dir.path().join("png").join("matrix.png").exists());
    }
}
