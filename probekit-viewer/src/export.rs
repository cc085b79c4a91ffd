//! Serializable snapshots of probe state.
//!
//! Reports carry plain vectors so any serde format can write them; the
//! command line tool writes JSON.

use probekit_core::{Bounds, Raster};
use serde::Serialize;

use crate::composite::MeanSign;
use crate::flex_lumen::FlexLumen;
use crate::lim_slice::LimSlice;
use crate::probe::RegionId;

/// Rectangle bounds with their pixel area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionRecord {
    /// Rectangle identity.
    pub region: RegionId,
    /// Left edge, inclusive.
    pub x0: usize,
    /// Top edge, inclusive.
    pub y0: usize,
    /// Right edge, exclusive.
    pub x1: usize,
    /// Bottom edge, exclusive.
    pub y1: usize,
    /// Pixels covered by the bounds.
    pub area: usize,
}

impl RegionRecord {
    fn new(region: RegionId, bounds: Bounds) -> Self {
        Self {
            region,
            x0: bounds.x0,
            y0: bounds.y0,
            x1: bounds.x1,
            y1: bounds.y1,
            area: bounds.area(),
        }
    }
}

/// Column profile of one stored line inside a rectangle's crop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineProfileRecord {
    /// Rectangle the line is stored under.
    pub region: RegionId,
    /// Stored position, which may lie beyond a shrunken crop.
    pub stored: usize,
    /// Sampled column within the crop.
    pub x: usize,
    /// Sampled column within the full channel.
    pub x_abs: usize,
    /// Channel values down column `x`, top to bottom.
    pub values: Vec<f64>,
}

/// Mean spectrum and band ratio matrix of one rectangle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanSignRecord {
    /// Rectangle the spectrum is averaged over.
    pub region: RegionId,
    /// Mean value per band.
    pub spectrum: Vec<f64>,
    /// Ratio matrix, row-major, one row per band.
    pub matrix: Vec<Vec<f64>>,
}

/// Spectrum under one committed point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSpectrumRecord {
    /// Pixel column.
    pub x: usize,
    /// Pixel row.
    pub y: usize,
    /// Value per band at the pixel.
    pub spectrum: Vec<f64>,
}

/// Exported state of the active probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExportReport {
    /// Rectangles holding stored lines, and every stored line.
    LimSlice {
        regions: Vec<RegionRecord>,
        lines: Vec<LineProfileRecord>,
    },
    /// Committed points in creation order.
    FlexLumen { points: Vec<PointSpectrumRecord> },
    /// Every rectangle, with one spectrum record per rectangle.
    MeanSign {
        regions: Vec<RegionRecord>,
        spectra: Vec<MeanSignRecord>,
    },
}

fn crop_column(channel: Option<&Raster>, bounds: Bounds, x: usize) -> Vec<f64> {
    channel
        .and_then(|c| c.crop(bounds).ok())
        .map(|crop| crop.column(x).to_vec())
        .unwrap_or_default()
}

/// Regions with stored lines and the profiles of those lines.
///
/// Stored columns beyond a shrunken crop are reported at its last column,
/// the same column the crop view draws them at.
#[must_use]
pub fn lim_slice_report(probe: &LimSlice) -> ExportReport {
    let channel = probe.window().surface().raster();
    let mut regions = Vec::new();
    let mut lines = Vec::new();
    for (region, bounds) in probe.stored_regions() {
        regions.push(RegionRecord::new(region, bounds));
        lines.extend(
            probe
                .container()
                .positions(region)
                .iter()
                .map(|&stored| {
                    let x = stored.min(bounds.width().saturating_sub(1));
                    LineProfileRecord {
                        region,
                        stored,
                        x,
                        x_abs: bounds.x0 + x,
                        values: crop_column(channel, bounds, x),
                    }
                }),
        );
    }
    ExportReport::LimSlice { regions, lines }
}

/// Committed points and their spectra.
#[must_use]
pub fn flex_lumen_report(probe: &FlexLumen) -> ExportReport {
    let lumen = probe.lumen();
    let points = lumen
        .points()
        .points()
        .into_iter()
        .map(|pixel| PointSpectrumRecord {
            x: pixel.x,
            y: pixel.y,
            spectrum: lumen.spectrum(pixel),
        })
        .collect();
    ExportReport::FlexLumen { points }
}

/// Every rectangle with its mean spectrum and ratio matrix.
///
/// Rectangles covering no pixels export empty data.
#[must_use]
pub fn mean_sign_report(probe: &MeanSign) -> ExportReport {
    let mut regions = Vec::new();
    let mut spectra = Vec::new();
    for region in probe.window().regions() {
        let Some(bounds) = probe.window().bounds(region.id) else {
            continue;
        };
        regions.push(RegionRecord::new(region.id, bounds));
        let (spectrum, matrix) = match probe.region_spectrum(bounds) {
            Some(spectrum) => {
                let matrix = probe
                    .ratio_matrix(&spectrum)
                    .rows()
                    .into_iter()
                    .map(|row| row.to_vec())
                    .collect();
                (spectrum.to_vec(), matrix)
            }
            None => (Vec::new(), Vec::new()),
        };
        spectra.push(MeanSignRecord {
            region: region.id,
            spectrum,
            matrix,
        });
    }
    ExportReport::MeanSign { regions, spectra }
}
