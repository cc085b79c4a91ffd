//! Column profiles and value ranges.

use ndarray::{ArrayView2, Axis};
use rayon::prelude::*;

use crate::SpectralConfig;

/// Values of one column, top to bottom.
///
/// The column is clamped to the last one; an empty plane yields an empty
/// profile.
#[must_use]
pub fn column_profile(plane: ArrayView2<'_, f64>, col: usize) -> Vec<f64> {
    let (rows, cols) = plane.dim();
    if rows == 0 || cols == 0 {
        return Vec::new();
    }
    plane.column(col.min(cols - 1)).to_vec()
}

/// Minimum and maximum of the finite values, skipping NaN and infinities.
pub fn finite_range<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Finite range of a whole plane, row-parallel for large planes.
#[must_use]
pub fn plane_range(plane: ArrayView2<'_, f64>) -> Option<(f64, f64)> {
    if SpectralConfig::default().is_parallel(plane.len()) {
        plane
            .axis_iter(Axis(0))
            .into_par_iter()
            .filter_map(|row| finite_range(row.iter().copied()))
            .reduce_with(|(a_lo, a_hi), (b_lo, b_hi)| (a_lo.min(b_lo), a_hi.max(b_hi)))
    } else {
        finite_range(plane.iter().copied())
    }
}

/// Axis limits around a range, widened by `margin` on each side.
///
/// A flat or missing range is widened to unit height so the axis never
/// collapses.
#[must_use]
pub fn padded_range(range: Option<(f64, f64)>, margin: f64) -> (f64, f64) {
    match range {
        Some((lo, hi)) if hi - lo > f64::EPSILON => (lo - margin, hi + margin),
        Some((lo, _)) => (lo - 0.5 - margin, lo + 0.5 + margin),
        None => (-margin, 1.0 + margin),
    }
}
