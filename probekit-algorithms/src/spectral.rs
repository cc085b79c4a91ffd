//! Mean spectra and band ratio matrices.

use ndarray::{Array1, Array2, ArrayView1, ArrayView3, Axis, Zip};
use probekit_core::convert::usize_to_f64;
use rayon::prelude::*;

use crate::SpectralConfig;

/// Per-band mean over every pixel of a `(rows, columns, bands)` region.
///
/// Returns `None` for a region with no pixels.
#[must_use]
pub fn mean_spectrum(region: ArrayView3<'_, f64>) -> Option<Array1<f64>> {
    mean_spectrum_with(region, &SpectralConfig::default())
}

/// [`mean_spectrum`] with an explicit configuration.
#[must_use]
pub fn mean_spectrum_with(
    region: ArrayView3<'_, f64>,
    config: &SpectralConfig,
) -> Option<Array1<f64>> {
    let (rows, cols, depth) = region.dim();
    if rows == 0 || cols == 0 {
        return None;
    }
    let count = usize_to_f64(rows * cols);
    let band_mean = |band: usize| region.index_axis(Axis(2), band).sum() / count;

    let means: Vec<f64> = if config.is_parallel(rows * cols * depth) {
        (0..depth).into_par_iter().map(band_mean).collect()
    } else {
        (0..depth).map(band_mean).collect()
    };
    Some(Array1::from(means))
}

/// Band ratio matrix `M[i, j] = (s_i - s_j) / (s_i + s_j)`.
///
/// Cells whose denominator is zero are set to zero, so a zeroed (masked)
/// spectrum yields an all-zero matrix rather than NaNs.
#[must_use]
pub fn ratio_matrix(spectrum: ArrayView1<'_, f64>) -> Array2<f64> {
    ratio_matrix_with(spectrum, &SpectralConfig::default())
}

/// [`ratio_matrix`] with an explicit configuration.
#[must_use]
pub fn ratio_matrix_with(spectrum: ArrayView1<'_, f64>, config: &SpectralConfig) -> Array2<f64> {
    let n = spectrum.len();
    let mut matrix = Array2::<f64>::zeros((n, n));
    let ratio = |(i, j): (usize, usize), cell: &mut f64| {
        let (a, b) = (spectrum[i], spectrum[j]);
        let sum = a + b;
        *cell = if sum == 0.0 { 0.0 } else { (a - b) / sum };
    };

    if config.is_parallel(n * n) {
        Zip::indexed(&mut matrix).par_for_each(ratio);
    } else {
        Zip::indexed(&mut matrix).for_each(ratio);
    }
    matrix
}
