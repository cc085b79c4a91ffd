//! probekit-algorithms: Numerics behind the linked probe views.
//!
//! This crate provides:
//! - **Mean spectrum** - per-band average over a cube region
//! - **Ratio matrix** - `(s_i - s_j) / (s_i + s_j)` over a spectrum
//! - **Profiles** - column intensity profiles and finite value ranges
//!
//! Large inputs are processed in parallel with rayon.
#![warn(missing_docs)]

mod config;
mod profile;
mod spectral;

pub use config::SpectralConfig;
pub use profile::{column_profile, finite_range, padded_range, plane_range};
pub use spectral::{mean_spectrum, mean_spectrum_with, ratio_matrix, ratio_matrix_with};
