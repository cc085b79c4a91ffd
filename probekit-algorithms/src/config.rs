//! Tuning knobs for the spectral numerics.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for spectral computations.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpectralConfig {
    /// Element count at or above which work is split across threads.
    pub parallel_threshold: usize,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 64 * 64,
        }
    }
}

impl SpectralConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the parallel threshold.
    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Whether a workload of `len` elements should run in parallel.
    #[must_use]
    pub fn is_parallel(&self, len: usize) -> bool {
        len >= self.parallel_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectral_config() {
        let config = SpectralConfig::new().with_parallel_threshold(10);
        assert_eq!(config.parallel_threshold, 10);
        assert!(config.is_parallel(10));
        assert!(!config.is_parallel(9));
    }
}
