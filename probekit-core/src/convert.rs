//! Numeric conversion utilities shared by the probekit crates.
//!
//! These functions handle conversions between numeric types with explicit
//! handling of precision loss and bounds checking.

/// Convert usize to f64 with allowed precision loss.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    value as f64
}

/// Convert u32 to f64.
#[must_use]
pub fn u32_to_f64(value: u32) -> f64 {
    f64::from(value)
}

/// Convert f32 to u8 with clamping to [0, 255].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn f32_to_u8(value: f32) -> u8 {
    let clamped = value.clamp(0.0, 255.0);
    clamped.round() as u8
}

/// Convert f64 to i64, saturating at the integer range and mapping NaN to 0.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn f64_to_i64(value: f64) -> i64 {
    // `as` saturates for out-of-range floats and maps NaN to zero.
    value as i64
}

/// Clamp a signed index into `[0, len)`.
///
/// Returns 0 for an empty axis.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn clamp_index(value: i64, len: usize) -> usize {
    if len == 0 || value <= 0 {
        return 0;
    }
    let value = value as u64;
    let last = (len - 1) as u64;
    value.min(last) as usize
}

/// Clamp a signed coordinate into `[0, len]` (an inclusive edge position).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn clamp_edge(value: i64, len: usize) -> usize {
    if value <= 0 {
        return 0;
    }
    (value as u64).min(len as u64) as usize
}

/// Convert a pixel coordinate from f64 to i64 for rasterization.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn f64_to_pixel(value: f64) -> i64 {
    value.floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(-4, 10), 0);
        assert_eq!(clamp_index(3, 10), 3);
        assert_eq!(clamp_index(10, 10), 9);
        assert_eq!(clamp_index(5, 0), 0);
    }

    #[test]
    fn test_clamp_edge() {
        assert_eq!(clamp_edge(-1, 50), 0);
        assert_eq!(clamp_edge(50, 50), 50);
        assert_eq!(clamp_edge(72, 50), 50);
    }

    #[test]
    fn test_f32_to_u8_clamps() {
        assert_eq!(f32_to_u8(-3.0), 0);
        assert_eq!(f32_to_u8(300.0), 255);
        assert_eq!(f32_to_u8(127.6), 128);
    }
}
