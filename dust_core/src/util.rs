//! Small integer helpers shared by the estimator and the averaging window.

/// `numerator / denominator` rounded to nearest, ties away from zero.
/// Returns 0 when `denominator` is 0.
#[inline]
pub fn div_round_nearest_u64(numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    (numerator + denominator / 2) / denominator
}

/// Saturating conversion of a rounded, non-negative float to `u16`.
/// NaN and negative values map to 0.
#[inline]
pub fn round_to_u16(x: f32) -> u16 {
    if !x.is_finite() {
        return if x == f32::INFINITY { u16::MAX } else { 0 };
    }
    // `as` saturates at both ends.
    x.round() as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up() {
        assert_eq!(div_round_nearest_u64(30, 2), 15);
        assert_eq!(div_round_nearest_u64(31, 2), 16);
        assert_eq!(div_round_nearest_u64(10, 3), 3);
        assert_eq!(div_round_nearest_u64(11, 3), 4);
        assert_eq!(div_round_nearest_u64(5, 0), 0);
    }

    #[test]
    fn float_rounding_saturates() {
        assert_eq!(round_to_u16(270.625), 271);
        assert_eq!(round_to_u16(0.12), 0);
        assert_eq!(round_to_u16(-3.0), 0);
        assert_eq!(round_to_u16(1e9), u16::MAX);
        assert_eq!(round_to_u16(f32::NAN), 0);
        assert_eq!(round_to_u16(f32::INFINITY), u16::MAX);
    }
}
