//! Raw counts → volts → µg/m³.

use crate::util::round_to_u16;

/// Datasheet typical sensitivity, volts per 100 µg/m³.
pub const DEFAULT_SENSITIVITY: f32 = 0.5;

/// Linear conversion from ADC counts to particulate density.
///
/// volts   = mean_raw * (v_ref / full_scale) * calibration_factor
/// density = (volts - zero_dust_v) / sensitivity * 100, floored at 0
///
/// `sensitivity` is expressed per 100 µg/m³, hence the `* 100`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub sensitivity: f32,
    pub calibration_factor: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
            calibration_factor: 1.0,
        }
    }
}

impl Calibration {
    /// Scale an averaged ADC code to the sensor output voltage.
    #[inline]
    pub fn to_volts(&self, mean_raw: u16, v_ref: f32, full_scale: u32) -> f32 {
        f32::from(mean_raw) * (v_ref / full_scale as f32) * self.calibration_factor
    }

    /// Density in µg/m³, rounded to nearest. Voltages below the baseline
    /// clamp to 0.
    #[inline]
    pub fn to_density(&self, volts: f32, zero_dust_v: f32) -> u16 {
        if volts < zero_dust_v {
            return 0;
        }
        round_to_u16((volts - zero_dust_v) / self.sensitivity * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_bit_five_volt_scaling() {
        let cal = Calibration::default();
        let v = cal.to_volts(400, 5.0, 1024);
        assert!((v - 1.953_125).abs() < 1e-6);
    }

    #[test]
    fn calibration_factor_scales_voltage() {
        let cal = Calibration {
            calibration_factor: 1.1,
            ..Calibration::default()
        };
        let v = cal.to_volts(1000, 5.0, 1024);
        assert!((v - 1000.0 * 5.0 / 1024.0 * 1.1).abs() < 1e-5);
    }

    #[test]
    fn below_baseline_is_zero() {
        let cal = Calibration::default();
        assert_eq!(cal.to_density(0.59, 0.6), 0);
        assert_eq!(cal.to_density(0.0, 0.6), 0);
    }

    #[test]
    fn sensitivity_sets_slope() {
        let cal = Calibration {
            sensitivity: 0.25,
            ..Calibration::default()
        };
        // 0.5 V above baseline at 0.25 V/100 → 200 µg/m³
        assert_eq!(cal.to_density(1.1, 0.6), 200);
    }
}
