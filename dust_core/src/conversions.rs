//! Bridging `dust_config` types to `dust_core` types.

use std::num::{NonZeroU16, NonZeroUsize};
use std::time::Duration;

use crate::config::{PollCfg, SensorCfg};
use crate::error::BuildError;
use crate::profile::SensorModel;

// ── SensorModel ──────────────────────────────────────────────────────────────

impl From<dust_config::SensorModel> for SensorModel {
    fn from(m: dust_config::SensorModel) -> Self {
        match m {
            dust_config::SensorModel::Gp2y1010au0f => SensorModel::Gp2y1010au0f,
            dust_config::SensorModel::Gp2y1014au0f => SensorModel::Gp2y1014au0f,
        }
    }
}

// ── SensorCfg ────────────────────────────────────────────────────────────────

impl TryFrom<&dust_config::Sensor> for SensorCfg {
    type Error = BuildError;

    fn try_from(c: &dust_config::Sensor) -> Result<Self, Self::Error> {
        let samples =
            NonZeroU16::new(c.samples).ok_or(BuildError::InvalidConfig("samples must be >= 1"))?;
        Ok(Self {
            model: c.model.into(),
            reference_voltage: c.reference_voltage,
            samples,
            running_average: NonZeroUsize::new(c.running_average),
            sensitivity: c.sensitivity,
            calibration_factor: c.calibration_factor,
            baseline_v: c.baseline_v,
        })
    }
}

// ── PollCfg ──────────────────────────────────────────────────────────────────

impl TryFrom<&dust_config::Config> for PollCfg {
    type Error = BuildError;

    fn try_from(c: &dust_config::Config) -> Result<Self, Self::Error> {
        let samples = NonZeroU16::new(c.sensor.samples)
            .ok_or(BuildError::InvalidConfig("samples must be >= 1"))?;
        if c.poll.interval_ms == 0 {
            return Err(BuildError::InvalidConfig("poll interval must be >= 1 ms"));
        }
        Ok(Self {
            interval: Duration::from_millis(c.poll.interval_ms),
            samples,
            auto_adopt_baseline: c.poll.auto_adopt_baseline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_window_maps_to_none() {
        let raw = dust_config::Sensor {
            running_average: 0,
            ..Default::default()
        };
        let cfg = SensorCfg::try_from(&raw).unwrap();
        assert_eq!(cfg.running_average, None);
        assert_eq!(cfg.model, SensorModel::Gp2y1014au0f);
        assert_eq!(cfg.samples.get(), 20);
    }

    #[test]
    fn zero_samples_is_rejected() {
        let raw = dust_config::Sensor {
            samples: 0,
            ..Default::default()
        };
        assert_eq!(
            SensorCfg::try_from(&raw),
            Err(BuildError::InvalidConfig("samples must be >= 1"))
        );
    }
}
