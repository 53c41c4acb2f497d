//! Runtime configuration types.
//!
//! These are the validated structs the driver is assembled from. They are
//! separate from the TOML-deserialized config in `dust_config`; see
//! `conversions` for the mapping.

use std::num::{NonZeroU16, NonZeroUsize};
use std::time::Duration;

use crate::builder::DEFAULT_REFERENCE_VOLTAGE;
use crate::profile::SensorModel;
use crate::sensor::DEFAULT_SAMPLES;
use crate::window::RunningAverage;

/// Sensor construction settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorCfg {
    pub model: SensorModel,
    pub reference_voltage: f32,
    /// Conversions per reading.
    pub samples: NonZeroU16,
    /// Window length; `None` builds a sensor without a running average.
    pub running_average: Option<NonZeroUsize>,
    pub sensitivity: Option<f32>,
    pub calibration_factor: Option<f32>,
    pub baseline_v: Option<f32>,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            model: SensorModel::Gp2y1014au0f,
            reference_voltage: DEFAULT_REFERENCE_VOLTAGE,
            samples: DEFAULT_SAMPLES,
            running_average: Some(RunningAverage::DEFAULT_CAPACITY),
            sensitivity: None,
            calibration_factor: None,
            baseline_v: None,
        }
    }
}

/// Background polling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PollCfg {
    /// Reading period, start to start.
    pub interval: Duration,
    pub samples: NonZeroU16,
    /// Adopt ready baseline candidates as they appear.
    pub auto_adopt_baseline: bool,
}

impl Default for PollCfg {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            samples: DEFAULT_SAMPLES,
            auto_adopt_baseline: false,
        }
    }
}
