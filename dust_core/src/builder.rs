//! Type-state builder for `DustSensor`.
//!
//! `build()` only exists once both lines are provided; the window type is
//! chosen with `with_running_average` / `without_running_average` and decides
//! at compile time whether `running_average()` is available.

use std::num::NonZeroUsize;

use dust_traits::clock::{Clock, MonotonicClock};
use dust_traits::{AnalogInput, Emitter};

use crate::baseline::BaselineTracker;
use crate::calibration::Calibration;
use crate::config::SensorCfg;
use crate::error::{BuildError, Result};
use crate::profile::SensorModel;
use crate::pulse::{PulseSampler, PulseTiming};
use crate::sensor::DustSensor;
use crate::window::{DensityWindow, NoWindow, RunningAverage};

/// Default ADC reference voltage.
pub const DEFAULT_REFERENCE_VOLTAGE: f32 = 5.0;

/// Marker for a line not yet supplied.
pub struct Missing;

pub struct DustSensorBuilder<E, A, C, W> {
    model: SensorModel,
    emitter: E,
    adc: A,
    clock: C,
    window: W,
    v_ref: f32,
    sensitivity: Option<f32>,
    calibration_factor: Option<f32>,
    baseline_v: Option<f32>,
    timing: PulseTiming,
}

impl DustSensor<Missing, Missing> {
    /// Start building a sensor of the given variant with a 60-reading window
    /// and the real-time clock.
    pub fn builder(
        model: SensorModel,
    ) -> DustSensorBuilder<Missing, Missing, MonotonicClock, RunningAverage> {
        DustSensorBuilder {
            model,
            emitter: Missing,
            adc: Missing,
            clock: MonotonicClock::new(),
            window: RunningAverage::default(),
            v_ref: DEFAULT_REFERENCE_VOLTAGE,
            sensitivity: None,
            calibration_factor: None,
            baseline_v: None,
            timing: PulseTiming::default(),
        }
    }
}

impl<E, A, C, W> DustSensorBuilder<E, A, C, W> {
    pub fn with_emitter<E2: Emitter>(self, emitter: E2) -> DustSensorBuilder<E2, A, C, W> {
        DustSensorBuilder {
            model: self.model,
            emitter,
            adc: self.adc,
            clock: self.clock,
            window: self.window,
            v_ref: self.v_ref,
            sensitivity: self.sensitivity,
            calibration_factor: self.calibration_factor,
            baseline_v: self.baseline_v,
            timing: self.timing,
        }
    }

    pub fn with_adc<A2: AnalogInput>(self, adc: A2) -> DustSensorBuilder<E, A2, C, W> {
        DustSensorBuilder {
            model: self.model,
            emitter: self.emitter,
            adc,
            clock: self.clock,
            window: self.window,
            v_ref: self.v_ref,
            sensitivity: self.sensitivity,
            calibration_factor: self.calibration_factor,
            baseline_v: self.baseline_v,
            timing: self.timing,
        }
    }

    pub fn with_clock<C2: Clock>(self, clock: C2) -> DustSensorBuilder<E, A, C2, W> {
        DustSensorBuilder {
            model: self.model,
            emitter: self.emitter,
            adc: self.adc,
            clock,
            window: self.window,
            v_ref: self.v_ref,
            sensitivity: self.sensitivity,
            calibration_factor: self.calibration_factor,
            baseline_v: self.baseline_v,
            timing: self.timing,
        }
    }

    fn with_window<W2: DensityWindow>(self, window: W2) -> DustSensorBuilder<E, A, C, W2> {
        DustSensorBuilder {
            model: self.model,
            emitter: self.emitter,
            adc: self.adc,
            clock: self.clock,
            window,
            v_ref: self.v_ref,
            sensitivity: self.sensitivity,
            calibration_factor: self.calibration_factor,
            baseline_v: self.baseline_v,
            timing: self.timing,
        }
    }

    pub fn with_running_average(
        self,
        capacity: NonZeroUsize,
    ) -> DustSensorBuilder<E, A, C, RunningAverage> {
        self.with_window(RunningAverage::new(capacity))
    }

    pub fn without_running_average(self) -> DustSensorBuilder<E, A, C, NoWindow> {
        self.with_window(NoWindow)
    }

    pub fn with_model(mut self, model: SensorModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_reference_voltage(mut self, volts: f32) -> Self {
        self.v_ref = volts;
        self
    }

    pub fn with_sensitivity(mut self, volts_per_100ug: f32) -> Self {
        self.sensitivity = Some(volts_per_100ug);
        self
    }

    pub fn with_calibration_factor(mut self, slope: f32) -> Self {
        self.calibration_factor = Some(slope);
        self
    }

    /// Start from an operator baseline instead of the profile typical.
    pub fn with_baseline(mut self, volts: f32) -> Self {
        self.baseline_v = Some(volts);
        self
    }

    pub fn with_timing(mut self, timing: PulseTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Apply the scalar settings from a runtime config. The window is chosen
    /// separately since it changes the sensor's type.
    pub fn with_config(mut self, cfg: &SensorCfg) -> Self {
        self.model = cfg.model;
        self.v_ref = cfg.reference_voltage;
        self.sensitivity = cfg.sensitivity.or(self.sensitivity);
        self.calibration_factor = cfg.calibration_factor.or(self.calibration_factor);
        self.baseline_v = cfg.baseline_v.or(self.baseline_v);
        self
    }
}

impl<E, A, C, W> DustSensorBuilder<E, A, C, W>
where
    E: Emitter,
    A: AnalogInput,
    C: Clock,
    W: DensityWindow,
{
    pub fn build(self) -> Result<DustSensor<E, A, C, W>> {
        if !(self.v_ref.is_finite() && self.v_ref > 0.0) {
            return Err(BuildError::InvalidConfig("reference voltage must be > 0").into());
        }
        let defaults = Calibration::default();
        let calibration = Calibration {
            sensitivity: self.sensitivity.unwrap_or(defaults.sensitivity),
            calibration_factor: self
                .calibration_factor
                .unwrap_or(defaults.calibration_factor),
        };
        if !(calibration.sensitivity.is_finite() && calibration.sensitivity > 0.0) {
            return Err(BuildError::InvalidConfig("sensitivity must be > 0").into());
        }
        if !(calibration.calibration_factor.is_finite() && calibration.calibration_factor > 0.0) {
            return Err(BuildError::InvalidConfig("calibration factor must be > 0").into());
        }
        if !(1..=16).contains(&self.adc.resolution_bits()) {
            return Err(BuildError::InvalidConfig("adc resolution must be 1..=16 bits").into());
        }
        if self.timing.settle >= self.timing.period {
            return Err(
                BuildError::InvalidConfig("pulse settle time must be shorter than the period")
                    .into(),
            );
        }

        let profile = self.model.profile();
        if !profile.sensitivity.contains(calibration.sensitivity) {
            tracing::warn!(
                model = %self.model,
                sensitivity = calibration.sensitivity,
                min = profile.sensitivity.min,
                max = profile.sensitivity.max,
                "sensitivity outside the datasheet range"
            );
        }
        let mut baseline = BaselineTracker::new(profile);
        if let Some(v) = self.baseline_v {
            baseline.set_baseline(v);
        }

        Ok(DustSensor {
            sampler: PulseSampler::new(self.emitter, self.adc, self.clock, self.timing),
            profile,
            v_ref: self.v_ref,
            calibration,
            baseline,
            window: self.window,
        })
    }
}
