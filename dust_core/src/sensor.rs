//! Density estimator: the public face of the driver.

use std::num::NonZeroU16;

use dust_traits::clock::MonotonicClock;
use dust_traits::{AnalogInput, Clock, Emitter};
use tracing::debug;

use crate::baseline::{BaselineTracker, CandidateState};
use crate::calibration::Calibration;
use crate::error::Result;
use crate::profile::{SensorModel, SensorProfile};
use crate::pulse::PulseSampler;
use crate::window::{DensityWindow, RunningAverage};

/// Conversions averaged per reading unless the caller asks otherwise.
/// At 10 ms per pulse this is a 200 ms reading.
pub const DEFAULT_SAMPLES: NonZeroU16 = match NonZeroU16::new(20) {
    Some(n) => n,
    None => panic!("default sample count is non-zero"),
};

/// One density reading with the intermediate values that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DustReading {
    /// Integer mean of the raw ADC codes.
    pub mean_raw: u16,
    /// Scaled sensor output voltage (calibration factor applied).
    pub voltage: f32,
    /// Particulate density in µg/m³.
    pub density_ug_m3: u16,
}

/// GP2Y dust sensor driver.
///
/// Owns the emitter/ADC lines, calibration, baseline tracker and the
/// optional running-average window. Single owner; not `Sync`-safe to share
/// without external locking.
pub struct DustSensor<E, A, C = MonotonicClock, W = RunningAverage> {
    pub(crate) sampler: PulseSampler<E, A, C>,
    pub(crate) profile: &'static SensorProfile,
    pub(crate) v_ref: f32,
    pub(crate) calibration: Calibration,
    pub(crate) baseline: BaselineTracker,
    pub(crate) window: W,
}

impl<E, A, C, W> core::fmt::Debug for DustSensor<E, A, C, W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DustSensor")
            .field("model", &self.profile.model)
            .field("v_ref", &self.v_ref)
            .field("calibration", &self.calibration)
            .field("baseline_v", &self.baseline.baseline())
            .field("candidate", &self.baseline.state())
            .finish()
    }
}

impl<E, A, C, W> DustSensor<E, A, C, W>
where
    E: Emitter,
    A: AnalogInput,
    C: Clock,
    W: DensityWindow,
{
    /// Drive the emitter to its idle (off) state. Call once before reading.
    pub fn begin(&mut self) -> Result<()> {
        self.sampler.begin()?;
        debug!(model = %self.profile.model, v_ref = self.v_ref, "dust sensor ready");
        Ok(())
    }

    /// Take one reading from `samples` paced conversions.
    ///
    /// Blocks for `samples` pulse periods (200 ms at the defaults).
    pub fn read(&mut self, samples: NonZeroU16) -> Result<DustReading> {
        let mean_raw = self.sampler.mean_raw(samples)?;
        let voltage = self
            .calibration
            .to_volts(mean_raw, self.v_ref, self.sampler.full_scale());

        self.baseline.observe(voltage);
        let density_ug_m3 = self
            .calibration
            .to_density(voltage, self.baseline.baseline());
        self.window.record(density_ug_m3);
        self.baseline.record_reading();

        debug!(
            mean_raw,
            voltage,
            density_ug_m3,
            baseline_v = self.baseline.baseline(),
            "dust reading"
        );
        Ok(DustReading {
            mean_raw,
            voltage,
            density_ug_m3,
        })
    }

    /// Density in µg/m³ from `samples` paced conversions.
    pub fn read_density(&mut self, samples: NonZeroU16) -> Result<u16> {
        Ok(self.read(samples)?.density_ug_m3)
    }

    /// Density in µg/m³ using [`DEFAULT_SAMPLES`].
    pub fn read_density_default(&mut self) -> Result<u16> {
        self.read_density(DEFAULT_SAMPLES)
    }

    /// Distinct ADC codes, e.g. 1024 for a 10-bit converter.
    #[inline]
    pub fn adc_full_scale(&self) -> u32 {
        self.sampler.full_scale()
    }
}

impl<E, A, C, W: DensityWindow> DustSensor<E, A, C, W> {
    /// Zero-dust voltage currently used for conversion.
    #[inline]
    pub fn baseline(&self) -> f32 {
        self.baseline.baseline()
    }

    /// Override the zero-dust voltage. Not validated against the profile.
    pub fn set_baseline(&mut self, volts: f32) {
        self.baseline.set_baseline(volts);
    }

    /// Consume a ready baseline candidate (see [`BaselineTracker::take_candidate`]).
    /// Before one is ready this returns the previous candidate and changes
    /// nothing.
    pub fn take_baseline_candidate(&mut self) -> f32 {
        self.baseline.take_candidate()
    }

    #[inline]
    pub fn baseline_candidate_ready(&self) -> bool {
        self.baseline.candidate_ready()
    }

    #[inline]
    pub fn candidate_state(&self) -> CandidateState {
        self.baseline.state()
    }

    /// Lowest in-range voltage seen since the last candidate was taken.
    #[inline]
    pub fn tracked_min_voltage(&self) -> f32 {
        self.baseline.tracked_min()
    }

    /// Volts per 100 µg/m³.
    #[inline]
    pub fn sensitivity(&self) -> f32 {
        self.calibration.sensitivity
    }

    pub fn set_sensitivity(&mut self, volts_per_100ug: f32) {
        self.calibration.sensitivity = volts_per_100ug;
    }

    #[inline]
    pub fn calibration_factor(&self) -> f32 {
        self.calibration.calibration_factor
    }

    /// Multiplicative voltage correction from a reference-instrument comparison.
    pub fn set_calibration_factor(&mut self, slope: f32) {
        self.calibration.calibration_factor = slope;
    }

    #[inline]
    pub fn model(&self) -> SensorModel {
        self.profile.model
    }

    #[inline]
    pub fn profile(&self) -> &'static SensorProfile {
        self.profile
    }

    #[inline]
    pub fn reference_voltage(&self) -> f32 {
        self.v_ref
    }

    /// Smoothed density when the sensor keeps a window, `None` otherwise.
    #[inline]
    pub fn window_average(&self) -> Option<u16> {
        self.window.average()
    }
}

impl<E, A, C> DustSensor<E, A, C, RunningAverage> {
    /// Rounded mean of the densities in the window; 0 before the first reading.
    #[inline]
    pub fn running_average(&self) -> u16 {
        self.window.average()
    }

    #[inline]
    pub fn window(&self) -> &RunningAverage {
        &self.window
    }
}

impl<E, A, C, W> DustSensor<E, A, C, W> {
    /// Release the emitter, ADC and clock.
    pub fn into_parts(self) -> (E, A, C) {
        self.sampler.into_parts()
    }
}
