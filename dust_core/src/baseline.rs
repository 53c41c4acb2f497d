//! Zero-dust baseline tracking.
//!
//! Over a stretch of clean air the lowest plausible output voltage is a
//! better estimate of the unit's true zero point than the datasheet typical.
//! The tracker keeps that minimum and offers it as a candidate once enough
//! readings have been observed. Taking the candidate is a state transition:
//!
//! ```text
//! Pending { readings } --(readings > CANDIDATE_MIN_READINGS)--> Ready
//! Ready --take_candidate()--> Pending { readings: 0 }
//! ```

use tracing::{debug, info};

use crate::profile::SensorProfile;

/// Readings that must accrue (strictly more than this) before a candidate
/// is offered.
pub const CANDIDATE_MIN_READINGS: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateState {
    Pending { readings: u16 },
    Ready,
}

#[derive(Debug, Clone)]
pub struct BaselineTracker {
    profile: &'static SensorProfile,
    zero_dust_v: f32,
    tracked_min_v: f32,
    last_candidate_v: f32,
    state: CandidateState,
}

impl BaselineTracker {
    pub fn new(profile: &'static SensorProfile) -> Self {
        let typ = profile.typ_zero_voltage();
        Self {
            profile,
            zero_dust_v: typ,
            tracked_min_v: typ,
            last_candidate_v: typ,
            state: CandidateState::Pending { readings: 0 },
        }
    }

    /// Current zero-dust voltage used for density conversion.
    #[inline]
    pub fn baseline(&self) -> f32 {
        self.zero_dust_v
    }

    /// Operator override. Not range-checked.
    pub fn set_baseline(&mut self, volts: f32) {
        debug!(
            from = self.zero_dust_v,
            to = volts,
            in_range = self.profile.zero_dust_v.contains(volts),
            "baseline set"
        );
        self.zero_dust_v = volts;
    }

    /// Lower the tracked minimum when `volts` is below it and still inside
    /// the profile's zero-dust range. Out-of-range voltages are ignored here
    /// even though they still produce a density.
    pub fn observe(&mut self, volts: f32) {
        if volts < self.tracked_min_v && self.profile.zero_dust_v.contains(volts) {
            self.tracked_min_v = volts;
        }
    }

    /// Count one completed reading toward candidate readiness.
    pub fn record_reading(&mut self) {
        if let CandidateState::Pending { readings } = self.state {
            let readings = readings.saturating_add(1);
            if readings > CANDIDATE_MIN_READINGS {
                info!(candidate_v = self.tracked_min_v, "baseline candidate ready");
                self.state = CandidateState::Ready;
            } else {
                self.state = CandidateState::Pending { readings };
            }
        }
    }

    #[inline]
    pub fn state(&self) -> CandidateState {
        self.state
    }

    #[inline]
    pub fn candidate_ready(&self) -> bool {
        self.state == CandidateState::Ready
    }

    /// Lowest in-range voltage seen since the last candidate was taken.
    #[inline]
    pub fn tracked_min(&self) -> f32 {
        self.tracked_min_v
    }

    /// Pending: returns the previous candidate and changes nothing.
    /// Ready: returns the tracked minimum, then restarts tracking from the
    /// profile maximum with the reading counter at zero.
    ///
    /// Unlike the Arduino GP2YDustSensor library, which hands back the reset
    /// profile maximum until a new candidate is ready, a Pending take after a
    /// Ready one repeats the last candidate actually returned.
    pub fn take_candidate(&mut self) -> f32 {
        if self.state != CandidateState::Ready {
            return self.last_candidate_v;
        }
        let candidate = self.tracked_min_v;
        self.tracked_min_v = self.profile.max_zero_voltage();
        self.last_candidate_v = candidate;
        self.state = CandidateState::Pending { readings: 0 };
        debug!(candidate_v = candidate, "baseline candidate taken");
        candidate
    }
}
