//! The emitter pulse protocol.
//!
//! Each conversion happens inside one pulse cycle:
//!
//! ```text
//! LED on ─ settle 280 µs ─ ADC (~100 µs) ─ LED off ─ rest ─┐
//! └──────────────────── period 10 ms ──────────────────────┘
//! ```
//!
//! The rest is whatever remains of the period after the conversion, so the
//! cycle length holds even when the ADC is slower or faster than nominal.

use std::num::NonZeroU16;
use std::time::Duration;

use dust_traits::{AnalogInput, Clock, Emitter};
use tracing::trace;

use crate::error::Result;
use crate::hw_error::map_hw_error;

/// Emitter timing. The defaults are the GP2Y datasheet pulse requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseTiming {
    /// LED-on time before the output is sampled.
    pub settle: Duration,
    /// Full cycle length, LED-on to next LED-on.
    pub period: Duration,
}

impl PulseTiming {
    pub const SETTLE: Duration = Duration::from_micros(280);
    pub const PERIOD: Duration = Duration::from_millis(10);
}

impl Default for PulseTiming {
    fn default() -> Self {
        Self {
            settle: Self::SETTLE,
            period: Self::PERIOD,
        }
    }
}

/// Owns the emitter and ADC lines and runs the pulse protocol on them.
pub struct PulseSampler<E, A, C> {
    emitter: E,
    adc: A,
    clock: C,
    timing: PulseTiming,
}

impl<E: Emitter, A: AnalogInput, C: Clock> PulseSampler<E, A, C> {
    pub fn new(emitter: E, adc: A, clock: C, timing: PulseTiming) -> Self {
        Self {
            emitter,
            adc,
            clock,
            timing,
        }
    }

    /// Put the emitter in its idle (off) state.
    pub fn begin(&mut self) -> Result<()> {
        self.emitter.off().map_err(|e| map_hw_error(&*e))?;
        Ok(())
    }

    /// One conversion: LED on, settle, sample, LED off.
    ///
    /// The LED is switched off even when the conversion fails.
    pub fn sample_raw(&mut self) -> Result<u16> {
        self.emitter.on().map_err(|e| map_hw_error(&*e))?;
        self.clock.sleep(self.timing.settle);
        let raw = self.adc.read();
        self.emitter.off().map_err(|e| map_hw_error(&*e))?;
        raw.map_err(|e| map_hw_error(&*e).into())
    }

    /// One conversion padded to a full pulse period.
    pub fn sample_paced(&mut self) -> Result<u16> {
        let cycle_start = self.clock.now();
        let raw = self.sample_raw()?;
        self.clock.sleep_remainder(cycle_start, self.timing.period);
        trace!(raw, "pulse cycle");
        Ok(raw)
    }

    /// Integer mean of `count` paced conversions (truncating division).
    pub fn mean_raw(&mut self, count: NonZeroU16) -> Result<u16> {
        let mut total: u32 = 0;
        for _ in 0..count.get() {
            total += u32::from(self.sample_paced()?);
        }
        // Mean of u16 samples fits in u16.
        Ok((total / u32::from(count.get())) as u16)
    }

    #[inline]
    pub fn full_scale(&self) -> u32 {
        self.adc.full_scale()
    }

    #[inline]
    pub fn timing(&self) -> PulseTiming {
        self.timing
    }
}

impl<E, A, C> PulseSampler<E, A, C> {
    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Release the lines.
    pub fn into_parts(self) -> (E, A, C) {
        (self.emitter, self.adc, self.clock)
    }
}
