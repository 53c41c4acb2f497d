//! Simulated and replayed sensor backends.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use dust_traits::{AnalogInput, Emitter};
use tracing::trace;

use crate::error::{HwError, Result};

/// Electrical model of a GP2Y module for runs without hardware.
///
/// Vo = zero_v + dust / 100 * sensitivity while the LED is lit; a dark
/// photodiode reads close to 0 V.
#[derive(Debug, Clone, Copy)]
pub struct SimParams {
    pub zero_v: f32,
    pub sensitivity: f32,
    pub v_ref: f32,
    pub resolution_bits: u8,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            zero_v: 0.6,
            sensitivity: 0.5,
            v_ref: 5.0,
            resolution_bits: 10,
        }
    }
}

#[derive(Debug)]
struct Shared {
    lit: AtomicBool,
    dust_bits: AtomicU32,
    dark_reads: AtomicU64,
}

/// Builds a connected emitter/ADC pair: the ADC only sees the dust signal
/// while the emitter is on.
pub struct SimulatedSensor {
    params: SimParams,
    shared: Arc<Shared>,
}

impl SimulatedSensor {
    pub fn new(params: SimParams) -> Self {
        Self {
            params,
            shared: Arc::new(Shared {
                lit: AtomicBool::new(false),
                dust_bits: AtomicU32::new(0f32.to_bits()),
                dark_reads: AtomicU64::new(0),
            }),
        }
    }

    pub fn with_dust(self, ug_m3: f32) -> Self {
        self.shared.dust_bits.store(ug_m3.to_bits(), Ordering::Relaxed);
        self
    }

    pub fn split(self) -> (SimulatedEmitter, SimulatedAnalog) {
        (
            SimulatedEmitter {
                shared: self.shared.clone(),
            },
            SimulatedAnalog {
                params: self.params,
                shared: self.shared,
            },
        )
    }
}

pub struct SimulatedEmitter {
    shared: Arc<Shared>,
}

impl SimulatedEmitter {
    pub fn is_lit(&self) -> bool {
        self.shared.lit.load(Ordering::Relaxed)
    }
}

impl Emitter for SimulatedEmitter {
    fn on(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.shared.lit.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn off(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.shared.lit.store(false, Ordering::Relaxed);
        Ok(())
    }
}

pub struct SimulatedAnalog {
    params: SimParams,
    shared: Arc<Shared>,
}

impl SimulatedAnalog {
    /// Change the simulated particulate level (µg/m³).
    pub fn set_dust(&self, ug_m3: f32) {
        self.shared.dust_bits.store(ug_m3.to_bits(), Ordering::Relaxed);
    }

    pub fn dust(&self) -> f32 {
        f32::from_bits(self.shared.dust_bits.load(Ordering::Relaxed))
    }

    /// Conversions taken while the emitter was off.
    pub fn dark_reads(&self) -> u64 {
        self.shared.dark_reads.load(Ordering::Relaxed)
    }

    /// Raw code the model produces for a given output voltage.
    pub fn code_for_voltage(&self, volts: f32) -> u16 {
        let full_scale = (1u32 << u32::from(self.params.resolution_bits)) as f32;
        let code = (volts / self.params.v_ref * full_scale).round();
        code.clamp(0.0, full_scale - 1.0) as u16
    }
}

impl AnalogInput for SimulatedAnalog {
    fn read(&mut self) -> std::result::Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        if !self.shared.lit.load(Ordering::Relaxed) {
            self.shared.dark_reads.fetch_add(1, Ordering::Relaxed);
            return Ok(0);
        }
        let volts = self.params.zero_v + self.dust().max(0.0) / 100.0 * self.params.sensitivity;
        let raw = self.code_for_voltage(volts);
        trace!(raw, volts, "simulated conversion");
        Ok(raw)
    }

    fn resolution_bits(&self) -> u8 {
        self.params.resolution_bits
    }
}

/// Replays a recorded raw trace, wrapping around at the end.
///
/// Every code must fit the converter: `raw < 1 << resolution_bits`.
#[derive(Debug, Clone)]
pub struct ReplayAnalog {
    trace: Vec<u16>,
    next: usize,
    resolution_bits: u8,
}

impl ReplayAnalog {
    pub fn new(trace: Vec<u16>, resolution_bits: u8) -> Result<Self> {
        if trace.is_empty() {
            return Err(HwError::EmptyTrace);
        }
        let full_scale = 1u32
            .checked_shl(u32::from(resolution_bits))
            .unwrap_or(u32::MAX);
        if let Some((index, &raw)) = trace
            .iter()
            .enumerate()
            .find(|(_, raw)| u32::from(**raw) >= full_scale)
        {
            return Err(HwError::InvalidTrace {
                index,
                raw,
                full_scale,
            });
        }
        Ok(Self {
            trace,
            next: 0,
            resolution_bits,
        })
    }
}

impl AnalogInput for ReplayAnalog {
    fn read(&mut self) -> std::result::Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        let raw = self.trace[self.next];
        self.next = (self.next + 1) % self.trace.len();
        Ok(raw)
    }

    fn resolution_bits(&self) -> u8 {
        self.resolution_bits
    }
}

/// Emitter that only remembers its state; pairs with `ReplayAnalog`.
#[derive(Debug, Default)]
pub struct NullEmitter {
    lit: bool,
}

impl NullEmitter {
    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

impl Emitter for NullEmitter {
    fn on(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.lit = true;
        Ok(())
    }

    fn off(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.lit = false;
        Ok(())
    }
}
