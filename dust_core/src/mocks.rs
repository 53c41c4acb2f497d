//! Test and helper mocks for dust_core.
//!
//! `bench()` wires a scripted ADC and a recording emitter to one shared
//! [`LineLog`], timestamped with the caller's clock, so tests can check the
//! pulse protocol against virtual time.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use dust_traits::{AnalogInput, Clock, Emitter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent {
    EmitterOn,
    EmitterOff,
    Conversion(u16),
}

/// Shared, ordered record of line activity.
#[derive(Debug, Clone, Default)]
pub struct LineLog {
    events: Arc<Mutex<Vec<(Instant, LineEvent)>>>,
}

impl LineLog {
    fn push(&self, at: Instant, ev: LineEvent) {
        if let Ok(mut v) = self.events.lock() {
            v.push((at, ev));
        }
    }

    pub fn events(&self) -> Vec<(Instant, LineEvent)> {
        self.events.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn conversions(&self) -> usize {
        self.events()
            .iter()
            .filter(|(_, e)| matches!(e, LineEvent::Conversion(_)))
            .count()
    }
}

pub struct RecordingEmitter<C> {
    clock: C,
    log: LineLog,
}

impl<C: Clock> Emitter for RecordingEmitter<C> {
    fn on(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.log.push(self.clock.now(), LineEvent::EmitterOn);
        Ok(())
    }

    fn off(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.log.push(self.clock.now(), LineEvent::EmitterOff);
        Ok(())
    }
}

/// ADC returning a fixed script of codes, repeating the last one when the
/// script runs out.
pub struct ScriptedAnalog<C> {
    clock: C,
    log: LineLog,
    script: Vec<u16>,
    next: usize,
    resolution_bits: u8,
}

impl<C> ScriptedAnalog<C> {
    pub fn with_resolution(mut self, bits: u8) -> Self {
        self.resolution_bits = bits;
        self
    }
}

impl<C: Clock> AnalogInput for ScriptedAnalog<C> {
    fn read(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        let idx = self.next.min(self.script.len().saturating_sub(1));
        let raw = self.script.get(idx).copied().unwrap_or(0);
        self.next = self.next.saturating_add(1);
        self.log.push(self.clock.now(), LineEvent::Conversion(raw));
        Ok(raw)
    }

    fn resolution_bits(&self) -> u8 {
        self.resolution_bits
    }
}

/// Build a recording emitter and a 10-bit scripted ADC sharing one log.
pub fn bench<C: Clock + Clone>(
    clock: C,
    script: Vec<u16>,
) -> (RecordingEmitter<C>, ScriptedAnalog<C>, LineLog) {
    let log = LineLog::default();
    (
        RecordingEmitter {
            clock: clock.clone(),
            log: log.clone(),
        },
        ScriptedAnalog {
            clock,
            log: log.clone(),
            script,
            next: 0,
            resolution_bits: 10,
        },
        log,
    )
}

/// An ADC whose every conversion fails; for error-path tests.
pub struct FailingAnalog;

impl AnalogInput for FailingAnalog {
    fn read(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("adc conversion failed")))
    }
}

/// An emitter that accepts every command and records nothing.
#[derive(Debug, Default)]
pub struct NoopEmitter;

impl Emitter for NoopEmitter {
    fn on(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }

    fn off(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}
