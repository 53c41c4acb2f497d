//! Sensor line backends: simulated, replayed, and (with `hardware`) rppal
//! GPIO + MCP3008 on a Raspberry Pi.

pub mod error;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;
pub mod mcp3008;
pub mod sim;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use gpio::GpioEmitter;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use mcp3008::Mcp3008;
pub use sim::{
    NullEmitter, ReplayAnalog, SimParams, SimulatedAnalog, SimulatedEmitter, SimulatedSensor,
};

#[cfg(test)]
mod tests {
    use super::*;
    use dust_traits::{AnalogInput, Emitter};

    #[test]
    fn simulated_adc_is_dark_without_emitter() {
        let (_emitter, mut adc) = SimulatedSensor::new(SimParams::default())
            .with_dust(100.0)
            .split();
        assert_eq!(adc.read().unwrap(), 0);
        assert_eq!(adc.dark_reads(), 1);
    }

    #[test]
    fn simulated_adc_tracks_dust_level() {
        let (mut emitter, mut adc) = SimulatedSensor::new(SimParams::default()).split();
        emitter.on().unwrap();
        let clean = adc.read().unwrap();
        adc.set_dust(200.0);
        let dusty = adc.read().unwrap();
        emitter.off().unwrap();
        // 0.6 V -> 123, 1.6 V -> 328 on a 5 V 10-bit scale
        assert_eq!(clean, 123);
        assert_eq!(dusty, 328);
    }
}
