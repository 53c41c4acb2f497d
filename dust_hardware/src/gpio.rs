//! GPIO-driven emitter line (Raspberry Pi via rppal).

use crate::error::{HwError, Result};
use rppal::gpio::{Gpio, OutputPin};
use tracing::debug;

/// IR LED enable line. GP2Y modules light the LED when the pin is pulled
/// low, so `active_low` defaults to true in the config.
pub struct GpioEmitter {
    pin: OutputPin,
    active_low: bool,
}

impl GpioEmitter {
    pub fn new(pin: u8, active_low: bool) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(format!("open gpio: {e}")))?;
        let mut pin = gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(format!("open led pin {pin}: {e}")))?
            .into_output();
        // Start dark.
        if active_low {
            pin.set_high();
        } else {
            pin.set_low();
        }
        debug!(pin = pin.pin(), active_low, "emitter pin bound as output");
        Ok(Self { pin, active_low })
    }

    fn drive(&mut self, lit: bool) {
        if lit != self.active_low {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
    }
}

impl dust_traits::Emitter for GpioEmitter {
    fn on(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.drive(true);
        Ok(())
    }

    fn off(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.drive(false);
        Ok(())
    }
}
