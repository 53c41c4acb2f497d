pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Digital output line powering the sensor's IR emitter.
///
/// Implementations own the electrical polarity: `on()` always lights the
/// emitter, whatever level that takes on the wire.
pub trait Emitter {
    fn on(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn off(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Analog input line connected to the sensor's Vo output.
pub trait AnalogInput {
    /// One quantized conversion in `0..full_scale()`.
    fn read(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>>;

    /// Converter resolution in bits (10 for the common 10-bit ADCs).
    fn resolution_bits(&self) -> u8 {
        10
    }

    /// Number of distinct codes, e.g. 1024 for a 10-bit converter.
    fn full_scale(&self) -> u32 {
        1u32 << u32::from(self.resolution_bits())
    }
}

impl<T: Emitter + ?Sized> Emitter for Box<T> {
    fn on(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).on()
    }
    fn off(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).off()
    }
}

impl<T: AnalogInput + ?Sized> AnalogInput for Box<T> {
    fn read(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read()
    }
    fn resolution_bits(&self) -> u8 {
        (**self).resolution_bits()
    }
}
