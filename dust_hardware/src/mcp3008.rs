//! MCP3008 10-bit SPI ADC.
//!
//! The Raspberry Pi has no analog inputs, so the GP2Y Vo line is wired to an
//! MCP3008 channel. Frame encoding and decoding are plain functions so they can
//! be exercised without a bus.

use crate::error::{HwError, Result};

/// Number of single-ended input channels.
pub const CHANNELS: u8 = 8;
/// Converter resolution in bits.
pub const RESOLUTION_BITS: u8 = 10;
/// SPI clock used for conversions (datasheet max is 1.35 MHz at 2.7 V).
pub const SPI_CLOCK_HZ: u32 = 1_000_000;

/// Build the 3-byte request for a single-ended conversion on `channel`.
///
/// Byte 0 carries the start bit; byte 1 carries SGL/DIFF=1 and the channel
/// select bits D2..D0 in its upper nibble.
pub fn request_frame(channel: u8) -> Result<[u8; 3]> {
    if channel >= CHANNELS {
        return Err(HwError::InvalidChannel(channel));
    }
    Ok([0x01, (0x08 | channel) << 4, 0x00])
}

/// Extract the 10-bit result from the bytes clocked back during a request.
#[inline]
pub fn decode_frame(rx: &[u8; 3]) -> u16 {
    (u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2])
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use device::Mcp3008;

#[cfg(all(feature = "hardware", target_os = "linux"))]
mod device {
    use super::{RESOLUTION_BITS, SPI_CLOCK_HZ, decode_frame, request_frame};
    use crate::error::{HwError, Result};
    use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
    use tracing::{debug, trace};

    pub struct Mcp3008 {
        spi: Spi,
        request: [u8; 3],
    }

    impl Mcp3008 {
        pub fn new(bus: u8, chip_select: u8, channel: u8) -> Result<Self> {
            let request = request_frame(channel)?;
            let bus = match bus {
                0 => Bus::Spi0,
                1 => Bus::Spi1,
                2 => Bus::Spi2,
                other => return Err(HwError::Spi(format!("unsupported spi bus {other}"))),
            };
            let ss = match chip_select {
                0 => SlaveSelect::Ss0,
                1 => SlaveSelect::Ss1,
                2 => SlaveSelect::Ss2,
                other => {
                    return Err(HwError::Spi(format!("unsupported chip select {other}")));
                }
            };
            let spi = Spi::new(bus, ss, SPI_CLOCK_HZ, Mode::Mode0)
                .map_err(|e| HwError::Spi(format!("open spi: {e}")))?;
            debug!(?bus, ?ss, channel, "mcp3008 ready");
            Ok(Self { spi, request })
        }

        pub fn read_raw(&mut self) -> Result<u16> {
            let mut rx = [0u8; 3];
            self.spi
                .transfer(&mut rx, &self.request)
                .map_err(|e| HwError::Spi(e.to_string()))?;
            let raw = decode_frame(&rx);
            trace!(raw, "mcp3008 conversion");
            Ok(raw)
        }
    }

    impl dust_traits::AnalogInput for Mcp3008 {
        fn read(&mut self) -> std::result::Result<u16, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.read_raw()?)
        }

        fn resolution_bits(&self) -> u8 {
            RESOLUTION_BITS
        }
    }
}
