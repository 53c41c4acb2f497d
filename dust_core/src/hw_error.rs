//! Maps `Box<dyn Error>` from the line traits to typed `DustError`.
//!
//! The traits in `dust_traits` use `Box<dyn Error + Send + Sync>` so any
//! backend can plug in; this module converts those to our typed error enum,
//! with an optional feature-gated path for `dust_hardware::HwError` downcasting.

use crate::error::DustError;

/// Map a trait-boundary error to a typed `DustError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> DustError {
    #[cfg(feature = "hardware-errors")]
    {
        use dust_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Gpio(_) | HwError::Spi(_) => DustError::HardwareFault(hw.to_string()),
                HwError::InvalidChannel(_)
                | HwError::EmptyTrace
                | HwError::InvalidTrace { .. } => {
                    DustError::Config(hw.to_string())
                }
                HwError::Io(_) => DustError::Hardware(hw.to_string()),
            };
        }
    }

    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("gpio") || lower.contains("spi") {
        DustError::HardwareFault(s)
    } else {
        DustError::Hardware(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hw_errors_are_classified() {
        use dust_hardware::error::HwError;
        let spi = HwError::Spi("bus busy".into());
        assert!(matches!(map_hw_error(&spi), DustError::HardwareFault(_)));
        let ch = HwError::InvalidChannel(9);
        assert!(matches!(map_hw_error(&ch), DustError::Config(_)));
        let trace = HwError::InvalidTrace {
            index: 2,
            raw: 5000,
            full_scale: 1024,
        };
        assert!(matches!(map_hw_error(&trace), DustError::Config(_)));
    }

    #[test]
    fn unknown_errors_fall_back_to_message() {
        let io = std::io::Error::other("adc line stuck");
        match map_hw_error(&io) {
            DustError::Hardware(msg) => assert!(msg.contains("adc line stuck")),
            other => panic!("unexpected mapping: {other:?}"),
        }
        let gpio = std::io::Error::other("gpio export failed");
        assert!(matches!(map_hw_error(&gpio), DustError::HardwareFault(_)));
    }
}
