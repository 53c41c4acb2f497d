use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("spi error: {0}")]
    Spi(String),
    #[error("mcp3008 has no channel {0} (valid: 0..=7)")]
    InvalidChannel(u8),
    #[error("replay trace is empty")]
    EmptyTrace,
    #[error("replay trace sample {index} is {raw}, beyond the {full_scale}-code converter")]
    InvalidTrace {
        index: usize,
        raw: u16,
        full_scale: u32,
    },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
