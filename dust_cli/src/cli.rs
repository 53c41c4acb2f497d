//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "dust", version, about = "Sharp GP2Y dust sensor CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/dust_config.toml")]
    pub config: PathBuf,

    /// Print readings and errors as JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Use the simulated sensor at this dust level (µg/m³)
    #[arg(long, value_name = "UG_M3", conflicts_with = "replay")]
    pub sim_dust: Option<f32>,

    /// Replay a recorded raw ADC trace (CSV with a single `raw` column)
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Take one density reading
    Read {
        /// Conversions averaged into the reading (overrides sensor.samples)
        #[arg(long, value_name = "N")]
        samples: Option<u16>,
    },
    /// Poll the sensor until interrupted or `--count` readings were printed
    Monitor {
        /// Reading period in ms (overrides poll.interval_ms)
        #[arg(long, value_name = "MS")]
        interval_ms: Option<u64>,
        /// Stop after this many readings
        #[arg(long, value_name = "N")]
        count: Option<u64>,
        /// Adopt baseline candidates as soon as they are ready
        #[arg(long, action = ArgAction::SetTrue)]
        auto_adopt: bool,
        /// Conversions averaged into each reading (overrides sensor.samples)
        #[arg(long, value_name = "N")]
        samples: Option<u16>,
    },
    /// Quick health check (backend present, reading in range)
    SelfCheck,
}
