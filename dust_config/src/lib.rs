#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and raw-trace parsing for the dust sensor.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The raw-trace CSV loader enforces its header and rejects empty traces.
use serde::Deserialize;

/// Raw trace CSV schema (one ADC code per row).
///
/// Expected headers:
/// raw
///
/// Example:
/// raw
/// 123
/// 131
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct RawTraceRow {
    pub raw: u16,
}

/// Supported Sharp sensor variants.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SensorModel {
    Gp2y1010au0f,
    #[default]
    Gp2y1014au0f,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Sensor {
    pub model: SensorModel,
    /// ADC reference voltage in volts
    pub reference_voltage: f32,
    /// Raw conversions averaged per density reading
    pub samples: u16,
    /// Running-average window length in readings (0 disables)
    pub running_average: usize,
    /// Volts per 100 µg/m³; the datasheet typical is used when absent
    pub sensitivity: Option<f32>,
    /// Multiplicative voltage correction against a reference instrument
    pub calibration_factor: Option<f32>,
    /// Operator-chosen zero-dust voltage; the model's typical value when absent
    pub baseline_v: Option<f32>,
}

impl Default for Sensor {
    fn default() -> Self {
        Self {
            model: SensorModel::default(),
            reference_voltage: 5.0,
            samples: 20,
            running_average: 60,
            sensitivity: None,
            calibration_factor: None,
            baseline_v: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pins {
    /// GPIO driving the IR LED
    pub led: u8,
    /// LED lights when the pin is low (true for stock GP2Y wiring)
    #[serde(default = "default_true")]
    pub led_active_low: bool,
    /// MCP3008 input channel wired to Vo
    #[serde(default)]
    pub adc_channel: u8,
    #[serde(default)]
    pub spi_bus: u8,
    #[serde(default)]
    pub spi_cs: u8,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Adc {
    pub resolution_bits: u8,
}

impl Default for Adc {
    fn default() -> Self {
        Self {
            resolution_bits: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Poll {
    /// Period between density readings in `monitor` (ms)
    pub interval_ms: u64,
    /// Adopt a ready baseline candidate without operator action
    pub auto_adopt_baseline: bool,
}

impl Default for Poll {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            auto_adopt_baseline: false,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub sensor: Sensor,
    pub pins: Pins,
    #[serde(default)]
    pub adc: Adc,
    #[serde(default)]
    pub poll: Poll,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

pub fn load_raw_trace_csv(path: &std::path::Path) -> eyre::Result<Vec<u16>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open raw trace CSV {:?}: {}", path, e))?;

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<&str> = headers.iter().collect();
    if actual != ["raw"] {
        eyre::bail!(
            "raw trace CSV must have the single header 'raw', got: {}",
            actual.join(",")
        );
    }

    let mut trace = Vec::new();
    for (idx, rec) in rdr.deserialize::<RawTraceRow>().enumerate() {
        match rec {
            Ok(row) => trace.push(row.raw),
            Err(e) => eyre::bail!("invalid CSV row {}: {}", idx + 2, e),
        }
    }
    if trace.is_empty() {
        eyre::bail!("raw trace CSV {:?} has no samples", path);
    }
    Ok(trace)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sensor
        let s = &self.sensor;
        if s.samples == 0 {
            eyre::bail!("sensor.samples must be >= 1");
        }
        if !(s.reference_voltage.is_finite() && s.reference_voltage > 0.0) {
            eyre::bail!("sensor.reference_voltage must be > 0");
        }
        if s.running_average > 24 * 60 * 60 {
            eyre::bail!("sensor.running_average is unreasonably large (>86400 readings)");
        }
        if let Some(sens) = s.sensitivity
            && !(sens.is_finite() && sens > 0.0)
        {
            eyre::bail!("sensor.sensitivity must be > 0");
        }
        if let Some(k) = s.calibration_factor
            && !(k.is_finite() && k > 0.0)
        {
            eyre::bail!("sensor.calibration_factor must be > 0");
        }
        if let Some(v) = s.baseline_v
            && !v.is_finite()
        {
            eyre::bail!("sensor.baseline_v must be a finite voltage");
        }

        // Pins
        if self.pins.adc_channel > 7 {
            eyre::bail!("pins.adc_channel must be in 0..=7");
        }

        // ADC
        if !(8..=16).contains(&self.adc.resolution_bits) {
            eyre::bail!("adc.resolution_bits must be in 8..=16");
        }

        // Poll
        if self.poll.interval_ms == 0 {
            eyre::bail!("poll.interval_ms must be >= 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
