//! Line backend assembly: replayed trace, Raspberry Pi hardware, or the
//! simulated sensor.

use std::path::Path;

use dust_core::SensorModel;
use dust_core::hw_error::map_hw_error;
use dust_hardware::sim::{NullEmitter, ReplayAnalog, SimParams, SimulatedSensor};
use dust_traits::{AnalogInput, Emitter};

pub type EmitterBox = Box<dyn Emitter + Send>;
pub type AnalogBox = Box<dyn AnalogInput + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Simulated,
    Replay,
    Hardware,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Simulated => "sim",
            BackendKind::Replay => "replay",
            BackendKind::Hardware => "hardware",
        }
    }
}

pub struct Lines {
    pub emitter: EmitterBox,
    pub adc: AnalogBox,
    pub kind: BackendKind,
}

/// Pick and open the backend.
///
/// `--replay` wins, then real hardware when built with `hardware` on Linux
/// (unless `--sim-dust` asks for the simulator), then the simulator.
pub fn open(
    cfg: &dust_config::Config,
    sim_dust: Option<f32>,
    replay: Option<&Path>,
) -> eyre::Result<Lines> {
    if let Some(path) = replay {
        let trace = dust_config::load_raw_trace_csv(path)?;
        tracing::info!(path = %path.display(), samples = trace.len(), "replaying raw trace");
        let adc =
            ReplayAnalog::new(trace, cfg.adc.resolution_bits).map_err(|e| map_hw_error(&e))?;
        return Ok(Lines {
            emitter: Box::new(NullEmitter::default()),
            adc: Box::new(adc),
            kind: BackendKind::Replay,
        });
    }

    #[cfg(all(feature = "hardware", target_os = "linux"))]
    if sim_dust.is_none() {
        return open_hardware(cfg);
    }

    Ok(open_simulated(cfg, sim_dust.unwrap_or(0.0)))
}

fn open_simulated(cfg: &dust_config::Config, dust_ug_m3: f32) -> Lines {
    let model = SensorModel::from(cfg.sensor.model);
    let params = SimParams {
        zero_v: model.profile().typ_zero_voltage(),
        sensitivity: cfg
            .sensor
            .sensitivity
            .unwrap_or(dust_core::calibration::DEFAULT_SENSITIVITY),
        v_ref: cfg.sensor.reference_voltage,
        resolution_bits: cfg.adc.resolution_bits,
    };
    tracing::info!(%model, dust_ug_m3, "using simulated sensor");
    let (emitter, adc) = SimulatedSensor::new(params).with_dust(dust_ug_m3).split();
    Lines {
        emitter: Box::new(emitter),
        adc: Box::new(adc),
        kind: BackendKind::Simulated,
    }
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn open_hardware(cfg: &dust_config::Config) -> eyre::Result<Lines> {
    use dust_hardware::{GpioEmitter, Mcp3008};
    use eyre::WrapErr;

    let pins = &cfg.pins;
    let emitter = GpioEmitter::new(pins.led, pins.led_active_low)
        .map_err(|e| map_hw_error(&e))
        .wrap_err_with(|| format!("open emitter pin {}", pins.led))?;
    let adc = Mcp3008::new(pins.spi_bus, pins.spi_cs, pins.adc_channel)
        .map_err(|e| map_hw_error(&e))
        .wrap_err("open mcp3008 adc")?;
    if cfg.adc.resolution_bits != adc.resolution_bits() {
        tracing::warn!(
            configured = cfg.adc.resolution_bits,
            actual = adc.resolution_bits(),
            "adc.resolution_bits ignored; MCP3008 is a 10-bit converter"
        );
    }
    Ok(Lines {
        emitter: Box::new(emitter),
        adc: Box::new(adc),
        kind: BackendKind::Hardware,
    })
}
