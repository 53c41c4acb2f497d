//! Subcommand execution: config mapping, sensor assembly, and output.

use std::num::NonZeroU16;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use dust_core::{
    BuildError, DensityWindow, DustError, DustReading, DustSensor, PollCfg, PollReading, Poller,
    SensorCfg,
};
use dust_traits::MonotonicClock;
use serde_json::json;

use crate::backend::{self, AnalogBox, BackendKind, EmitterBox};
use crate::cli::{Cli, Commands};

type CliSensor<W> = DustSensor<EmitterBox, AnalogBox, MonotonicClock, W>;

/// How long the monitor loop waits for a reading before rechecking Ctrl-C.
const RECV_SLICE: Duration = Duration::from_millis(100);

pub fn run(cli: &Cli, cfg: &dust_config::Config, shutdown: Arc<AtomicBool>) -> eyre::Result<()> {
    let sensor_cfg = SensorCfg::try_from(&cfg.sensor)?;
    let lines = backend::open(cfg, cli.sim_dust, cli.replay.as_deref())?;
    let kind = lines.kind;

    let builder = DustSensor::builder(sensor_cfg.model)
        .with_emitter(lines.emitter)
        .with_adc(lines.adc)
        .with_config(&sensor_cfg);
    // The window decides the sensor type, so each arm gets its own instance.
    match sensor_cfg.running_average {
        Some(n) => dispatch(
            builder.with_running_average(n).build()?,
            cli,
            cfg,
            &sensor_cfg,
            kind,
            shutdown,
        ),
        None => dispatch(
            builder.without_running_average().build()?,
            cli,
            cfg,
            &sensor_cfg,
            kind,
            shutdown,
        ),
    }
}

fn dispatch<W: DensityWindow + Send + 'static>(
    mut sensor: CliSensor<W>,
    cli: &Cli,
    cfg: &dust_config::Config,
    sensor_cfg: &SensorCfg,
    kind: BackendKind,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<()> {
    sensor.begin()?;
    tracing::debug!(?sensor, backend = kind.name(), "sensor assembled");

    match &cli.cmd {
        Commands::Read { samples } => {
            let n = samples_or(*samples, sensor_cfg.samples)?;
            let r = sensor.read(n)?;
            print_reading(cli.json, &r, sensor.baseline());
            Ok(())
        }
        Commands::Monitor {
            interval_ms,
            count,
            auto_adopt,
            samples,
        } => {
            let mut poll = PollCfg::try_from(cfg)?;
            if let Some(ms) = *interval_ms {
                if ms == 0 {
                    return Err(BuildError::InvalidConfig("--interval-ms must be >= 1").into());
                }
                poll.interval = Duration::from_millis(ms);
            }
            poll.samples = samples_or(*samples, poll.samples)?;
            poll.auto_adopt_baseline |= *auto_adopt;
            monitor(sensor, poll, *count, cli.json, &shutdown)
        }
        Commands::SelfCheck => self_check(&mut sensor, sensor_cfg.samples, kind, cli.json),
    }
}

fn samples_or(flag: Option<u16>, default: NonZeroU16) -> eyre::Result<NonZeroU16> {
    match flag {
        None => Ok(default),
        Some(n) => NonZeroU16::new(n)
            .ok_or_else(|| BuildError::InvalidConfig("--samples must be >= 1").into()),
    }
}

fn print_reading(json: bool, r: &DustReading, baseline_v: f32) {
    if json {
        println!(
            "{}",
            json!({
                "density_ug_m3": r.density_ug_m3,
                "voltage": r.voltage,
                "mean_raw": r.mean_raw,
                "baseline_v": baseline_v,
            })
        );
    } else {
        println!(
            "{} µg/m³ (raw {}, {:.3} V, baseline {:.3} V)",
            r.density_ug_m3, r.mean_raw, r.voltage, baseline_v
        );
    }
}

fn print_poll(json: bool, r: &PollReading) {
    if json {
        println!(
            "{}",
            json!({
                "seq": r.seq,
                "density_ug_m3": r.density_ug_m3,
                "average_ug_m3": r.average_ug_m3,
                "voltage": r.voltage,
                "mean_raw": r.mean_raw,
                "baseline_v": r.baseline_v,
                "adopted_baseline_v": r.adopted_baseline_v,
            })
        );
        return;
    }
    let avg = r
        .average_ug_m3
        .map(|a| format!(", avg {a} µg/m³"))
        .unwrap_or_default();
    println!(
        "#{} {} µg/m³{} (raw {}, {:.3} V)",
        r.seq, r.density_ug_m3, avg, r.mean_raw, r.voltage
    );
    if let Some(v) = r.adopted_baseline_v {
        println!("baseline adopted: {v:.3} V");
    }
}

fn monitor<W: DensityWindow + Send + 'static>(
    sensor: CliSensor<W>,
    poll: PollCfg,
    count: Option<u64>,
    json: bool,
    shutdown: &AtomicBool,
) -> eyre::Result<()> {
    tracing::info!(
        interval_ms = poll.interval.as_millis() as u64,
        samples = poll.samples.get(),
        auto_adopt = poll.auto_adopt_baseline,
        "monitor start"
    );
    let poller = Poller::spawn(sensor, poll, MonotonicClock::new());
    let mut printed: u64 = 0;
    while count.is_none_or(|c| printed < c) {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!("interrupted");
            break;
        }
        if let Some(r) = poller.recv_timeout(RECV_SLICE) {
            print_poll(json, &r);
            printed += 1;
        }
    }
    let (errors, dropped) = (poller.read_errors(), poller.dropped());
    drop(poller);
    tracing::info!(readings = printed, errors, dropped, "monitor stop");
    if printed == 0 && errors > 0 {
        return Err(DustError::Hardware(format!("all {errors} readings failed")).into());
    }
    Ok(())
}

fn self_check<W: DensityWindow>(
    sensor: &mut CliSensor<W>,
    samples: NonZeroU16,
    kind: BackendKind,
    json: bool,
) -> eyre::Result<()> {
    let r = sensor.read(samples)?;
    let full_scale = sensor.adc_full_scale();
    if r.mean_raw == 0 {
        return Err(DustError::HardwareFault(
            "adc reads 0 V with the emitter lit; Vo is not connected".into(),
        )
        .into());
    }
    if u32::from(r.mean_raw) + 1 >= full_scale {
        return Err(DustError::HardwareFault(
            "adc is saturated; check the reference voltage and Vo wiring".into(),
        )
        .into());
    }
    if json {
        println!(
            "{}",
            json!({
                "status": "ok",
                "backend": kind.name(),
                "model": sensor.model().name(),
                "mean_raw": r.mean_raw,
                "voltage": r.voltage,
            })
        );
    } else {
        println!(
            "OK: {} backend, {} (raw {}, {:.3} V)",
            kind.name(),
            sensor.model(),
            r.mean_raw,
            r.voltage
        );
    }
    Ok(())
}
