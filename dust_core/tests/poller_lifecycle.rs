//! Background poller: delivery, baseline adoption, error counting, shutdown.

use std::num::NonZeroU16;
use std::time::{Duration, Instant};

use dust_core::mocks::{FailingAnalog, NoopEmitter};
use dust_core::{DustSensor, PollCfg, PollReading, Poller, SensorModel};
use dust_hardware::sim::{ReplayAnalog, SimParams, SimulatedSensor};
use dust_traits::clock::test_clock::TestClock;

const WAIT: Duration = Duration::from_secs(2);

fn cfg(auto_adopt_baseline: bool) -> PollCfg {
    PollCfg {
        interval: Duration::from_millis(1000),
        samples: NonZeroU16::new(1).unwrap(),
        auto_adopt_baseline,
    }
}

fn collect(p: &Poller, n: usize) -> Vec<PollReading> {
    (0..n)
        .map(|i| {
            p.recv_timeout(WAIT)
                .unwrap_or_else(|| panic!("reading {i} not delivered"))
        })
        .collect()
}

#[test]
fn delivers_sequenced_readings() {
    let (led, adc) = SimulatedSensor::new(SimParams::default())
        .with_dust(100.0)
        .split();
    let clock = TestClock::new();
    let sensor = DustSensor::builder(SensorModel::Gp2y1014au0f)
        .with_emitter(led)
        .with_adc(adc)
        .with_clock(clock.clone())
        .build()
        .unwrap();
    let poller = Poller::spawn(sensor, cfg(false), clock);

    let readings = collect(&poller, 5);
    for (i, r) in readings.iter().enumerate() {
        assert_eq!(r.seq, i as u64);
        // 1.1 V at the sensor → code 225 → 1.0986 V → ~100 µg/m³
        assert_eq!(r.mean_raw, 225);
        assert_eq!(r.density_ug_m3, 100);
        assert_eq!(r.average_ug_m3, Some(100));
        assert_eq!(r.baseline_v, 0.6);
        assert_eq!(r.adopted_baseline_v, None);
    }
}

#[test]
fn auto_adopts_the_first_ready_candidate() {
    let adc = ReplayAnalog::new(vec![110, 95, 130, 102], 10).unwrap();
    let clock = TestClock::new();
    let sensor = DustSensor::builder(SensorModel::Gp2y1014au0f)
        .with_emitter(NoopEmitter)
        .with_adc(adc)
        .with_clock(clock.clone())
        .without_running_average()
        .build()
        .unwrap();
    let poller = Poller::spawn(sensor, cfg(true), clock);

    let readings = collect(&poller, 12);
    let min_v = 95.0f32 * (5.0 / 1024.0);
    for r in &readings[..10] {
        assert_eq!(r.adopted_baseline_v, None);
        assert_eq!(r.baseline_v, 0.6);
        assert_eq!(r.average_ug_m3, None);
    }
    assert_eq!(readings[10].adopted_baseline_v, Some(min_v));
    assert_eq!(readings[10].baseline_v, min_v);
    assert_eq!(readings[11].adopted_baseline_v, None);
    assert_eq!(readings[11].baseline_v, min_v);
}

#[test]
fn failed_readings_are_counted_not_published() {
    let clock = TestClock::new();
    let sensor = DustSensor::builder(SensorModel::Gp2y1014au0f)
        .with_emitter(NoopEmitter)
        .with_adc(FailingAnalog)
        .with_clock(clock.clone())
        .build()
        .unwrap();
    let poller = Poller::spawn(sensor, cfg(false), clock);

    let deadline = Instant::now() + WAIT;
    while poller.read_errors() < 3 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(poller.read_errors() >= 3);
    assert!(poller.latest().is_none());
}

#[test]
fn drop_joins_a_real_time_poller_promptly() {
    let (led, adc) = SimulatedSensor::new(SimParams::default()).split();
    let sensor = DustSensor::builder(SensorModel::Gp2y1014au0f)
        .with_emitter(led)
        .with_adc(adc)
        .build()
        .unwrap();
    let poller = Poller::spawn(
        sensor,
        PollCfg {
            interval: Duration::from_secs(60),
            ..cfg(false)
        },
        dust_traits::MonotonicClock::new(),
    );
    assert!(poller.recv_timeout(WAIT).is_some());

    let started = Instant::now();
    drop(poller);
    assert!(started.elapsed() < Duration::from_secs(1));
}
