use std::num::{NonZeroU16, NonZeroUsize};

use dust_core::mocks::bench;
use dust_core::{DensityWindow, DustSensor, RunningAverage, SensorModel};
use dust_traits::clock::test_clock::TestClock;
use proptest::prelude::*;

#[test]
fn sensor_window_tracks_each_reading() {
    let clock = TestClock::new();
    // 400 → 271 µg/m³, 123 → 0 µg/m³
    let (led, adc, _) = bench(clock.clone(), vec![400, 123]);
    let mut sensor = DustSensor::builder(SensorModel::Gp2y1014au0f)
        .with_emitter(led)
        .with_adc(adc)
        .with_clock(clock)
        .build()
        .unwrap();
    assert_eq!(sensor.running_average(), 0);
    assert_eq!(sensor.window().capacity(), 60);

    let one = NonZeroU16::new(1).unwrap();
    sensor.read_density(one).unwrap();
    assert_eq!(sensor.running_average(), 271);
    sensor.read_density(one).unwrap();
    // (271 + 0) / 2 = 135.5
    assert_eq!(sensor.running_average(), 136);
    assert_eq!(sensor.window_average(), Some(136));
    assert_eq!(sensor.window().filled(), 2);
}

#[test]
fn custom_capacity_evicts_oldest() {
    let clock = TestClock::new();
    let (led, adc, _) = bench(clock.clone(), vec![400, 123, 123]);
    let mut sensor = DustSensor::builder(SensorModel::Gp2y1014au0f)
        .with_emitter(led)
        .with_adc(adc)
        .with_clock(clock)
        .with_running_average(NonZeroUsize::new(2).unwrap())
        .build()
        .unwrap();
    let one = NonZeroU16::new(1).unwrap();
    for _ in 0..3 {
        sensor.read_density(one).unwrap();
    }
    assert_eq!(sensor.running_average(), 0);
}

#[test]
fn window_can_be_disabled() {
    let clock = TestClock::new();
    let (led, adc, _) = bench(clock.clone(), vec![400]);
    let mut sensor = DustSensor::builder(SensorModel::Gp2y1014au0f)
        .with_emitter(led)
        .with_adc(adc)
        .with_clock(clock)
        .without_running_average()
        .build()
        .unwrap();
    assert_eq!(sensor.read_density(NonZeroU16::new(1).unwrap()).unwrap(), 271);
    assert_eq!(sensor.window_average(), None);
}

proptest! {
    #[test]
    fn full_ring_averages_last_capacity_values(
        cap in 1usize..32,
        values in proptest::collection::vec(0u16..1000, 1..100),
    ) {
        let mut w = RunningAverage::new(NonZeroUsize::new(cap).unwrap());
        for &v in &values {
            w.record(v);
        }
        let tail = &values[values.len().saturating_sub(cap)..];
        let sum: u64 = tail.iter().map(|&v| u64::from(v)).sum();
        let n = tail.len() as u64;
        let expected = ((sum + n / 2) / n) as u16;
        prop_assert_eq!(w.average(), expected);
        prop_assert_eq!(w.filled(), tail.len());
    }
}
