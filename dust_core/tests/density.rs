use std::num::NonZeroU16;

use dust_core::mocks::{FailingAnalog, NoopEmitter, bench};
use dust_core::{DustError, DustSensor, SensorModel};
use dust_traits::clock::test_clock::TestClock;
use proptest::prelude::*;
use rstest::rstest;

fn one() -> NonZeroU16 {
    NonZeroU16::new(1).unwrap()
}

/// Density a fresh GP2Y1014 sensor reports for a single conversion `raw`.
fn density_for(raw: u16) -> u16 {
    let clock = TestClock::new();
    let (led, adc, _) = bench(clock.clone(), vec![raw]);
    let mut sensor = DustSensor::builder(SensorModel::Gp2y1014au0f)
        .with_emitter(led)
        .with_adc(adc)
        .with_clock(clock)
        .build()
        .unwrap();
    sensor.read_density(one()).unwrap()
}

#[rstest]
#[case(123, 0)] // 0.6006 V, just above the 0.6 V baseline
#[case(400, 271)] // 1.953 V
#[case(0, 0)]
#[case(1023, 879)] // 4.995 V
fn ten_bit_five_volt_scenarios(#[case] raw: u16, #[case] density: u16) {
    assert_eq!(density_for(raw), density);
}

#[test]
fn reading_exposes_intermediates() {
    let clock = TestClock::new();
    let (led, adc, _) = bench(clock.clone(), vec![400]);
    let mut sensor = DustSensor::builder(SensorModel::Gp2y1014au0f)
        .with_emitter(led)
        .with_adc(adc)
        .with_clock(clock)
        .build()
        .unwrap();
    let r = sensor.read(one()).unwrap();
    assert_eq!(r.mean_raw, 400);
    assert!((r.voltage - 1.953_125).abs() < 1e-6);
    assert_eq!(r.density_ug_m3, 271);
}

#[test]
fn mean_uses_integer_division() {
    let clock = TestClock::new();
    let (led, adc, log) = bench(clock.clone(), vec![400, 401, 401]);
    let mut sensor = DustSensor::builder(SensorModel::Gp2y1014au0f)
        .with_emitter(led)
        .with_adc(adc)
        .with_clock(clock)
        .build()
        .unwrap();
    let r = sensor.read(NonZeroU16::new(3).unwrap()).unwrap();
    // 1202 / 3 = 400.67 truncates to 400
    assert_eq!(r.mean_raw, 400);
    assert_eq!(log.conversions(), 3);
}

#[test]
fn default_reading_takes_twenty_conversions() {
    let clock = TestClock::new();
    let (led, adc, log) = bench(clock.clone(), vec![200]);
    let mut sensor = DustSensor::builder(SensorModel::Gp2y1014au0f)
        .with_emitter(led)
        .with_adc(adc)
        .with_clock(clock)
        .build()
        .unwrap();
    sensor.read_density_default().unwrap();
    assert_eq!(log.conversions(), 20);
}

#[test]
fn model_typical_baseline_applies() {
    // 1010 variant: typical zero is 0.9 V. raw 200 = 0.977 V → 15 µg/m³.
    let clock = TestClock::new();
    let (led, adc, _) = bench(clock.clone(), vec![200]);
    let mut sensor = DustSensor::builder(SensorModel::Gp2y1010au0f)
        .with_emitter(led)
        .with_adc(adc)
        .with_clock(clock)
        .build()
        .unwrap();
    assert_eq!(sensor.baseline(), 0.9);
    assert_eq!(sensor.read_density(one()).unwrap(), 15);
}

#[test]
fn sensitivity_and_calibration_factor_are_applied() {
    let clock = TestClock::new();
    let (led, adc, _) = bench(clock.clone(), vec![400]);
    let mut sensor = DustSensor::builder(SensorModel::Gp2y1014au0f)
        .with_emitter(led)
        .with_adc(adc)
        .with_clock(clock)
        .build()
        .unwrap();
    assert_eq!(sensor.sensitivity(), 0.5);
    assert_eq!(sensor.calibration_factor(), 1.0);

    sensor.set_sensitivity(0.25);
    // (1.953125 - 0.6) / 0.25 * 100 = 541.25
    assert_eq!(sensor.read_density(one()).unwrap(), 541);

    sensor.set_sensitivity(0.5);
    sensor.set_calibration_factor(0.5);
    // 0.9765625 V → (0.3765625 / 0.5) * 100 = 75.3
    assert_eq!(sensor.read_density(one()).unwrap(), 75);
}

#[test]
fn operator_baseline_shifts_the_zero_point() {
    let clock = TestClock::new();
    let (led, adc, _) = bench(clock.clone(), vec![400]);
    let mut sensor = DustSensor::builder(SensorModel::Gp2y1014au0f)
        .with_emitter(led)
        .with_adc(adc)
        .with_clock(clock)
        .with_baseline(0.4)
        .build()
        .unwrap();
    assert_eq!(sensor.baseline(), 0.4);
    // (1.953125 - 0.4) / 0.5 * 100 = 310.6
    assert_eq!(sensor.read_density(one()).unwrap(), 311);

    // Out-of-profile overrides are accepted as given.
    sensor.set_baseline(2.5);
    assert_eq!(sensor.baseline(), 2.5);
    assert_eq!(sensor.read_density(one()).unwrap(), 0);
}

#[test]
fn adc_failure_surfaces_as_hardware_error() {
    let mut sensor = DustSensor::builder(SensorModel::Gp2y1014au0f)
        .with_emitter(NoopEmitter)
        .with_adc(FailingAnalog)
        .with_clock(TestClock::new())
        .build()
        .unwrap();
    let err = sensor.read_density(one()).expect_err("adc fails");
    match err.downcast_ref::<DustError>() {
        Some(DustError::Hardware(msg)) => assert!(msg.contains("adc conversion failed")),
        other => panic!("expected DustError::Hardware, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn at_or_below_baseline_reads_zero(raw in 0u16..=200) {
        // raw 200 is exactly 0.9765625 V
        let clock = TestClock::new();
        let (led, adc, _) = bench(clock.clone(), vec![raw]);
        let mut sensor = DustSensor::builder(SensorModel::Gp2y1014au0f)
            .with_emitter(led)
            .with_adc(adc)
            .with_clock(clock)
            .with_baseline(0.976_562_5)
            .build()
            .unwrap();
        prop_assert_eq!(sensor.read_density(one()).unwrap(), 0);
    }

    #[test]
    fn density_is_monotonic_in_raw(a in 0u16..1024, b in 0u16..1024) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(density_for(lo) <= density_for(hi));
    }
}
