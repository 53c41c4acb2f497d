use std::num::NonZeroU16;
use std::time::{Duration, Instant};

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use dust_core::{Calibration, DustSensor, RunningAverage, SensorModel};
use dust_hardware::sim::{NullEmitter, ReplayAnalog};
use dust_traits::Clock;

/// Clock that never blocks, so the benchmark measures the arithmetic and
/// bookkeeping rather than the pulse pacing.
#[derive(Clone, Copy)]
struct NoSleepClock;

impl Clock for NoSleepClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, _d: Duration) {}
}

// Noisy clean-air trace around code 120 (~0.59 V).
fn synth_trace(n: usize, seed: u32) -> Vec<u16> {
    let mut state = seed.max(1);
    (0..n)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            110 + (state % 40) as u16
        })
        .collect()
}

pub fn bench_density(c: &mut Criterion) {
    let mut g = c.benchmark_group("density");
    // BENCH_SAMPLE_SIZE=10 BENCH_MEAS_MS=50 cargo bench -p dust_core --bench density
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(n) = ss.parse::<usize>() {
            g.sample_size(n.max(1));
        }
    } else {
        g.sample_size(50);
    }
    if let Ok(ms) = std::env::var("BENCH_MEAS_MS")
        && let Ok(ms_u64) = ms.parse::<u64>()
    {
        g.measurement_time(Duration::from_millis(ms_u64));
    }

    let trace = synth_trace(4096, 0xD057);

    g.bench_function("calibration", |b| {
        let cal = Calibration::default();
        b.iter(|| {
            let mut acc = 0u32;
            for &raw in &trace {
                let v = cal.to_volts(black_box(raw), 5.0, 1024);
                acc += u32::from(cal.to_density(v, 0.6));
            }
            black_box(acc);
        })
    });

    for samples in [1u16, 20] {
        g.bench_function(format!("read_{samples}_samples"), |b| {
            let n = NonZeroU16::new(samples).unwrap_or(NonZeroU16::MIN);
            b.iter_batched(
                || {
                    DustSensor::builder(SensorModel::Gp2y1014au0f)
                        .with_emitter(NullEmitter::default())
                        .with_adc(ReplayAnalog::new(trace.clone(), 10).unwrap())
                        .with_clock(NoSleepClock)
                        .build()
                        .unwrap()
                },
                |mut sensor| {
                    for _ in 0..64 {
                        black_box(sensor.read_density(n).unwrap());
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }

    g.bench_function("window_push_average", |b| {
        let mut w = RunningAverage::default();
        b.iter(|| {
            for &raw in &trace {
                w.push(black_box(raw));
            }
            black_box(w.average());
        })
    });
    g.finish();
}

criterion_group!(density, bench_density);
criterion_main!(density);
