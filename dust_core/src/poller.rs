//! Background polling of a dust sensor.
//!
//! Spawns a thread that owns the `DustSensor`, takes a reading every
//! interval, optionally adopts ready baseline candidates, and publishes each
//! result through a bounded channel. The sensor keeps a single owner: the
//! polling thread.
//!
//! Safety: Each `Poller` spawns exactly one thread that is shut down and
//! joined when the `Poller` is dropped.
use crossbeam_channel as xch;
use dust_traits::clock::Clock;
use dust_traits::{AnalogInput, Emitter};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::config::PollCfg;
use crate::sensor::DustSensor;
use crate::window::DensityWindow;

/// Readings buffered for a slow consumer before new ones are dropped.
const CHANNEL_DEPTH: usize = 64;
/// Longest uninterrupted sleep between shutdown checks.
const SHUTDOWN_POLL: Duration = Duration::from_millis(20);

/// One published reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollReading {
    /// Monotonic reading number, starting at 0.
    pub seq: u64,
    pub mean_raw: u16,
    pub voltage: f32,
    pub density_ug_m3: u16,
    /// Window average after this reading, when the sensor keeps one.
    pub average_ug_m3: Option<u16>,
    /// Baseline in effect after this reading.
    pub baseline_v: f32,
    /// Set when this reading made a candidate ready and it was adopted.
    pub adopted_baseline_v: Option<f32>,
}

pub struct Poller {
    rx: xch::Receiver<PollReading>,
    read_errors: Arc<AtomicU64>,
    dropped: Arc<AtomicU64>,
    /// Shutdown flag for immediate response (atomic for lock-free check)
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Poller {
    pub fn spawn<E, A, SC, W, C>(
        mut sensor: DustSensor<E, A, SC, W>,
        cfg: PollCfg,
        clock: C,
    ) -> Self
    where
        E: Emitter + Send + 'static,
        A: AnalogInput + Send + 'static,
        SC: Clock + Send + 'static,
        W: DensityWindow + Send + 'static,
        C: Clock + Send + 'static,
    {
        let (tx, rx) = xch::bounded(CHANNEL_DEPTH);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let read_errors = Arc::new(AtomicU64::new(0));
        let read_errors_clone = read_errors.clone();
        let dropped = Arc::new(AtomicU64::new(0));
        let dropped_clone = dropped.clone();

        let join_handle = std::thread::spawn(move || {
            let mut seq: u64 = 0;
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("Poller thread received shutdown signal");
                    break;
                }
                let started = clock.now();

                match sensor.read(cfg.samples) {
                    Ok(r) => {
                        let adopted_baseline_v =
                            if cfg.auto_adopt_baseline && sensor.baseline_candidate_ready() {
                                let v = sensor.take_baseline_candidate();
                                sensor.set_baseline(v);
                                tracing::info!(baseline_v = v, "baseline candidate adopted");
                                Some(v)
                            } else {
                                None
                            };
                        let reading = PollReading {
                            seq,
                            mean_raw: r.mean_raw,
                            voltage: r.voltage,
                            density_ug_m3: r.density_ug_m3,
                            average_ug_m3: sensor.window_average(),
                            baseline_v: sensor.baseline(),
                            adopted_baseline_v,
                        };
                        seq = seq.wrapping_add(1);
                        match tx.try_send(reading) {
                            Ok(()) => {}
                            Err(xch::TrySendError::Full(_)) => {
                                dropped_clone.fetch_add(1, Ordering::Relaxed);
                                tracing::warn!(
                                    seq = reading.seq,
                                    "poll consumer lagging, reading dropped"
                                );
                            }
                            Err(xch::TrySendError::Disconnected(_)) => {
                                tracing::debug!("Poller consumer disconnected, exiting thread");
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        read_errors_clone.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!(error = %e, "dust reading failed");
                    }
                }

                // Sleep out the interval in slices so drop stays prompt.
                loop {
                    if shutdown_clone.load(Ordering::Relaxed) {
                        break;
                    }
                    let left = cfg.interval.saturating_sub(clock.elapsed_since(started));
                    if left.is_zero() {
                        break;
                    }
                    clock.sleep(left.min(SHUTDOWN_POLL));
                }
            }
            tracing::trace!("Poller thread exiting cleanly");
        });

        Self {
            rx,
            read_errors,
            dropped,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Block for the next reading, up to `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<PollReading> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Drain buffered readings and return the newest.
    pub fn latest(&self) -> Option<PollReading> {
        self.rx.try_iter().last()
    }

    /// Failed readings since spawn.
    pub fn read_errors(&self) -> u64 {
        self.read_errors.load(Ordering::Relaxed)
    }

    /// Readings discarded because the channel was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        // The thread exits at its next shutdown check: immediately when
        // between readings, otherwise after the in-flight reading and before
        // the interval sleep.
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("Poller thread joined successfully");
                }
                Err(e) => {
                    tracing::warn!(?e, "Poller thread panicked during shutdown");
                }
            }
        }
    }
}
