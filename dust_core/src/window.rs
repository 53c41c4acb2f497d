//! Running average of recent density readings.
//!
//! A sensor is built either with a [`RunningAverage`] or with [`NoWindow`];
//! only the former exposes `running_average()`, so querying a disabled
//! window does not compile.

use std::num::NonZeroUsize;

use crate::util::div_round_nearest_u64;

/// Sink for each computed density.
pub trait DensityWindow {
    fn record(&mut self, density: u16);

    /// Smoothed value when this window keeps history.
    fn average(&self) -> Option<u16>;
}

/// Window-less sensors.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWindow;

impl DensityWindow for NoWindow {
    #[inline]
    fn record(&mut self, _density: u16) {}

    #[inline]
    fn average(&self) -> Option<u16> {
        None
    }
}

/// Fixed-capacity ring of densities. Unfilled slots are `None` so a
/// partially warmed-up window averages only what it has seen.
#[derive(Debug, Clone)]
pub struct RunningAverage {
    slots: Box<[Option<u16>]>,
    next: usize,
}

impl RunningAverage {
    /// One minute of history at one reading per second.
    pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(60) {
        Some(n) => n,
        None => panic!("default capacity is non-zero"),
    };

    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            slots: vec![None; capacity.get()].into_boxed_slice(),
            next: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots holding a reading.
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Overwrite the oldest slot once the ring is full.
    pub fn push(&mut self, value: u16) {
        self.slots[self.next] = Some(value);
        self.next = (self.next + 1) % self.slots.len();
    }

    /// Mean of the filled slots rounded to nearest; 0 before the first push.
    pub fn average(&self) -> u16 {
        let (sum, count) = self
            .slots
            .iter()
            .flatten()
            .fold((0u64, 0u64), |(sum, n), &v| (sum + u64::from(v), n + 1));
        // Mean of u16 values fits in u16.
        div_round_nearest_u64(sum, count) as u16
    }
}

impl Default for RunningAverage {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl DensityWindow for RunningAverage {
    #[inline]
    fn record(&mut self, density: u16) {
        self.push(density);
    }

    #[inline]
    fn average(&self) -> Option<u16> {
        Some(RunningAverage::average(self))
    }
}
