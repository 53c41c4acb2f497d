#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Dust-density estimation for Sharp GP2Y optical sensors (hardware-agnostic).
//!
//! All line access goes through `dust_traits::Emitter` and
//! `dust_traits::AnalogInput`; time goes through `dust_traits::Clock` so the
//! pulse protocol runs unchanged against a virtual clock in tests.
//!
//! ## Architecture
//!
//! - **Profiles**: per-variant datasheet constants (`profile` module)
//! - **Pulse protocol**: LED on / settle / sample / off / rest (`pulse` module)
//! - **Calibration**: counts → volts → µg/m³ (`calibration` module)
//! - **Baseline**: zero-dust tracking and candidates (`baseline` module)
//! - **Window**: running average of densities (`window` module)
//! - **Sensor**: the estimator tying them together (`sensor`, `builder`)
//! - **Poller**: background reading thread (`poller` module)

pub mod baseline;
pub mod builder;
pub mod calibration;
pub mod config;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod poller;
pub mod profile;
pub mod pulse;
pub mod sensor;
pub mod util;
pub mod window;

pub use baseline::{BaselineTracker, CANDIDATE_MIN_READINGS, CandidateState};
pub use builder::{DEFAULT_REFERENCE_VOLTAGE, DustSensorBuilder, Missing};
pub use calibration::Calibration;
pub use config::{PollCfg, SensorCfg};
pub use error::{BuildError, DustError, Result};
pub use poller::{PollReading, Poller};
pub use profile::{SensorModel, SensorProfile};
pub use pulse::{PulseSampler, PulseTiming};
pub use sensor::{DEFAULT_SAMPLES, DustReading, DustSensor};
pub use window::{DensityWindow, NoWindow, RunningAverage};
