#![no_std]
//! Vertical velocity estimation and rep detection for a barbell-mounted IMU.
//!
//! Samples go in one at a time through [`Engine::process`]. Each call runs
//! gravity calibration, filtering, rep detection and telemetry encoding, in
//! that order, and returns an [`Output`] for the caller to route to its
//! sinks. Calibration requests from other contexts arrive through a
//! [`CommandSlot`].

mod calibration;
mod command;
mod config;
mod engine;
mod error;
mod filter;
mod metrics;
mod rep;
mod sample;
pub mod telemetry;

pub use barbell_icd as icd;

pub use calibration::{CalibrationSession, CalibrationStep, Calibrator};
pub use command::CommandSlot;
pub use config::{EngineConfig, Polarity, STANDARD_GRAVITY};
pub use engine::{CalibrationOutcome, Engine, MotionState, Output};
pub use error::ConfigError;
pub use filter::{FilterOutput, VerticalFilter};
pub use metrics::RepMetrics;
pub use rep::{RepDetector, RepState, RepTransition};
pub use sample::Sample;
pub use telemetry::{OutputRecord, RateLimiter};
