use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Standard gravity (m/s^2).
pub const STANDARD_GRAVITY: f32 = 9.80665;

/// Mounting direction of the vertical axis.
///
/// Applied once to the raw `az` before the engine sees it, so that positive
/// velocity always means the bar is moving up.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    #[default]
    Normal,
    Inverted,
}

impl Polarity {
    pub fn apply(self, value: f32) -> f32 {
        match self {
            Polarity::Normal => value,
            Polarity::Inverted => -value,
        }
    }
}

/// Tuning constants. Loaded once and never mutated by the engine.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct EngineConfig {
    /// Sensor output data rate (Hz).
    pub odr_hz: f32,
    /// Low-pass smoothing factor, smaller is smoother.
    pub lpf_alpha: f32,
    /// Gravity estimate used until the first calibration (m/s^2).
    pub grav_default: f32,
    /// Velocity that starts a rep (m/s).
    pub vel_start_thresh: f32,
    /// Velocity magnitude under which an active rep may end (m/s).
    pub vel_end_thresh: f32,
    /// Filtered acceleration magnitude treated as "still" (m/s^2).
    pub acc_still_thresh: f32,
    pub min_rep_time_ms: u32,
    pub calib_duration_ms: u32,
    /// Per-sample velocity multiplier while still.
    pub still_decay: f32,
    /// Minimum spacing of compact telemetry records.
    pub telemetry_period_ms: u32,
    pub polarity: Polarity,
    /// Largest integration step, in sample periods.
    pub max_dt_periods: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            odr_hz: 104.0,
            lpf_alpha: 0.1,
            grav_default: STANDARD_GRAVITY,
            vel_start_thresh: 0.10,
            vel_end_thresh: 0.02,
            acc_still_thresh: 0.30,
            min_rep_time_ms: 200,
            calib_duration_ms: 2000,
            still_decay: 0.98,
            telemetry_period_ms: 50, // 20 Hz cap on the radio link
            polarity: Polarity::Normal,
            max_dt_periods: 4.0,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.odr_hz.is_finite() || self.odr_hz <= 0.0 {
            return Err(ConfigError::OdrHz);
        }
        if !(self.lpf_alpha > 0.0 && self.lpf_alpha <= 1.0) {
            return Err(ConfigError::LpfAlpha);
        }
        if !(self.still_decay > 0.0 && self.still_decay < 1.0) {
            return Err(ConfigError::StillDecay);
        }
        if !self.grav_default.is_finite() {
            return Err(ConfigError::GravDefault);
        }
        for (name, value) in [
            ("vel_start_thresh", self.vel_start_thresh),
            ("vel_end_thresh", self.vel_end_thresh),
            ("acc_still_thresh", self.acc_still_thresh),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Threshold(name));
            }
        }
        if self.vel_end_thresh > self.vel_start_thresh {
            return Err(ConfigError::ThresholdOrder);
        }
        if self.calib_duration_ms == 0 {
            return Err(ConfigError::CalibDuration);
        }
        if self.telemetry_period_ms == 0 {
            return Err(ConfigError::TelemetryPeriod);
        }
        if !self.max_dt_periods.is_finite() || self.max_dt_periods < 1.0 {
            return Err(ConfigError::MaxDtPeriods);
        }
        Ok(())
    }

    /// Nominal sample period in seconds.
    pub fn sample_period_s(&self) -> f32 {
        1.0 / self.odr_hz
    }

    /// Upper bound on the integration step in seconds.
    pub fn max_dt_s(&self) -> f32 {
        self.max_dt_periods * self.sample_period_s()
    }

    /// Gravity estimate in the polarity-adjusted frame, where a bar at rest
    /// reads `+grav_default` whichever way the sensor is mounted.
    pub fn default_gravity(&self) -> f32 {
        self.grav_default
    }
}
