#[allow(unused_imports)]
use micromath::F32Ext;

use crate::EngineConfig;

/// Filtered acceleration and velocity after one step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FilterOutput {
    /// Gravity-free, low-passed vertical acceleration (m/s^2).
    pub az_filtered: f32,
    /// Vertical velocity (m/s).
    pub v_z: f32,
}

/// Gravity removal, first-order low-pass and Euler integration of the
/// vertical axis.
///
/// Drift is bled off with a multiplicative decay whenever the filtered
/// acceleration looks still. This pulls velocity towards zero between reps
/// but is an approximation: a constant bias still leaves a steady-state
/// velocity error of `still_decay * bias * dt / (1 - still_decay)`.
#[derive(Debug, Clone)]
pub struct VerticalFilter {
    alpha: f32,
    acc_still_thresh: f32,
    still_decay: f32,
    state: FilterOutput,
}

impl VerticalFilter {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            alpha: config.lpf_alpha,
            acc_still_thresh: config.acc_still_thresh,
            still_decay: config.still_decay,
            state: FilterOutput::default(),
        }
    }

    /// Advances the filter by one sample taken `dt` seconds after the
    /// previous one. `dt` must already be sanitised by the caller.
    pub fn step(&mut self, az_raw: f32, gravity: f32, dt: f32) -> FilterOutput {
        let az_no_g = az_raw - gravity;

        let az_filtered =
            self.alpha * az_no_g + (1.0 - self.alpha) * self.state.az_filtered;

        let mut v_z = self.state.v_z + az_filtered * dt;

        if az_filtered.abs() < self.acc_still_thresh {
            v_z *= self.still_decay;
        }

        self.state = FilterOutput { az_filtered, v_z };
        self.state
    }

    pub fn output(&self) -> FilterOutput {
        self.state
    }

    pub fn zero_velocity(&mut self) {
        self.state.v_z = 0.0;
    }

    pub fn reset(&mut self) {
        self.state = FilterOutput::default();
    }
}
