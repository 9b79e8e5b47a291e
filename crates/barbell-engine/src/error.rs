use derive_more::Display;

/// Reasons an [`EngineConfig`](crate::EngineConfig) is refused.
///
/// Configuration is never clamped: a bad value stops construction.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    #[display("odr_hz must be finite and greater than zero")]
    OdrHz,
    #[display("lpf_alpha must lie in (0, 1]")]
    LpfAlpha,
    #[display("still_decay must lie in (0, 1)")]
    StillDecay,
    #[display("grav_default must be finite")]
    GravDefault,
    /// A threshold is negative or not finite. Carries the field name.
    #[display("{_0} must be finite and non-negative")]
    Threshold(&'static str),
    #[display("vel_end_thresh must not exceed vel_start_thresh")]
    ThresholdOrder,
    #[display("calib_duration_ms must be greater than zero")]
    CalibDuration,
    #[display("telemetry_period_ms must be greater than zero")]
    TelemetryPeriod,
    #[display("max_dt_periods must be finite and at least 1")]
    MaxDtPeriods,
}
