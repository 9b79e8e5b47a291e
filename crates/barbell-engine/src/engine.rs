use barbell_icd::{ControlCommand, RepReport, SetSummary, TelemetryFrame};

use crate::calibration::{CalibrationStep, Calibrator};
use crate::command::CommandSlot;
use crate::filter::VerticalFilter;
use crate::metrics::RepMetrics;
use crate::rep::{RepDetector, RepState, RepTransition};
use crate::telemetry::{OutputRecord, RateLimiter};
use crate::{ConfigError, EngineConfig, Sample};

/// Engine state visible to the outside, copied out after each sample.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionState {
    pub gravity_estimate: f32,
    pub az_filtered: f32,
    pub v_z: f32,
    pub rep_state: RepState,
    pub rep_id: u16,
    pub rep_start_t: u32,
}

/// What happened to calibration during a [`Engine::process`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationOutcome {
    Started,
    /// Window closed and the gravity estimate was replaced.
    Completed { gravity: f32, samples: u32 },
    /// Window closed without samples; the previous estimate stands.
    Empty,
}

/// Result of processing one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Output {
    /// Verbose record, produced for every sample.
    pub record: OutputRecord,
    /// The compact record is due on the radio link.
    pub compact: bool,
    pub transition: Option<RepTransition>,
    /// Metrics of the rep that just ended.
    pub rep: Option<RepReport>,
    pub calibration: Option<CalibrationOutcome>,
}

impl Output {
    pub fn compact_frame(&self) -> Option<TelemetryFrame> {
        self.compact.then(|| self.record.frame())
    }
}

/// Sample-driven motion engine.
///
/// Owns every piece of mutable state; [`process`](Self::process) must be
/// called from a single context, one sample at a time. Other contexts talk
/// to it only through the shared [`CommandSlot`].
pub struct Engine<'a> {
    config: EngineConfig,
    commands: &'a CommandSlot,
    calibrator: Calibrator,
    filter: VerticalFilter,
    detector: RepDetector,
    metrics: RepMetrics,
    limiter: RateLimiter,
    gravity_estimate: f32,
    max_dt_s: f32,
    prev_t: Option<u32>,
    transport_connected: bool,
}

impl<'a> Engine<'a> {
    pub fn new(
        config: EngineConfig,
        commands: &'a CommandSlot,
    ) -> Result<Self, ConfigError> {
        if let Err(e) = config.validate() {
            #[cfg(feature = "defmt")]
            defmt::warn!("rejecting engine config: {}", e);
            return Err(e);
        }

        Ok(Self {
            calibrator: Calibrator::new(config.calib_duration_ms),
            filter: VerticalFilter::new(&config),
            detector: RepDetector::new(&config),
            metrics: RepMetrics::new(0),
            limiter: RateLimiter::new(config.telemetry_period_ms),
            gravity_estimate: config.default_gravity(),
            max_dt_s: config.max_dt_s(),
            prev_t: None,
            transport_connected: false,
            commands,
            config,
        })
    }

    /// Runs one sample through calibration, filtering, rep detection and
    /// telemetry, in that order.
    pub fn process(&mut self, sample: &Sample, now: u32) -> Output {
        let az = self.config.polarity.apply(sample.az);

        // 1. pending command
        let mut calibration = self.drain_commands(now);

        // 2. calibration window
        let samples = self.calibrator.session().count.saturating_add(1);
        if let CalibrationStep::Finished(mean) = self.calibrator.observe(az, now) {
            calibration = Some(self.complete_calibration(mean, samples, now));
        }
        let calibrating = self.calibrator.is_running();

        // 3. integration step
        let dt = self.dt_seconds(now);

        // 4. filter
        let filtered = self.filter.step(az, self.gravity_estimate, dt);

        // 5. rep detection, suspended while the gravity estimate is stale
        let transition = if calibrating {
            None
        } else {
            self.detect(filtered.v_z, filtered.az_filtered, now)
        };
        let rep = match transition {
            Some(RepTransition::Finished { rep_id, duration_ms, .. }) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("rep {=u16} finished after {=u32} ms", rep_id, duration_ms);
                self.filter.zero_velocity();
                Some(self.metrics.finish_rep(rep_id, duration_ms))
            }
            _ => None,
        };

        // 6. telemetry
        let record = OutputRecord::encode(&self.motion(), sample, calibrating);
        let compact = self.transport_connected && self.limiter.ready(now);

        Output { record, compact, transition, rep, calibration }
    }

    /// Advances time without a sample, for hosts whose sensor has stalled.
    ///
    /// Handles a pending command and closes a calibration window that has
    /// run its course. A window that saw no samples yields
    /// [`CalibrationOutcome::Empty`] and leaves the gravity estimate alone.
    pub fn poll(&mut self, now: u32) -> Option<CalibrationOutcome> {
        let started = self.drain_commands(now);
        let samples = self.calibrator.session().count;
        match self.calibrator.expire(now) {
            CalibrationStep::Finished(mean) => {
                Some(self.complete_calibration(mean, samples, now))
            }
            _ => started,
        }
    }

    fn drain_commands(&mut self, now: u32) -> Option<CalibrationOutcome> {
        match self.commands.take()? {
            ControlCommand::StartCalibration => {
                #[cfg(feature = "defmt")]
                defmt::info!("calibration started at {=u32} ms", now);
                self.calibrator.start(now);
                self.reset_motion(now);
                Some(CalibrationOutcome::Started)
            }
        }
    }

    fn detect(
        &mut self,
        v_z: f32,
        az_filtered: f32,
        now: u32,
    ) -> Option<RepTransition> {
        let transition = self.detector.step(v_z, now);
        if let Some(RepTransition::Started { .. }) = transition {
            #[cfg(feature = "defmt")]
            defmt::debug!("rep {=u16} started at {=u32} ms", self.detector.rep_id(), now);
            self.metrics.begin_rep();
        }
        // the closing sample still counts, with its pre-reset velocity
        if transition.is_some() || self.detector.state() == RepState::Active {
            self.metrics.observe(v_z, az_filtered);
        }
        transition
    }

    fn complete_calibration(
        &mut self,
        mean: Option<f32>,
        samples: u32,
        now: u32,
    ) -> CalibrationOutcome {
        self.reset_motion(now);
        match mean {
            Some(gravity) => {
                #[cfg(feature = "defmt")]
                defmt::info!(
                    "calibration done: gravity {=f32} from {=u32} samples",
                    gravity, samples
                );
                self.gravity_estimate = gravity;
                CalibrationOutcome::Completed { gravity, samples }
            }
            None => CalibrationOutcome::Empty,
        }
    }

    /// Seconds since the previous sample, with anomalies neutralised:
    /// the first sample and backwards steps contribute nothing and long
    /// stalls are clamped to `max_dt_periods` sample periods.
    fn dt_seconds(&mut self, now: u32) -> f32 {
        let prev = self.prev_t.replace(now);
        let Some(prev) = prev else {
            return 0.0;
        };

        let delta = now.wrapping_sub(prev);
        if delta == 0 || delta > i32::MAX as u32 {
            return 0.0;
        }

        let dt = delta as f32 / 1000.0;
        if dt > self.max_dt_s {
            #[cfg(feature = "defmt")]
            defmt::debug!("clamping dt of {=u32} ms", delta);
            self.max_dt_s
        } else {
            dt
        }
    }

    fn reset_motion(&mut self, now: u32) {
        self.filter.reset();
        self.detector.reset();
        self.metrics.reset(now);
    }

    /// Returns the engine to its just-constructed state.
    pub fn reset(&mut self) {
        self.calibrator.cancel();
        self.reset_motion(0);
        self.limiter.reset();
        self.gravity_estimate = self.config.default_gravity();
        self.prev_t = None;
    }

    /// Posts a start-calibration request, handled on the next sample.
    pub fn request_calibration(&self) {
        self.commands.post(ControlCommand::StartCalibration);
    }

    /// The pacing window survives reconnects; only [`reset`](Self::reset)
    /// clears it.
    pub fn set_transport_connected(&mut self, connected: bool) {
        if connected != self.transport_connected {
            #[cfg(feature = "defmt")]
            defmt::info!("transport connected: {=bool}", connected);
            self.transport_connected = connected;
        }
    }

    /// Totals for the set since the last reset.
    pub fn set_summary(&self, now: u32) -> SetSummary {
        self.metrics.summary(now)
    }

    pub fn motion(&self) -> MotionState {
        let filtered = self.filter.output();
        MotionState {
            gravity_estimate: self.gravity_estimate,
            az_filtered: filtered.az_filtered,
            v_z: filtered.v_z,
            rep_state: self.detector.state(),
            rep_id: self.detector.rep_id(),
            rep_start_t: self.detector.rep_start_t(),
        }
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibrator.is_running()
    }

    pub fn gravity_estimate(&self) -> f32 {
        self.gravity_estimate
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn command_slot(&self) -> &'a CommandSlot {
        self.commands
    }
}
