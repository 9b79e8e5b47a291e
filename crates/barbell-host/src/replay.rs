//! Offline replay of recorded sessions through the engine.

use std::io::Write;

use barbell_engine::telemetry::VERBOSE_HEADER;
use barbell_engine::{
    CalibrationOutcome, CommandSlot, Engine, EngineConfig, Output, Sample,
};
use barbell_icd::{ControlCommand, RepReport, SetSummary};
use serde::Serialize;

use crate::strength::OneRepMax;
use crate::Result;

#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    /// Post a start-calibration command on the first sample at or after
    /// this time (ms).
    pub calibrate_at: Option<u32>,
    /// Pretend a radio link is up so compact records are paced and counted.
    pub connected: bool,
    /// Bar load, for the one-rep-max estimate.
    pub load_kg: Option<f32>,
    /// Write the column header before the first verbose record.
    pub header: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationRecord {
    pub finished_at_ms: u32,
    /// `None` when the window closed without samples.
    pub gravity: Option<f32>,
    pub samples: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub samples: u64,
    pub compact_records: u64,
    pub gravity_estimate: f32,
    pub calibrations: Vec<CalibrationRecord>,
    pub reps: Vec<RepReport>,
    pub summary: SetSummary,
    pub one_rep_max: Option<OneRepMax>,
}

/// Drives an [`Engine`] over recorded samples, with the sample timestamp
/// standing in for the clock.
pub struct Replay<'a> {
    engine: Engine<'a>,
    options: ReplayOptions,
    calibration_posted: bool,
    last_t: u32,
    samples: u64,
    compact_records: u64,
    calibrations: Vec<CalibrationRecord>,
    reps: Vec<RepReport>,
}

impl<'a> Replay<'a> {
    pub fn new(
        config: EngineConfig,
        commands: &'a CommandSlot,
        options: ReplayOptions,
    ) -> Result<Self> {
        let mut engine = Engine::new(config, commands)?;
        engine.set_transport_connected(options.connected);
        Ok(Self {
            engine,
            options,
            calibration_posted: false,
            last_t: 0,
            samples: 0,
            compact_records: 0,
            calibrations: Vec::new(),
            reps: Vec::new(),
        })
    }

    pub fn engine(&self) -> &Engine<'a> {
        &self.engine
    }

    /// Processes one sample and writes its verbose record to `sink`.
    pub fn step<W: Write>(&mut self, sample: &Sample, sink: &mut W) -> Result<Output> {
        if let Some(at) = self.options.calibrate_at {
            if !self.calibration_posted && sample.t_ms >= at {
                tracing::debug!(t_ms = sample.t_ms, "posting calibration request");
                self.engine
                    .command_slot()
                    .post(ControlCommand::StartCalibration);
                self.calibration_posted = true;
            }
        }

        let now = sample.t_ms;
        let output = self.engine.process(sample, now);
        self.samples += 1;
        self.last_t = now;

        sink.write_all(output.record.verbose_line()?.as_bytes())?;
        if output.compact {
            self.compact_records += 1;
        }
        if let Some(outcome) = output.calibration {
            self.record_calibration(outcome, now);
        }
        if let Some(rep) = output.rep {
            tracing::info!(
                rep = rep.rep,
                dur_ms = rep.dur_ms,
                mean_mmps = rep.mean_vel_mmps,
                peak_mmps = rep.peak_vel_mmps,
                "rep finished"
            );
            self.reps.push(rep);
        }

        Ok(output)
    }

    fn record_calibration(&mut self, outcome: CalibrationOutcome, now: u32) {
        match outcome {
            CalibrationOutcome::Started => {
                tracing::info!(t_ms = now, "calibration started");
            }
            CalibrationOutcome::Completed { gravity, samples } => {
                tracing::info!(t_ms = now, gravity, samples, "calibration complete");
                self.calibrations.push(CalibrationRecord {
                    finished_at_ms: now,
                    gravity: Some(gravity),
                    samples,
                });
            }
            CalibrationOutcome::Empty => {
                tracing::warn!(
                    t_ms = now,
                    "calibration window saw no samples, keeping previous gravity"
                );
                self.calibrations.push(CalibrationRecord {
                    finished_at_ms: now,
                    gravity: None,
                    samples: 0,
                });
            }
        }
    }

    /// Replays every sample from `samples`, stopping at the first error.
    pub fn run<I, W>(mut self, samples: I, mut sink: W) -> Result<ReplayReport>
    where
        I: IntoIterator<Item = Result<Sample>>,
        W: Write,
    {
        if self.options.header {
            writeln!(sink, "{VERBOSE_HEADER}")?;
        }
        for sample in samples {
            self.step(&sample?, &mut sink)?;
        }
        sink.flush()?;
        Ok(self.finish())
    }

    /// Closes the session and builds the report.
    pub fn finish(self) -> ReplayReport {
        if self.engine.is_calibrating() {
            tracing::warn!(
                t_ms = self.last_t,
                "log ended inside a calibration window"
            );
        }

        let summary = self.engine.set_summary(self.last_t);
        let one_rep_max = self
            .options
            .load_kg
            .map(|load| OneRepMax::estimate(load, self.reps.len() as u32));

        ReplayReport {
            samples: self.samples,
            compact_records: self.compact_records,
            gravity_estimate: self.engine.gravity_estimate(),
            calibrations: self.calibrations,
            reps: self.reps,
            summary,
            one_rep_max,
        }
    }
}
