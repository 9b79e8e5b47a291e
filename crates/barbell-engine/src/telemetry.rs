//! Telemetry records for the diagnostic sink and the radio link.
//!
//! The verbose record carries everything and is produced for every sample.
//! The compact record drops the raw axes and is paced by a [`RateLimiter`]
//! so the radio never sees more than one record per
//! `telemetry_period_ms`, whatever the sample rate.

use core::fmt::{self, Write};

use barbell_icd::TelemetryFrame;
use heapless::String;

use crate::{MotionState, RepState, Sample};

/// Capacity of a formatted verbose line.
pub const VERBOSE_LINE_CAP: usize = 512;
/// Capacity of a formatted compact line.
pub const COMPACT_LINE_CAP: usize = 128;

pub type VerboseLine = String<VERBOSE_LINE_CAP>;
pub type CompactLine = String<COMPACT_LINE_CAP>;

/// Header line matching [`OutputRecord::write_verbose`].
pub const VERBOSE_HEADER: &str =
    "rep_id,t_ms,ax,ay,az,gx,gy,gz,az_filtered,v_z,calibrating";

/// Snapshot of the engine after one sample. Never stored by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputRecord {
    pub rep_id: u16,
    pub t_ms: u32,
    pub ax: f32,
    pub ay: f32,
    pub az: f32,
    pub gx: f32,
    pub gy: f32,
    pub gz: f32,
    pub az_filtered: f32,
    pub v_z: f32,
    pub calibrating: bool,
    pub rep_active: bool,
}

impl OutputRecord {
    /// Builds the record from engine state and the sample as received.
    pub fn encode(motion: &MotionState, sample: &Sample, calibrating: bool) -> Self {
        let [gx, gy, gz] = sample.gyro.unwrap_or_default();
        Self {
            rep_id: motion.rep_id,
            t_ms: sample.t_ms,
            ax: sample.ax,
            ay: sample.ay,
            az: sample.az,
            gx,
            gy,
            gz,
            az_filtered: motion.az_filtered,
            v_z: motion.v_z,
            calibrating,
            rep_active: motion.rep_state == RepState::Active,
        }
    }

    /// `rep_id,t_ms,ax,ay,az,gx,gy,gz,az_filtered,v_z,calibrating\n`
    pub fn write_verbose<W: Write>(&self, w: &mut W) -> fmt::Result {
        write!(w, "{},{}", self.rep_id, self.t_ms)?;
        for v in [
            self.ax,
            self.ay,
            self.az,
            self.gx,
            self.gy,
            self.gz,
            self.az_filtered,
            self.v_z,
        ] {
            write!(w, ",{:.6}", v)?;
        }
        writeln!(w, ",{}", self.calibrating as u8)
    }

    /// `t_ms,az_filtered,v_z,rep_id,calibrating\n`
    pub fn write_compact<W: Write>(&self, w: &mut W) -> fmt::Result {
        writeln!(
            w,
            "{},{:.4},{:.4},{},{}",
            self.t_ms,
            self.az_filtered,
            self.v_z,
            self.rep_id,
            self.calibrating as u8
        )
    }

    pub fn verbose_line(&self) -> Result<VerboseLine, fmt::Error> {
        let mut line = VerboseLine::new();
        self.write_verbose(&mut line)?;
        Ok(line)
    }

    pub fn compact_line(&self) -> Result<CompactLine, fmt::Error> {
        let mut line = CompactLine::new();
        self.write_compact(&mut line)?;
        Ok(line)
    }

    /// Binary form of the compact record.
    pub fn frame(&self) -> TelemetryFrame {
        TelemetryFrame {
            t_ms: self.t_ms,
            az_filtered: self.az_filtered,
            v_z: self.v_z,
            rep_id: self.rep_id,
            calibrating: self.calibrating,
            rep_active: self.rep_active,
        }
    }
}

/// Paces emissions to at most one per period.
///
/// Tracks its own "last emitted" time, independent of the sample clock.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    period_ms: u32,
    last: Option<u32>,
}

impl RateLimiter {
    pub fn new(period_ms: u32) -> Self {
        Self { period_ms, last: None }
    }

    /// Returns `true` and records `now` if a period has passed since the
    /// last emission.
    pub fn ready(&mut self, now: u32) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => now.wrapping_sub(last) >= self.period_ms,
        };
        if due {
            self.last = Some(now);
        }
        due
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
