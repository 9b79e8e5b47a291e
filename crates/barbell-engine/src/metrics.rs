use micromath::F32Ext;

use barbell_icd::{RepReport, SetSummary};

use crate::STANDARD_GRAVITY;

fn to_mmps(v: f32) -> i16 {
    // float to int casts saturate
    (v * 1000.0).round() as i16
}

fn saturate_u8(v: u16) -> u8 {
    u8::try_from(v).unwrap_or(u8::MAX)
}

/// Running sums over the samples of the rep in progress.
#[derive(Debug, Clone, Copy, Default)]
struct RepAccumulator {
    sum_v: f32,
    peak_v: f32,
    sum_abs_a: f32,
    count: u32,
}

/// Per-rep and per-set velocity metrics.
///
/// A set runs from the last motion reset (engine start or calibration) to
/// the moment a summary is requested.
#[derive(Debug, Clone, Default)]
pub struct RepMetrics {
    current: RepAccumulator,
    set_start_t: u32,
    reps: u16,
    sum_mean_mmps: i32,
    best_peak_mmps: i16,
    sum_dur_ms: u32,
}

impl RepMetrics {
    pub fn new(now: u32) -> Self {
        Self { set_start_t: now, ..Self::default() }
    }

    pub fn begin_rep(&mut self) {
        self.current = RepAccumulator::default();
    }

    /// Adds one sample of the active rep. `v_z` is the velocity before any
    /// end-of-rep reset.
    pub fn observe(&mut self, v_z: f32, az_filtered: f32) {
        let acc = &mut self.current;
        if acc.count == 0 || v_z > acc.peak_v {
            acc.peak_v = v_z;
        }
        acc.sum_v += v_z;
        acc.sum_abs_a += az_filtered.abs();
        acc.count = acc.count.saturating_add(1);
    }

    pub fn finish_rep(&mut self, rep_id: u16, duration_ms: u32) -> RepReport {
        let acc = self.current;
        let n = acc.count.max(1) as f32;
        let mean_vel_mmps = to_mmps(acc.sum_v / n);
        let peak_vel_mmps = to_mmps(acc.peak_v);
        let mean_abs_a_mg =
            (acc.sum_abs_a / n / STANDARD_GRAVITY * 1000.0).round() as u16;

        self.reps = self.reps.saturating_add(1);
        self.sum_mean_mmps =
            self.sum_mean_mmps.saturating_add(mean_vel_mmps as i32);
        if self.reps == 1 || peak_vel_mmps > self.best_peak_mmps {
            self.best_peak_mmps = peak_vel_mmps;
        }
        self.sum_dur_ms = self.sum_dur_ms.saturating_add(duration_ms);
        self.current = RepAccumulator::default();

        RepReport {
            rep: saturate_u8(rep_id),
            total_reps: saturate_u8(self.reps),
            dur_ms: duration_ms,
            mean_vel_mmps,
            peak_vel_mmps,
            mean_abs_a_mg,
        }
    }

    pub fn summary(&self, now: u32) -> SetSummary {
        let (mean_of_means_mmps, avg_rep_dur_ms) = if self.reps > 0 {
            let n = self.reps as i32;
            (
                (self.sum_mean_mmps / n) as i16,
                u16::try_from(self.sum_dur_ms / self.reps as u32)
                    .unwrap_or(u16::MAX),
            )
        } else {
            (0, 0)
        };

        SetSummary {
            total_reps: saturate_u8(self.reps),
            set_dur_ms: now.wrapping_sub(self.set_start_t),
            mean_of_means_mmps,
            best_peak_mmps: self.best_peak_mmps,
            avg_rep_dur_ms,
        }
    }

    pub fn reps(&self) -> u16 {
        self.reps
    }

    pub fn reset(&mut self, now: u32) {
        *self = Self::new(now);
    }
}
