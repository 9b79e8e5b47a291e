#[allow(unused_imports)]
use micromath::F32Ext;

use crate::EngineConfig;

/// Phase of the lift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RepState {
    /// Bar at rest or lowering.
    #[default]
    Idle,
    /// Concentric phase in progress.
    Active,
}

/// Edge produced by [`RepDetector::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RepTransition {
    Started { rep_id: u16, at: u32 },
    Finished { rep_id: u16, started_at: u32, duration_ms: u32 },
}

/// Two-state rep counter driven by vertical velocity.
///
/// Positive velocity means "up". Mounts that read the other way are fixed
/// with [`Polarity`](crate::Polarity) before samples reach the engine.
#[derive(Debug, Clone)]
pub struct RepDetector {
    vel_start_thresh: f32,
    vel_end_thresh: f32,
    min_rep_time_ms: u32,
    state: RepState,
    rep_id: u16,
    rep_start_t: u32,
}

impl RepDetector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            vel_start_thresh: config.vel_start_thresh,
            vel_end_thresh: config.vel_end_thresh,
            min_rep_time_ms: config.min_rep_time_ms,
            state: RepState::Idle,
            rep_id: 0,
            rep_start_t: 0,
        }
    }

    /// Evaluates exactly one transition for the current velocity.
    ///
    /// An active rep cannot end before `min_rep_time_ms` has passed, even
    /// if velocity already dropped below the end threshold. The caller is
    /// responsible for zeroing velocity on `Finished`.
    pub fn step(&mut self, v_z: f32, now: u32) -> Option<RepTransition> {
        match self.state {
            RepState::Idle => {
                if v_z > self.vel_start_thresh {
                    self.state = RepState::Active;
                    self.rep_id = self.rep_id.saturating_add(1);
                    self.rep_start_t = now;
                    Some(RepTransition::Started { rep_id: self.rep_id, at: now })
                } else {
                    None
                }
            }
            RepState::Active => {
                let elapsed = now.wrapping_sub(self.rep_start_t);
                if v_z.abs() < self.vel_end_thresh && elapsed > self.min_rep_time_ms
                {
                    self.state = RepState::Idle;
                    Some(RepTransition::Finished {
                        rep_id: self.rep_id,
                        started_at: self.rep_start_t,
                        duration_ms: elapsed,
                    })
                } else {
                    None
                }
            }
        }
    }

    pub fn state(&self) -> RepState {
        self.state
    }

    pub fn rep_id(&self) -> u16 {
        self.rep_id
    }

    pub fn rep_start_t(&self) -> u32 {
        self.rep_start_t
    }

    pub fn reset(&mut self) {
        self.state = RepState::Idle;
        self.rep_id = 0;
        self.rep_start_t = 0;
    }
}
