//! One-rep-max estimates from a submaximal set.
//!
//! Both return 0 when the inputs give no meaningful estimate.

use serde::Serialize;

/// Epley: `w * (1 + r / 30)`.
pub fn epley(weight_kg: f32, reps: u32) -> f32 {
    if weight_kg <= 0.0 || reps == 0 {
        return 0.0;
    }
    weight_kg * (1.0 + reps as f32 / 30.0)
}

/// Brzycki: `36 w / (37 - r)`. Undefined from 37 reps on.
pub fn brzycki(weight_kg: f32, reps: u32) -> f32 {
    if weight_kg <= 0.0 || reps == 0 || reps >= 37 {
        return 0.0;
    }
    weight_kg * 36.0 / (37 - reps) as f32
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OneRepMax {
    pub load_kg: f32,
    pub reps: u32,
    pub epley_kg: f32,
    pub brzycki_kg: f32,
}

impl OneRepMax {
    pub fn estimate(load_kg: f32, reps: u32) -> Self {
        Self {
            load_kg,
            reps,
            epley_kg: epley(load_kg, reps),
            brzycki_kg: brzycki(load_kg, reps),
        }
    }
}
