/// Accumulator for one gravity calibration window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationSession {
    pub running: bool,
    pub start_t: u32,
    /// Sum of raw `az`, kept in double precision over the whole window.
    pub sum_az: f64,
    pub count: u32,
}

/// Result of feeding one sample to the [`Calibrator`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationStep {
    /// No session is running; nothing was recorded.
    Idle,
    /// Sample added, window still open.
    Accumulating,
    /// Window elapsed. Holds the mean `az`, or `None` if no sample landed
    /// in the window.
    Finished(Option<f32>),
}

/// Estimates the gravity offset on the vertical axis by averaging a
/// fixed-duration window of samples taken while the bar rests.
#[derive(Debug, Clone)]
pub struct Calibrator {
    duration_ms: u32,
    session: CalibrationSession,
}

impl Calibrator {
    pub fn new(duration_ms: u32) -> Self {
        Self { duration_ms, session: CalibrationSession::default() }
    }

    /// Opens a new window at `now`. A session already in progress is
    /// discarded along with its partial sum.
    pub fn start(&mut self, now: u32) {
        self.session =
            CalibrationSession { running: true, start_t: now, sum_az: 0.0, count: 0 };
    }

    /// Adds `az` to the running window and closes it once
    /// `calib_duration_ms` has elapsed since [`start`](Self::start).
    pub fn observe(&mut self, az: f32, now: u32) -> CalibrationStep {
        if !self.session.running {
            return CalibrationStep::Idle;
        }

        self.session.sum_az += az as f64;
        self.session.count = self.session.count.saturating_add(1);

        if now.wrapping_sub(self.session.start_t) < self.duration_ms {
            return CalibrationStep::Accumulating;
        }
        self.finish()
    }

    /// Closes the window without a new sample if it has elapsed, for hosts
    /// that keep time while the sensor is stalled.
    pub fn expire(&mut self, now: u32) -> CalibrationStep {
        if !self.session.running {
            return CalibrationStep::Idle;
        }
        if now.wrapping_sub(self.session.start_t) < self.duration_ms {
            return CalibrationStep::Accumulating;
        }
        self.finish()
    }

    fn finish(&mut self) -> CalibrationStep {
        let mean = if self.session.count > 0 {
            Some((self.session.sum_az / self.session.count as f64) as f32)
        } else {
            None
        };
        self.session = CalibrationSession::default();
        CalibrationStep::Finished(mean)
    }

    pub fn is_running(&self) -> bool {
        self.session.running
    }

    pub fn session(&self) -> &CalibrationSession {
        &self.session
    }

    /// Drops any running session without producing an estimate.
    pub fn cancel(&mut self) {
        self.session = CalibrationSession::default();
    }
}
