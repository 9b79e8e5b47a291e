/// One accelerometer read, as delivered by the sensor driver.
///
/// The vertical axis is `az`. Gyro rates are carried through to the
/// diagnostic record and never used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Sensor timestamp (ms), monotonic modulo `u32` wraparound.
    pub t_ms: u32,
    /// Acceleration (m/s^2).
    pub ax: f32,
    pub ay: f32,
    pub az: f32,
    /// Angular rate (rad/s), when the driver reads it.
    pub gyro: Option<[f32; 3]>,
}

impl Sample {
    pub fn new(t_ms: u32, ax: f32, ay: f32, az: f32) -> Self {
        Self { t_ms, ax, ay, az, gyro: None }
    }

    pub fn with_gyro(mut self, gx: f32, gy: f32, gz: f32) -> Self {
        self.gyro = Some([gx, gy, gz]);
        self
    }
}
