use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::{FrameError, FRAME_LEN};

pub const REP_REPORT_TAG: u8 = 0xA1;
pub const SET_SUMMARY_TAG: u8 = 0xA2;

const FLAG_CALIBRATING: u8 = 0b01;
const FLAG_REP_ACTIVE: u8 = 0b10;

fn check_len(bytes: &[u8]) -> Result<(), FrameError> {
    if bytes.len() < FRAME_LEN {
        Err(FrameError::TooShort(bytes.len()))
    } else {
        Ok(())
    }
}

/// Raw IMU sample as streamed on the data characteristic.
///
/// Axes are raw sensor counts; scaling is owned by the sensor driver.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSamplePacket {
    pub t_ms: u32,
    pub accel: [i16; 3],
    pub gyro: [i16; 3],
}

impl RawSamplePacket {
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let mut buf = [0u8; FRAME_LEN];
        LittleEndian::write_u32(&mut buf[0..4], self.t_ms);
        for (i, v) in self.accel.iter().chain(self.gyro.iter()).enumerate() {
            let at = 4 + i * 2;
            LittleEndian::write_i16(&mut buf[at..at + 2], *v);
        }
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        check_len(bytes)?;
        let axis = |i: usize| LittleEndian::read_i16(&bytes[4 + i * 2..]);
        Ok(Self {
            t_ms: LittleEndian::read_u32(&bytes[0..4]),
            accel: [axis(0), axis(1), axis(2)],
            gyro: [axis(3), axis(4), axis(5)],
        })
    }
}

/// Binary form of the compact telemetry record.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryFrame {
    pub t_ms: u32,
    /// Filtered vertical acceleration, gravity removed (m/s^2).
    pub az_filtered: f32,
    /// Vertical velocity (m/s).
    pub v_z: f32,
    pub rep_id: u16,
    pub calibrating: bool,
    pub rep_active: bool,
}

impl TelemetryFrame {
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let mut buf = [0u8; FRAME_LEN];
        LittleEndian::write_u32(&mut buf[0..4], self.t_ms);
        LittleEndian::write_f32(&mut buf[4..8], self.az_filtered);
        LittleEndian::write_f32(&mut buf[8..12], self.v_z);
        LittleEndian::write_u16(&mut buf[12..14], self.rep_id);
        let mut flags = 0;
        if self.calibrating {
            flags |= FLAG_CALIBRATING;
        }
        if self.rep_active {
            flags |= FLAG_REP_ACTIVE;
        }
        buf[14] = flags;
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        check_len(bytes)?;
        Ok(Self {
            t_ms: LittleEndian::read_u32(&bytes[0..4]),
            az_filtered: LittleEndian::read_f32(&bytes[4..8]),
            v_z: LittleEndian::read_f32(&bytes[8..12]),
            rep_id: LittleEndian::read_u16(&bytes[12..14]),
            calibrating: bytes[14] & FLAG_CALIBRATING != 0,
            rep_active: bytes[14] & FLAG_REP_ACTIVE != 0,
        })
    }
}

/// Per-rep metrics, sent on the metric characteristic when a rep ends.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RepReport {
    /// Rep number within the set, saturating at 255 on the wire.
    pub rep: u8,
    pub total_reps: u8,
    pub dur_ms: u32,
    pub mean_vel_mmps: i16,
    pub peak_vel_mmps: i16,
    /// Mean absolute filtered acceleration in milli-g.
    pub mean_abs_a_mg: u16,
}

impl RepReport {
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let mut buf = [0u8; FRAME_LEN];
        buf[0] = REP_REPORT_TAG;
        buf[1] = self.rep;
        buf[2] = self.total_reps;
        LittleEndian::write_u32(&mut buf[4..8], self.dur_ms);
        LittleEndian::write_i16(&mut buf[8..10], self.mean_vel_mmps);
        LittleEndian::write_i16(&mut buf[10..12], self.peak_vel_mmps);
        LittleEndian::write_u16(&mut buf[12..14], self.mean_abs_a_mg);
        buf
    }

    fn decode_body(bytes: &[u8]) -> Self {
        Self {
            rep: bytes[1],
            total_reps: bytes[2],
            dur_ms: LittleEndian::read_u32(&bytes[4..8]),
            mean_vel_mmps: LittleEndian::read_i16(&bytes[8..10]),
            peak_vel_mmps: LittleEndian::read_i16(&bytes[10..12]),
            mean_abs_a_mg: LittleEndian::read_u16(&bytes[12..14]),
        }
    }
}

/// Totals for a set, from the last calibration to the moment of the request.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SetSummary {
    pub total_reps: u8,
    pub set_dur_ms: u32,
    pub mean_of_means_mmps: i16,
    pub best_peak_mmps: i16,
    pub avg_rep_dur_ms: u16,
}

impl SetSummary {
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let mut buf = [0u8; FRAME_LEN];
        buf[0] = SET_SUMMARY_TAG;
        buf[1] = self.total_reps;
        LittleEndian::write_u32(&mut buf[4..8], self.set_dur_ms);
        LittleEndian::write_i16(&mut buf[8..10], self.mean_of_means_mmps);
        LittleEndian::write_i16(&mut buf[10..12], self.best_peak_mmps);
        LittleEndian::write_u16(&mut buf[12..14], self.avg_rep_dur_ms);
        buf
    }

    fn decode_body(bytes: &[u8]) -> Self {
        Self {
            total_reps: bytes[1],
            set_dur_ms: LittleEndian::read_u32(&bytes[4..8]),
            mean_of_means_mmps: LittleEndian::read_i16(&bytes[8..10]),
            best_peak_mmps: LittleEndian::read_i16(&bytes[10..12]),
            avg_rep_dur_ms: LittleEndian::read_u16(&bytes[12..14]),
        }
    }
}

/// Anything sent on the metric characteristic.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MetricMessage {
    Rep(RepReport),
    Summary(SetSummary),
}

impl MetricMessage {
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        match self {
            MetricMessage::Rep(r) => r.encode(),
            MetricMessage::Summary(s) => s.encode(),
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        check_len(bytes)?;
        match bytes[0] {
            REP_REPORT_TAG => Ok(MetricMessage::Rep(RepReport::decode_body(bytes))),
            SET_SUMMARY_TAG => {
                Ok(MetricMessage::Summary(SetSummary::decode_body(bytes)))
            }
            tag => Err(FrameError::UnknownTag(tag)),
        }
    }
}
