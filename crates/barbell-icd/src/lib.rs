#![cfg_attr(not(feature = "use-std"), no_std)]
//! Wire definitions shared by the barbell sensor firmware and its hosts.
//!
//! Every binary frame is 16 bytes, little-endian, so a single frame fits in
//! one BLE notification at the default ATT MTU.

use derive_more::Display;
use serde::{Deserialize, Serialize};

mod frames;
pub use frames::*;

// BLE service layout
pub const SERVICE_UUID: &str = "6f6b0001-8a3a-4e7f-a12d-3f6a9c0a0001";
pub const DATA_UUID: &str = "6f6b0002-8a3a-4e7f-a12d-3f6a9c0a0002";
pub const CTRL_UUID: &str = "6f6b0003-8a3a-4e7f-a12d-3f6a9c0a0003";
pub const METRIC_UUID: &str = "6f6b0004-8a3a-4e7f-a12d-3f6a9c0a0004";
pub const DEVICE_NAME: &str = "BarbellIMU";

/// Size of every binary frame defined here.
pub const FRAME_LEN: usize = 16;

/// Commands accepted on the control characteristic and the serial console.
///
/// Only `0x01` is defined. Other bytes are reserved and must be ignored by
/// the receiver.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ControlCommand {
    StartCalibration = 0x01,
}

impl ControlCommand {
    /// Maps a serial console line to a command.
    pub fn from_console_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.eq_ignore_ascii_case("c")
            || line.eq_ignore_ascii_case("cal")
            || line.eq_ignore_ascii_case("calibrate")
        {
            Some(ControlCommand::StartCalibration)
        } else {
            None
        }
    }
}

impl TryFrom<u8> for ControlCommand {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(ControlCommand::StartCalibration),
            _ => Err(FrameError::UnknownCommand(value)),
        }
    }
}

impl From<ControlCommand> for u8 {
    fn from(value: ControlCommand) -> Self {
        value as u8
    }
}

/// Errors raised while decoding frames or command bytes.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Buffer shorter than [`FRAME_LEN`].
    #[display("frame too short: {_0} bytes")]
    TooShort(usize),
    /// Metric frame carried a tag this version does not know.
    #[display("unknown metric tag {_0:#04x}")]
    UnknownTag(u8),
    #[display("unknown control command {_0:#04x}")]
    UnknownCommand(u8),
}

#[cfg(feature = "use-std")]
impl std::error::Error for FrameError {}
