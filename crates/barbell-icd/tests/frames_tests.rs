use barbell_icd::{
    ControlCommand, FrameError, MetricMessage, RawSamplePacket, RepReport,
    SetSummary, TelemetryFrame, FRAME_LEN, REP_REPORT_TAG, SET_SUMMARY_TAG,
};

// ---------------------------------------------------------------------------
// Byte layout
// ---------------------------------------------------------------------------

#[test]
fn raw_sample_layout_is_little_endian() {
    let pkt = RawSamplePacket {
        t_ms: 0x0403_0201,
        accel: [1, -1, 0x0102],
        gyro: [-2, 0, 7],
    };
    let bytes = pkt.encode();

    assert_eq!(&bytes[0..4], &[0x01, 0x02, 0x03, 0x04]);
    assert_eq!(&bytes[4..6], &[0x01, 0x00]);
    assert_eq!(&bytes[6..8], &[0xff, 0xff]);
    assert_eq!(&bytes[8..10], &[0x02, 0x01]);
    assert_eq!(&bytes[10..12], &[0xfe, 0xff]);
    assert_eq!(RawSamplePacket::decode(&bytes), Ok(pkt));
}

#[test]
fn rep_report_offsets_match_metric_parser() {
    let report = RepReport {
        rep: 3,
        total_reps: 3,
        dur_ms: 850,
        mean_vel_mmps: 412,
        peak_vel_mmps: -5,
        mean_abs_a_mg: 60000,
    };
    let bytes = report.encode();

    assert_eq!(bytes[0], REP_REPORT_TAG);
    assert_eq!(bytes[1], 3);
    assert_eq!(bytes[2], 3);
    assert_eq!(bytes[3], 0);
    assert_eq!(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 850);
    assert_eq!(i16::from_le_bytes([bytes[8], bytes[9]]), 412);
    assert_eq!(i16::from_le_bytes([bytes[10], bytes[11]]), -5);
    assert_eq!(u16::from_le_bytes([bytes[12], bytes[13]]), 60000);
}

#[test]
fn telemetry_flags_are_packed_in_byte_14() {
    let frame = TelemetryFrame {
        t_ms: 10,
        az_filtered: -0.25,
        v_z: 0.5,
        rep_id: 2,
        calibrating: false,
        rep_active: true,
    };
    let bytes = frame.encode();
    assert_eq!(bytes[14], 0b10);
    assert_eq!(bytes[15], 0);

    let decoded = TelemetryFrame::decode(&bytes).unwrap();
    assert_eq!(decoded, frame);
}

// ---------------------------------------------------------------------------
// Metric dispatch
// ---------------------------------------------------------------------------

#[test]
fn metric_message_dispatches_on_tag() {
    let summary = SetSummary {
        total_reps: 5,
        set_dur_ms: 20_000,
        mean_of_means_mmps: 380,
        best_peak_mmps: 720,
        avg_rep_dur_ms: 900,
    };
    let bytes = MetricMessage::Summary(summary).encode();
    assert_eq!(bytes[0], SET_SUMMARY_TAG);
    assert_eq!(
        MetricMessage::decode(&bytes),
        Ok(MetricMessage::Summary(summary))
    );
}

#[test]
fn metric_message_rejects_unknown_tag() {
    let mut bytes = [0u8; FRAME_LEN];
    bytes[0] = 0x7f;
    assert_eq!(MetricMessage::decode(&bytes), Err(FrameError::UnknownTag(0x7f)));
}

#[test]
fn short_buffers_are_rejected() {
    let bytes = [REP_REPORT_TAG; 4];
    assert_eq!(MetricMessage::decode(&bytes), Err(FrameError::TooShort(4)));
    assert_eq!(TelemetryFrame::decode(&[]), Err(FrameError::TooShort(0)));
}

// ---------------------------------------------------------------------------
// Control commands
// ---------------------------------------------------------------------------

#[test]
fn only_0x01_is_a_command() {
    assert_eq!(ControlCommand::try_from(0x01), Ok(ControlCommand::StartCalibration));
    assert_eq!(
        ControlCommand::try_from(0x02),
        Err(FrameError::UnknownCommand(0x02))
    );
    assert!(ControlCommand::try_from(0x00).is_err());
    assert_eq!(u8::from(ControlCommand::StartCalibration), 0x01);
}

#[test]
fn console_lines_map_to_calibration() {
    for line in ["c", "cal\r\n", "  Calibrate "] {
        assert_eq!(
            ControlCommand::from_console_line(line),
            Some(ControlCommand::StartCalibration)
        );
    }
    assert_eq!(ControlCommand::from_console_line("stop"), None);
    assert_eq!(ControlCommand::from_console_line(""), None);
}
