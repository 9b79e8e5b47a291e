use std::fmt::Write as _;
use std::io::Cursor;

use barbell_host::engine::{CommandSlot, ConfigError, EngineConfig};
use barbell_host::log::{Layout, SampleReader};
use barbell_host::replay::{Replay, ReplayOptions, ReplayReport};
use barbell_host::strength::{brzycki, epley};
use barbell_host::Error;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Raw log at 100 Hz with `az` = 9.80665 + each entry of `profile`.
fn raw_log(profile: &[f32]) -> String {
    let mut text = String::from("t_ms,ax,ay,az\n");
    for (i, extra) in profile.iter().enumerate() {
        writeln!(text, "{},0,0,{}", i * 10, 9.80665 + extra).unwrap();
    }
    text
}

fn single_rep_profile() -> Vec<f32> {
    let mut profile = vec![0.0; 50];
    profile.extend([2.0; 30]);
    profile.extend([-2.0; 30]);
    profile.extend([0.0; 300]);
    profile
}

fn replay(text: &str, options: ReplayOptions) -> (ReplayReport, String) {
    let commands = CommandSlot::new();
    let replay = Replay::new(EngineConfig::default(), &commands, options).unwrap();
    let samples = SampleReader::new(Cursor::new(text.to_owned()));
    let mut out = Vec::new();
    let report = replay.run(samples, &mut out).unwrap();
    (report, String::from_utf8(out).unwrap())
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

#[test]
fn replay_finds_the_rep_and_writes_every_record() {
    let options = ReplayOptions { header: true, ..Default::default() };
    let (report, out) = replay(&raw_log(&single_rep_profile()), options);

    assert_eq!(report.samples, 410);
    assert_eq!(report.reps.len(), 1);
    assert_eq!(report.reps[0].rep, 1);
    assert_eq!(report.summary.total_reps, 1);
    assert_eq!(report.summary.set_dur_ms, 4090);
    assert_eq!(report.compact_records, 0);
    assert!(report.one_rep_max.is_none());

    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines.len(), 411);
    assert!(lines[0].starts_with("rep_id,t_ms,"));
    assert!(lines[1].starts_with("0,0,"));
    assert!(lines[410].starts_with("1,4090,"));
}

#[test]
fn diagnostic_output_reads_back() {
    let options = ReplayOptions { header: true, ..Default::default() };
    let (_, out) = replay(&raw_log(&single_rep_profile()), options);

    let mut reader = SampleReader::new(Cursor::new(out));
    let samples: Vec<_> = reader.by_ref().map(Result::unwrap).collect();

    assert_eq!(reader.layout(), Some(Layout::Diagnostic));
    assert_eq!(samples.len(), 410);
    assert_eq!(samples[409].t_ms, 4090);
    assert_eq!(samples[0].gyro, Some([0.0; 3]));
}

#[test]
fn connected_replay_paces_compact_records() {
    let options = ReplayOptions { connected: true, ..Default::default() };
    let (report, out) = replay(&raw_log(&single_rep_profile()), options);

    // t = 0, 50, ..., 4050
    assert_eq!(report.compact_records, 82);
    assert_eq!(out.lines().count(), 410);
}

#[test]
fn calibration_request_replaces_gravity() {
    let options = ReplayOptions { calibrate_at: Some(100), ..Default::default() };
    // resting on a slightly tilted bench
    let mut text = String::new();
    for i in 0..300 {
        writeln!(text, "{},0,0,9.7", i * 10).unwrap();
    }
    let (report, out) = replay(&text, options);

    assert_eq!(report.calibrations.len(), 1);
    let cal = &report.calibrations[0];
    assert_eq!(cal.finished_at_ms, 2100);
    assert_eq!(cal.samples, 201);
    assert_eq!(cal.gravity, Some(9.7));
    assert_eq!(report.gravity_estimate, 9.7);
    assert!(report.reps.is_empty());

    let calibrating: Vec<_> = out
        .lines()
        .map(|l| l.ends_with(",1"))
        .collect();
    assert!(!calibrating[9]);
    assert!(calibrating[10]);
    assert!(calibrating[209]);
    assert!(!calibrating[210]);
}

#[test]
fn report_carries_one_rep_max_and_serializes() {
    let options = ReplayOptions { load_kg: Some(100.0), ..Default::default() };
    let (report, _) = replay(&raw_log(&single_rep_profile()), options);

    let orm = report.one_rep_max.unwrap();
    assert_eq!(orm.reps, 1);
    assert!((orm.epley_kg - 103.333).abs() < 1e-2);
    assert_eq!(orm.brzycki_kg, 100.0);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["reps"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["summary"]["total_reps"], 1);
}

#[test]
fn bad_config_is_an_error() {
    let commands = CommandSlot::new();
    let config = EngineConfig { lpf_alpha: 0.0, ..Default::default() };

    let result = Replay::new(config, &commands, ReplayOptions::default());

    assert!(matches!(result, Err(Error::Config(ConfigError::LpfAlpha))));
}

#[test]
fn parse_error_stops_the_replay() {
    let commands = CommandSlot::new();
    let replay =
        Replay::new(EngineConfig::default(), &commands, ReplayOptions::default()).unwrap();
    let samples = SampleReader::new(Cursor::new("0,0,0,9.8\nten,0,0,9.8\n".to_owned()));

    let result = replay.run(samples, Vec::new());

    assert!(matches!(result, Err(Error::Parse { line: 2, .. })));
}

// ---------------------------------------------------------------------------
// Strength
// ---------------------------------------------------------------------------

#[test]
fn one_rep_max_formulas() {
    assert!((epley(100.0, 5) - 116.666_67).abs() < 1e-3);
    assert_eq!(brzycki(100.0, 5), 112.5);
    assert_eq!(epley(0.0, 5), 0.0);
    assert_eq!(epley(100.0, 0), 0.0);
    assert_eq!(brzycki(-5.0, 3), 0.0);
    assert_eq!(brzycki(100.0, 37), 0.0);
}
