use std::io::Cursor;

use barbell_host::log::{Layout, SampleReader};
use barbell_host::Error;

fn read(text: &str) -> (Vec<barbell_host::Result<barbell_host::engine::Sample>>, Option<Layout>) {
    let mut reader = SampleReader::new(Cursor::new(text.to_owned()));
    let rows = reader.by_ref().collect();
    (rows, reader.layout())
}

// ---------------------------------------------------------------------------
// Layouts
// ---------------------------------------------------------------------------

#[test]
fn diagnostic_log_with_header() {
    let text = "\
rep_id,t_ms,ax,ay,az,gx,gy,gz,az_filtered,v_z,calibrating
0,1000,0.010000,-0.020000,9.810000,0.100000,0.200000,0.300000,0.000000,0.000000,0
1,1010,0.000000,0.000000,10.500000,0.000000,0.000000,0.000000,0.069335,0.000693,0
";
    let (rows, layout) = read(text);

    assert_eq!(layout, Some(Layout::Diagnostic));
    assert_eq!(rows.len(), 2);
    let first = rows[0].as_ref().unwrap();
    assert_eq!(first.t_ms, 1000);
    assert_eq!(first.ax, 0.01);
    assert_eq!(first.ay, -0.02);
    assert_eq!(first.az, 9.81);
    assert_eq!(first.gyro, Some([0.1, 0.2, 0.3]));
    assert_eq!(rows[1].as_ref().unwrap().t_ms, 1010);
}

#[test]
fn raw_log_without_header_is_inferred() {
    let (rows, layout) = read("0,0.0,0.0,9.8\n10,0.0,0.0,9.9\n");

    assert_eq!(layout, Some(Layout::Raw));
    let samples: Vec<_> = rows.into_iter().map(Result::unwrap).collect();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[1].t_ms, 10);
    assert_eq!(samples[1].az, 9.9);
    assert_eq!(samples[1].gyro, None);
}

#[test]
fn raw_log_with_gyro_columns() {
    let (rows, _) = read("t_ms,ax,ay,az,gx,gy,gz\n5,1,2,3,4,5,6\n");

    let sample = rows[0].as_ref().unwrap();
    assert_eq!(sample.t_ms, 5);
    assert_eq!((sample.ax, sample.ay, sample.az), (1.0, 2.0, 3.0));
    assert_eq!(sample.gyro, Some([4.0, 5.0, 6.0]));
}

#[test]
fn comments_and_blank_lines_are_skipped() {
    let text = "# recorded on the bench\n\nt_ms,ax,ay,az\n\n0,0,0,9.8\n# pause\n10, 0, 0, 9.8\n";
    let (rows, _) = read(text);

    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.is_ok()));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn malformed_row_reports_its_line() {
    let (rows, _) = read("t_ms,ax,ay,az\n0,0,0,9.8\n10,0,zero,9.8\n");

    match &rows[1] {
        Err(Error::Parse { line, .. }) => assert_eq!(*line, 3),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn short_row_is_rejected() {
    let (rows, _) = read("t_ms,ax,ay,az\n0,0,0\n");
    assert!(matches!(rows[0], Err(Error::Parse { line: 2, .. })));
}

#[test]
fn unknown_header_is_rejected() {
    let (rows, layout) = read("time,x,y,z\n");
    assert!(matches!(rows[0], Err(Error::Parse { line: 1, .. })));
    assert_eq!(layout, None);
}

#[test]
fn odd_column_count_cannot_be_inferred() {
    let (rows, _) = read("0,0,0,9.8,1\n");
    assert!(matches!(rows[0], Err(Error::Parse { line: 1, .. })));
}

#[test]
fn quoted_fields_are_unquoted() {
    let (rows, layout) = read("\"t_ms\",\"ax\",\"ay\",\"az\"\n\"0\",\"0.5\",0,\"9.8\"\n");

    assert_eq!(layout, Some(Layout::Raw));
    assert_eq!(rows.len(), 1);
    let sample = rows[0].as_ref().unwrap();
    assert_eq!(sample.t_ms, 0);
    assert_eq!(sample.ax, 0.5);
    assert_eq!(sample.az, 9.8);
}

#[test]
fn reading_stops_at_the_first_error() {
    let (rows, _) = read("time,x,y,z\n0,0,0,9.8\n10,0,0,9.8\n");

    assert_eq!(rows.len(), 1);
    assert!(matches!(rows[0], Err(Error::Parse { line: 1, .. })));
}
