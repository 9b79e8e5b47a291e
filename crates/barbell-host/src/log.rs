//! Reading recorded sample logs.
//!
//! Two CSV layouts are accepted:
//!
//! - diagnostic, as printed by the device on its serial port:
//!   `rep_id,t_ms,ax,ay,az,gx,gy,gz,az_filtered,v_z,calibrating`
//! - raw: `t_ms,ax,ay,az` with an optional `gx,gy,gz` tail
//!
//! The layout is taken from the header when there is one, otherwise from
//! the column count of the first row. Blank lines and `#` comments are
//! skipped anywhere in the file.

use std::io::Read;

use barbell_engine::Sample;
use csv::StringRecord;

use crate::{Error, Result};

const DIAGNOSTIC_COLUMNS: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Diagnostic,
    Raw,
}

impl Layout {
    fn from_header(first_column: &str) -> Option<Self> {
        match first_column {
            "rep_id" => Some(Layout::Diagnostic),
            "t_ms" => Some(Layout::Raw),
            _ => None,
        }
    }

    fn from_column_count(count: usize) -> Option<Self> {
        match count {
            4 | 7 => Some(Layout::Raw),
            DIAGNOSTIC_COLUMNS => Some(Layout::Diagnostic),
            _ => None,
        }
    }
}

/// Iterator over the samples of a CSV log. Stops after the first error.
pub struct SampleReader<R> {
    reader: csv::Reader<R>,
    record: StringRecord,
    layout: Option<Layout>,
    failed: bool,
}

impl<R: Read> SampleReader<R> {
    pub fn new(reader: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self { reader, record: StringRecord::new(), layout: None, failed: false }
    }

    /// Layout of the log, known once the first row or header was read.
    pub fn layout(&self) -> Option<Layout> {
        self.layout
    }

    fn parse_error(&self, reason: impl Into<String>) -> Error {
        let line = self.record.position().map_or(0, |p| p.line() as usize);
        Error::Parse { line, reason: reason.into() }
    }

    fn next_sample(&mut self) -> Result<Option<Sample>> {
        loop {
            if !self.reader.read_record(&mut self.record)? {
                return Ok(None);
            }
            if self.record.iter().all(str::is_empty) {
                continue;
            }

            let layout = match self.layout {
                Some(layout) => layout,
                None => {
                    let first = self.record.get(0).unwrap_or_default();
                    if first.parse::<f64>().is_err() {
                        let layout = Layout::from_header(first).ok_or_else(|| {
                            self.parse_error(format!("unknown header `{first}`"))
                        })?;
                        self.layout = Some(layout);
                        continue;
                    }
                    let layout = Layout::from_column_count(self.record.len())
                        .ok_or_else(|| {
                            self.parse_error(format!(
                                "cannot infer layout from {} columns",
                                self.record.len()
                            ))
                        })?;
                    self.layout = Some(layout);
                    layout
                }
            };

            return self.parse_row(layout).map(Some);
        }
    }

    fn parse_row(&self, layout: Layout) -> Result<Sample> {
        let fields = &self.record;
        let (t_at, min_len) = match layout {
            Layout::Diagnostic => (1, DIAGNOSTIC_COLUMNS),
            Layout::Raw => (0, 4),
        };
        if fields.len() < min_len {
            return Err(self.parse_error(format!(
                "expected at least {min_len} columns, found {}",
                fields.len()
            )));
        }

        let field = |i: usize| fields.get(i).unwrap_or_default();
        let t_ms = field(t_at).parse::<u32>().map_err(|e| {
            self.parse_error(format!("t_ms `{}`: {e}", field(t_at)))
        })?;
        let float = |i: usize| {
            field(i).parse::<f32>().map_err(|e| {
                self.parse_error(format!("column {} `{}`: {e}", i + 1, field(i)))
            })
        };

        let a = t_at + 1;
        let mut sample = Sample::new(t_ms, float(a)?, float(a + 1)?, float(a + 2)?);
        if fields.len() >= a + 6 {
            sample = sample.with_gyro(float(a + 3)?, float(a + 4)?, float(a + 5)?);
        }
        Ok(sample)
    }
}

impl<R: Read> Iterator for SampleReader<R> {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let next = self.next_sample().transpose();
        self.failed = matches!(next, Some(Err(_)));
        next
    }
}
