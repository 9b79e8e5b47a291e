pub use barbell_engine as engine;
pub use barbell_icd as icd;

pub mod log;
pub mod replay;
pub mod strength;

use derive_more::{Display, From};
use std::{fmt, io};

use barbell_engine::ConfigError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, From, Display)]
pub enum Error {
    /// Malformed row in a sample log. `line` is 1-based.
    #[from(skip)]
    #[display("line {line}: {reason}")]
    Parse { line: usize, reason: String },
    Config(ConfigError),
    Format(fmt::Error),

    // External
    Csv(csv::Error),
    IoError(io::Error),
    SerdeJson(serde_json::Error),
}

impl std::error::Error for Error {}
