use thiserror::Error;

use crate::types::RiskFactor;

/// Record decoding errors.
///
/// Every variant carries the 1-based line number of the offending line so an
/// operator can find it in the flat record file.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("line {line}: missing field `{field}`")]
    MissingField { line: usize, field: &'static str },

    #[error("line {line}: invalid value `{value}` for field `{field}`")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: asset type {value} outside 1..=13")]
    TypeOutOfRange { line: usize, value: i64 },

    #[error("line {line}: location {value} outside 1..=50")]
    LocationOutOfRange { line: usize, value: i64 },

    #[error("line {line}: {factor} table declares {count} points (max 10)")]
    TooManyPoints {
        line: usize,
        factor: RiskFactor,
        count: i64,
    },

    #[error("line {line}: unexpected trailing field `{value}`")]
    TrailingField { line: usize, value: String },

    #[error("line {line}: duplicate asset id {id}")]
    DuplicateId { line: usize, id: u32 },
}

/// Main crate error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying file I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed record
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Stream ended before the end-of-stream sentinel line
    #[error("Incomplete record stream: no end-of-stream marker after line {last_line}")]
    Incomplete { last_line: usize },

    /// Attempt to add an 11th point to an improvement table
    #[error("Improvement table is full ({capacity} points)")]
    TableFull { capacity: usize },

    /// Percentage outside 0..=100
    #[error("Percentage out of range: {0} (expected 0..=100)")]
    PercentOutOfRange(i64),

    /// Invalid configuration value
    #[error("Config error: {0}")]
    Config(String),

    /// TOML config parse error
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML config serialization error
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a config error from anything displayable.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Whether this error means the producer stopped before finishing the file.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Error::Incomplete { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
