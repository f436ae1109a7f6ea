use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while reading and analysing archive data.
#[derive(Error, Debug)]
pub enum ActivityError {
    /// Neither a data file nor a data directory was supplied, or a setting
    /// is otherwise unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The data directory does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// An archive file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line is not valid JSON. Recoverable: the reader skips the line.
    #[error("Malformed JSON on line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A line is valid JSON but does not describe an event. Recoverable.
    #[error("Invalid event on line {line}: {reason}")]
    Schema { line: usize, reason: String },

    /// A buffered `created_at` value is not `YYYY-MM-DDTHH:MM:SSZ`.
    #[error("Invalid timestamp format: {0}")]
    TimestampFormat(String),

    /// A query target is not a 24-hour `HH:MM:SS` time of day.
    #[error("Invalid time of day: {0}")]
    InvalidTimeOfDay(String),
}

impl ActivityError {
    /// `true` for errors the reader logs and skips instead of surfacing.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::Schema { .. })
    }
}

/// Convenience alias used throughout the activity crates.
pub type Result<T> = std::result::Result<T, ActivityError>;
