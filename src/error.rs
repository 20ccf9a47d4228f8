//! Error types for timetable loading and persistence.
//!
//! Placement failures are not errors: they are reported per session in
//! [`ScheduleOutcome`](crate::scheduler::ScheduleOutcome).

use thiserror::Error;

/// Result type for fallible timetable operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to external collaborators (loaders, persistence).
#[derive(Error, Debug)]
pub enum Error {
    /// Source data could not be turned into records.
    #[error("Load failed: {0}")]
    Load(String),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration parsed but holds an unusable value.
    #[error("Invalid configuration value: {0}")]
    ConfigValue(String),

    /// I/O error while reading or writing a snapshot.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
