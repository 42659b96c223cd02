//! Typed errors for schedule parsing and storage.

use std::path::PathBuf;

/// Errors raised by the schedule layer (time parsing and stores).
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// A time-of-day string that is not `H:mm` / `HH:mm` within a single day.
    #[error("invalid time of day: {0:?} (expected HH:mm)")]
    InvalidTime(String),

    /// No entry with the given id exists in the store.
    #[error("schedule entry not found: {0}")]
    NotFound(String),

    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not a valid schedule document.
    #[error("malformed schedule file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A store's internal lock was poisoned by a panicking writer.
    #[error("schedule store lock poisoned")]
    Poisoned,
}

/// Convenience result type for the schedule layer.
pub type Result<T> = std::result::Result<T, ScheduleError>;
