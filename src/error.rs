//! Error types shared across the crate

use thiserror::Error;

/// Failures of the underlying key-value store.
///
/// These never escape the stat store: they are logged and the in-memory
/// value stays authoritative.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("blocking write task failed: {0}")]
    Join(String),
}

/// Rejected session plans
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("a session plan needs at least one exercise")]
    NoExercises,

    #[error("a session plan needs at least one round")]
    NoRounds,

    #[error("at most {max} rounds are allowed, got {got}")]
    TooManyRounds { got: u32, max: u32 },

    #[error("rest must be at most {max} seconds, got {got}")]
    RestTooLong { got: u32, max: u32 },

    #[error("exercise '{0}' has a zero-second duration")]
    ZeroDuration(String),

    #[error("meditation length must be between 1 and {max} minutes, got {got}")]
    MeditationLength { got: u32, max: u32 },
}

/// Input rejected by one of the trackers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} must be a positive number, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("no {kind} with id {id}")]
    NotFound { kind: &'static str, id: u64 },
}

/// Chat generation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("message must not be empty")]
    EmptyMessage,

    #[error("no text generator is configured")]
    Unavailable,

    #[error("text generation failed: {0}")]
    Generation(String),
}
