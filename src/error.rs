use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlannerError>;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// A ratio, capacity, cost or sampling pool the caller supplied is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The timetable store has no file yet. Callers fall back to generation.
    #[error("timetable not found at {0}")]
    TimetableNotFound(PathBuf),

    #[error("failed to read timetable from {path}: {source}")]
    StoreReadFailure {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write timetable to {path}: {source}")]
    StoreWriteFailure {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to load admission dataset from {path}: {source}")]
    Dataset {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("no admission records for year {0}")]
    UnknownYear(i32),

    #[error("failed to load model from {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    #[error("model expects {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl PlannerError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        PlannerError::InvalidConfiguration(message.into())
    }
}
