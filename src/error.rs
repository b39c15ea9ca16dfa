//! Error types for the assignment engine.
//!
//! Only malformed input and bad configuration surface as errors. Requisites that cannot be
//! satisfied and solver failures are absorbed into the result as zero contribution.

use thiserror::Error;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum AssignError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Input rejected before any course is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("{argument} must be a list")]
    NotASequence { argument: &'static str },

    #[error("catalog entry #{index} is not a course: {reason}")]
    MalformedCourse { index: usize, reason: String },

    #[error("course code {0:?} appears more than once in the catalog")]
    DuplicateCourse(String),

    #[error("tag {0:?} is used by more than one requirement rule")]
    TagCollision(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },

    #[error("Solver backend {0:?} is not compiled into this build")]
    BackendUnavailable(String),
}

impl AssignError {
    /// Check if this error rejects the caller's input (as opposed to the engine setup).
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Result type alias for the engine.
pub type Result<T> = std::result::Result<T, AssignError>;
