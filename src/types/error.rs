//! Session definition error types.

use thiserror::Error;

/// Errors that can occur while loading a session definition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The session file could not be read.
    #[error("failed to read session file: {0}")]
    Read(String),

    /// The session file is not valid JSON for a session.
    #[error("failed to parse session: {0}")]
    Parse(String),

    /// A stage is outside the allowed ranges.
    #[error("invalid stage '{stage}': {reason}")]
    InvalidStage {
        /// Stage name
        stage: String,
        /// What is wrong with it
        reason: String,
    },
}

impl SessionError {
    /// Returns true if a stage failed validation.
    #[must_use]
    pub fn is_invalid_stage(&self) -> bool {
        matches!(self, Self::InvalidStage { .. })
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Read(_) => "check that the session file exists and is readable",
            Self::Parse(_) => "check the session file for JSON syntax errors",
            Self::InvalidStage { .. } => {
                "stages must last 1-180 minutes and repeat at most every 60 minutes"
            }
        }
    }
}
