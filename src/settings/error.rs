//! Settings file error types.

use thiserror::Error;

/// Errors that can occur while reading the settings file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings: {0}")]
    Read(String),

    /// The settings file is not valid JSON.
    #[error("failed to parse settings: {0}")]
    Parse(String),
}

impl SettingsError {
    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Read(_) => "check the settings file permissions",
            Self::Parse(_) => "fix or delete the settings file to restore defaults",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SettingsError::Parse("expected value".to_string());
        assert_eq!(err.to_string(), "failed to parse settings: expected value");
    }

    #[test]
    fn test_suggestion() {
        assert!(SettingsError::Parse("x".into()).suggestion().contains("delete"));
        assert!(SettingsError::Read("x".into()).suggestion().contains("permissions"));
    }
}
