//! Cue dispatch error types.

use thiserror::Error;

/// Errors reported by the cue dispatcher.
///
/// These never interrupt a session; the engine publishes them as transient
/// error messages and keeps running.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CueError {
    /// The selected sound is not in the sound library.
    #[error("sound '{0}' is missing from the library")]
    MissingSound(String),

    /// The player failed to start the selected sound.
    #[error("failed to play sound '{sound}': {reason}")]
    PlaybackFailed {
        /// Sound name
        sound: String,
        /// Player error text
        reason: String,
    },
}

impl CueError {
    /// Returns the name of the sound the error concerns.
    #[must_use]
    pub fn sound_name(&self) -> &str {
        match self {
            Self::MissingSound(sound) | Self::PlaybackFailed { sound, .. } => sound,
        }
    }

    /// Returns true if the sound was absent from the library.
    #[must_use]
    pub fn is_missing_sound(&self) -> bool {
        matches!(self, Self::MissingSound(_))
    }
}
