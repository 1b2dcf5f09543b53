//! Sound system error types.
//!
//! This module defines the error types for the sound library and the cue
//! player. None of them are fatal to a running session: the dispatcher
//! reports them and the session keeps counting down.

use thiserror::Error;

/// Errors that can occur in the sound library or during playback.
#[derive(Debug, Error)]
pub enum SoundError {
    /// Audio device is not available (e.g., no speakers connected).
    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// Sound file was not found at the specified path.
    #[error("sound file not found: {0}")]
    FileNotFound(String),

    /// Failed to decode the audio file.
    #[error("failed to decode sound file: {0}")]
    DecodeError(String),

    /// Failed to create the audio output stream.
    #[error("failed to create audio stream: {0}")]
    StreamError(String),

    /// Generic sound playback error.
    #[error("sound playback error: {0}")]
    PlaybackError(String),

    /// The sound library could not be enumerated.
    #[error("failed to list sound library: {0}")]
    ListingError(String),
}

impl SoundError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_) | Self::StreamError(_))
    }

    /// Returns true if this error is related to the audio file.
    #[must_use]
    pub fn is_file_error(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::DecodeError(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::DeviceNotAvailable(_) => "connect an audio output device",
            Self::FileNotFound(_) => "re-import the sound into the library",
            Self::DecodeError(_) => "the sound file may be corrupted",
            Self::StreamError(_) => "check the audio settings",
            Self::PlaybackError(_) => "restart the application",
            Self::ListingError(_) => "check that the sound library directory is readable",
        }
    }
}
