//! Cue player implementation using rodio.
//!
//! This module provides the `RodioCuePlayer` which plays library sounds
//! through rodio. At most one cue plays at a time: starting a new cue stops
//! the previous one.

use std::fs::File;
use std::io::BufReader;
use std::sync::Mutex;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use super::error::SoundError;
use super::library::DirectorySoundLibrary;

/// A cue player that uses rodio for audio playback.
///
/// Playback is non-blocking; the current cue keeps playing in the
/// background until it finishes, `stop` is called, or a new cue starts.
pub struct RodioCuePlayer {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    /// Handle to the output stream for creating sinks.
    stream_handle: OutputStreamHandle,
    /// Library used to resolve sound names to files.
    library: DirectorySoundLibrary,
    /// Sink of the cue currently playing, if any.
    current: Mutex<Option<Sink>>,
}

impl RodioCuePlayer {
    /// Creates a new cue player for the given library.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new(library: DirectorySoundLibrary) -> Result<Self, SoundError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            stream_handle,
            library,
            current: Mutex::new(None),
        })
    }

    /// Plays a library sound by name, replacing any cue already playing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The sound cannot be resolved or opened
    /// - The audio format cannot be decoded
    /// - The output sink cannot be created
    pub fn play(&self, sound_name: &str) -> Result<(), SoundError> {
        self.stop();

        let path = self
            .library
            .path_for(sound_name)
            .ok_or_else(|| SoundError::FileNotFound(sound_name.to_string()))?;
        let file = File::open(&path)
            .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path.display(), e)))?;
        let decoder =
            Decoder::new(BufReader::new(file)).map_err(|e| SoundError::DecodeError(e.to_string()))?;

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| SoundError::StreamError(e.to_string()))?;
        sink.append(decoder);

        debug!("Cue playback started: {}", sound_name);
        *self.lock_current() = Some(sink);
        Ok(())
    }

    /// Stops the current cue, if any.
    pub fn stop(&self) {
        if let Some(sink) = self.lock_current().take() {
            sink.stop();
            debug!("Cue playback stopped");
        }
    }

    /// Returns true while a cue is still playing.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.lock_current()
            .as_ref()
            .is_some_and(|sink| !sink.empty())
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, Option<Sink>> {
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for RodioCuePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioCuePlayer")
            .field("library", &self.library.root())
            .finish_non_exhaustive()
    }
}

/// Creates a cue player, returning None if audio is unavailable.
///
/// If audio initialization fails, a warning is logged and None is returned.
#[must_use]
pub fn try_create_player(library: DirectorySoundLibrary) -> Option<RodioCuePlayer> {
    match RodioCuePlayer::new(library) {
        Ok(player) => Some(player),
        Err(e) => {
            warn!("Audio not available, cue sounds disabled: {}", e);
            None
        }
    }
}
