//! Sound library and cue playback.
//!
//! This module provides the two sound-facing collaborators of the timer:
//!
//! - A sound library that lists the playable sounds by file name
//! - A cue player that plays one sound at a time, non-blocking
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │  CueDispatcher   │────▶│   SoundLibrary   │  list_available_sound_names()
//! │                  │     └──────────────────┘
//! │                  │     ┌──────────────────┐
//! │                  │────▶│    CuePlayer     │  play(name) / stop()
//! └──────────────────┘     └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use meditimer::sound::{DirectorySoundLibrary, RodioCuePlayer, SoundLibrary};
//!
//! let library = DirectorySoundLibrary::new("/home/me/Music/meditimer");
//! let names = library.list_available_sound_names().unwrap_or_default();
//!
//! let player = RodioCuePlayer::new(library).expect("audio init");
//! if let Some(first) = names.iter().next() {
//!     player.play(first).expect("playback failed");
//! }
//! ```

mod error;
mod library;
mod player;

pub use error::SoundError;
pub use library::{
    default_library_dir, is_supported_audio_file, DirectorySoundLibrary, MockSoundLibrary,
    SoundLibrary, SUPPORTED_EXTENSIONS,
};
pub use player::{try_create_player, RodioCuePlayer};

/// Trait for cue playback implementations.
///
/// This trait abstracts the playback primitive, allowing for different
/// implementations (e.g., rodio-based, silent, mock for testing).
pub trait CuePlayer {
    /// Starts playing the named sound.
    ///
    /// This method should be non-blocking; the sound plays in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if playback fails.
    fn play(&self, sound_name: &str) -> Result<(), SoundError>;

    /// Stops the sound currently playing. No-op when nothing plays.
    fn stop(&self);
}

impl CuePlayer for RodioCuePlayer {
    fn play(&self, sound_name: &str) -> Result<(), SoundError> {
        RodioCuePlayer::play(self, sound_name)
    }

    fn stop(&self) {
        RodioCuePlayer::stop(self)
    }
}

/// Player used when no audio device is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCuePlayer;

impl CuePlayer for SilentCuePlayer {
    fn play(&self, sound_name: &str) -> Result<(), SoundError> {
        tracing::debug!("No audio device, not playing {}", sound_name);
        Ok(())
    }

    fn stop(&self) {}
}

/// Mock cue player for testing.
#[derive(Debug, Default)]
pub struct MockCuePlayer {
    play_calls: std::sync::Mutex<Vec<String>>,
    stop_calls: std::sync::atomic::AtomicUsize,
    playing: std::sync::atomic::AtomicBool,
    should_fail: std::sync::atomic::AtomicBool,
}

impl MockCuePlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail
            .store(should_fail, std::sync::atomic::Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_calls.lock().unwrap().len()
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<String> {
        self.play_calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.stop_calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn clear_calls(&self) {
        self.play_calls.lock().unwrap().clear();
        self.stop_calls.store(0, std::sync::atomic::Ordering::SeqCst);
    }
}

impl CuePlayer for MockCuePlayer {
    fn play(&self, sound_name: &str) -> Result<(), SoundError> {
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        self.play_calls.lock().unwrap().push(sound_name.to_string());
        self.playing
            .store(true, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.stop_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.playing
            .store(false, std::sync::atomic::Ordering::SeqCst);
    }
}
