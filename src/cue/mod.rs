//! Cue dispatch.
//!
//! A cue is the sound and vibration fired when a stage begins and, for
//! stages with a repeat interval, periodically while it runs. The
//! [`CueDispatcher`] decides what to fire:
//!
//! 1. Pick a sound from the stage's candidates (uniformly at random when
//!    there are several)
//! 2. Check the pick against the sound library listing
//! 3. Stop the previous cue and play the new one
//! 4. Pulse the vibrator, scaled to the configured strength
//!
//! Dispatch never fails. Problems come back inside the [`CueOutcome`] so the
//! engine can surface them without interrupting the session.

mod error;
mod vibration;

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use tracing::{debug, warn};

use crate::sound::{CuePlayer, SoundLibrary};
use crate::types::{Settings, Stage};

pub use error::CueError;
pub use vibration::{
    amplitude_for_strength, MockVibrator, NoopVibrator, Vibrator, MAX_AMPLITUDE, MIN_AMPLITUDE,
    PULSE_DURATION_MS,
};

/// Why a cue is being fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueKind {
    /// A stage has just been entered
    StageEntry,
    /// The stage's repeat interval elapsed
    Repeat,
}

/// What happened to the sound part of a cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundOutcome {
    /// The named sound was handed to the player
    Played(String),
    /// The stage has no candidate sounds
    NoSounds,
    /// Sound is switched off in the settings
    SoundDisabled,
    /// The sound could not be played
    Failed(CueError),
}

/// Result of a single dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueOutcome {
    /// Why the cue fired
    pub kind: CueKind,
    /// Sound result
    pub sound: SoundOutcome,
    /// Whether a vibration pulse was sent
    pub vibrated: bool,
}

impl CueOutcome {
    /// Returns the error to surface, if any.
    #[must_use]
    pub fn error(&self) -> Option<&CueError> {
        match &self.sound {
            SoundOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the sound that was played, if any.
    #[must_use]
    pub fn played(&self) -> Option<&str> {
        match &self.sound {
            SoundOutcome::Played(name) => Some(name),
            _ => None,
        }
    }
}

/// Decides and fires the sound and vibration for a cue.
pub struct CueDispatcher {
    library: Arc<dyn SoundLibrary>,
    player: Arc<dyn CuePlayer>,
    vibrator: Arc<dyn Vibrator>,
    rng: Box<dyn RngCore>,
}

impl CueDispatcher {
    /// Creates a dispatcher seeded from OS entropy.
    pub fn new(
        library: Arc<dyn SoundLibrary>,
        player: Arc<dyn CuePlayer>,
        vibrator: Arc<dyn Vibrator>,
    ) -> Self {
        Self {
            library,
            player,
            vibrator,
            rng: Box::new(StdRng::from_entropy()),
        }
    }

    /// Replaces the random source used to pick among candidate sounds.
    #[must_use]
    pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Replaces the random source with a seeded one.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    /// Fires the cue for `stage` under the given settings.
    pub fn dispatch(&mut self, stage: &Stage, settings: &Settings, kind: CueKind) -> CueOutcome {
        let sound = if settings.sound_enabled {
            self.play_stage_sound(stage)
        } else {
            debug!("Sound disabled, skipping {:?} cue sound", kind);
            SoundOutcome::SoundDisabled
        };
        let vibrated = self.vibrate(settings);

        CueOutcome {
            kind,
            sound,
            vibrated,
        }
    }

    /// Picks one of the candidate sounds.
    ///
    /// Returns `None` for an empty list and the only entry for a single one.
    pub fn select_sound<'a>(&mut self, sounds: &'a [String]) -> Option<&'a str> {
        match sounds {
            [] => None,
            [only] => Some(only.as_str()),
            _ => sounds.choose(self.rng.as_mut()).map(String::as_str),
        }
    }

    /// Stops any cue sound still playing.
    pub fn silence(&self) {
        self.player.stop();
    }

    fn play_stage_sound(&mut self, stage: &Stage) -> SoundOutcome {
        let Some(sound) = self.select_sound(&stage.sounds).map(str::to_owned) else {
            return SoundOutcome::NoSounds;
        };

        if !self.available_sounds().contains(&sound) {
            warn!("Cue sound '{}' is not in the library", sound);
            return SoundOutcome::Failed(CueError::MissingSound(sound));
        }

        self.player.stop();
        match self.player.play(&sound) {
            Ok(()) => {
                debug!("Playing cue sound '{}'", sound);
                SoundOutcome::Played(sound)
            }
            Err(e) => {
                warn!("Failed to play cue sound '{}': {}", sound, e);
                SoundOutcome::Failed(CueError::PlaybackFailed {
                    sound,
                    reason: e.to_string(),
                })
            }
        }
    }

    fn available_sounds(&self) -> BTreeSet<String> {
        self.library.list_available_sound_names().unwrap_or_else(|e| {
            warn!("Sound library unavailable, treating as empty: {}", e);
            BTreeSet::new()
        })
    }

    fn vibrate(&self, settings: &Settings) -> bool {
        if !settings.vibrates() || !self.vibrator.has_vibrator() {
            return false;
        }
        match amplitude_for_strength(settings.vibration_strength_percent) {
            Some(amplitude) => {
                self.vibrator.pulse(amplitude, PULSE_DURATION_MS);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for CueDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CueDispatcher").finish_non_exhaustive()
    }
}
