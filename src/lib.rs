//! Meditimer Library
//!
//! This library provides the core functionality for the meditimer CLI.
//! It includes:
//! - Timer engine driving multi-stage sessions through time
//! - Cue dispatch (sound selection, playback and vibration)
//! - Tick schedulers (tokio-backed and a virtual clock for tests)
//! - Sound library listing and rodio-based cue playback
//! - Settings providers
//! - CLI command parsing, display and the terminal session runner
//! - Type definitions for sessions, stages and settings

pub mod cli;
pub mod cue;
pub mod engine;
pub mod settings;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{format_duration, EngineState, Session, SessionError, Settings, Stage};

// Re-export engine types
pub use engine::{
    EngineEvent, EngineOutputs, KeepAwake, ManualScheduler, Scheduler, SessionSummary,
    TimerEngine, TokioScheduler,
};

// Re-export cue types
pub use cue::{CueDispatcher, CueError, CueKind, CueOutcome, Vibrator};

// Re-export sound types
pub use sound::{CuePlayer, DirectorySoundLibrary, SoundError, SoundLibrary};

// Re-export settings types
pub use settings::{FileSettingsProvider, SettingsProvider};
