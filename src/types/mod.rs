//! Core data types for the session timer.
//!
//! This module defines the data structures used for:
//! - Session and stage definitions with validation
//! - Cue settings snapshots
//! - Engine state reporting
//! - Countdown formatting

mod error;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use error::SessionError;

/// Shortest allowed stage, in minutes.
pub const MIN_STAGE_MINUTES: u32 = 1;
/// Longest allowed stage, in minutes.
pub const MAX_STAGE_MINUTES: u32 = 180;
/// Longest allowed repeat interval, in minutes.
pub const MAX_REPEAT_MINUTES: u32 = 60;

// ============================================================================
// Stage
// ============================================================================

/// A timed phase of a session with its own duration, repeat cadence and
/// candidate cue sounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Display name (may be empty)
    #[serde(default)]
    pub name: String,
    /// Duration in minutes (1-180)
    pub minutes: u32,
    /// Repeat interval in minutes (0 = cue only on entry)
    #[serde(default)]
    pub repeat_minutes: u32,
    /// Candidate cue sounds, by library file name
    #[serde(default)]
    pub sounds: Vec<String>,
}

impl Stage {
    /// Creates a stage with no sounds and no repeat.
    pub fn new(name: impl Into<String>, minutes: u32) -> Self {
        Self {
            name: name.into(),
            minutes,
            repeat_minutes: 0,
            sounds: Vec::new(),
        }
    }

    /// Sets the repeat interval in minutes.
    pub fn with_repeat_minutes(mut self, minutes: u32) -> Self {
        self.repeat_minutes = minutes;
        self
    }

    /// Adds a candidate cue sound.
    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.sounds.push(sound.into());
        self
    }

    /// Stage length in seconds.
    pub fn duration_seconds(&self) -> u32 {
        self.minutes * 60
    }

    /// Repeat interval in seconds, or `None` when the cue fires only on entry.
    pub fn repeat_interval_seconds(&self) -> Option<u32> {
        self.has_repeat().then(|| self.repeat_minutes * 60)
    }

    /// Returns true if the stage re-fires its cue periodically.
    pub fn has_repeat(&self) -> bool {
        self.repeat_minutes > 0
    }

    /// Human readable repeat cadence.
    pub fn repeat_description(&self) -> String {
        if self.has_repeat() {
            format!("repeats every {} min", self.repeat_minutes)
        } else {
            "plays once".to_string()
        }
    }

    /// Validates the stage ranges.
    pub fn validate(&self) -> Result<(), SessionError> {
        if !(MIN_STAGE_MINUTES..=MAX_STAGE_MINUTES).contains(&self.minutes) {
            return Err(SessionError::InvalidStage {
                stage: self.name.clone(),
                reason: format!(
                    "duration must be {}-{} minutes, got {}",
                    MIN_STAGE_MINUTES, MAX_STAGE_MINUTES, self.minutes
                ),
            });
        }
        if self.repeat_minutes > MAX_REPEAT_MINUTES {
            return Err(SessionError::InvalidStage {
                stage: self.name.clone(),
                reason: format!(
                    "repeat interval must be 0-{} minutes, got {}",
                    MAX_REPEAT_MINUTES, self.repeat_minutes
                ),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Session
// ============================================================================

/// A named, ordered list of stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Display name
    pub name: String,
    /// Cached total length in minutes. Advisory only.
    #[serde(default)]
    pub total_minutes: u32,
    /// Ordered stages
    #[serde(default)]
    pub stages: Vec<Stage>,
}

impl Session {
    /// Creates a session and computes its total.
    pub fn new(name: impl Into<String>, stages: Vec<Stage>) -> Self {
        let mut session = Self {
            name: name.into(),
            total_minutes: 0,
            stages,
        };
        session.recompute_total_minutes();
        session
    }

    /// Rebuilds the cached total from the stage durations.
    pub fn recompute_total_minutes(&mut self) {
        self.total_minutes = self.stages.iter().map(|s| s.minutes).sum();
    }

    /// Sum of all stage durations in seconds.
    pub fn total_seconds(&self) -> u32 {
        self.stages.iter().map(Stage::duration_seconds).sum()
    }

    /// Validates every stage.
    pub fn validate(&self) -> Result<(), SessionError> {
        self.stages.iter().try_for_each(Stage::validate)
    }

    /// Parses a session from JSON.
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        serde_json::from_str(json).map_err(|e| SessionError::Parse(e.to_string()))
    }

    /// Reads, parses and validates a session file.
    pub fn from_json_file(path: &Path) -> Result<Self, SessionError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| SessionError::Read(format!("{}: {}", path.display(), e)))?;
        let mut session = Self::from_json(&json)?;
        session.validate()?;
        session.recompute_total_minutes();
        Ok(session)
    }
}

// ============================================================================
// Settings
// ============================================================================

fn default_sound_enabled() -> bool {
    true
}

fn default_vibration_enabled() -> bool {
    true
}

fn default_vibration_strength() -> i64 {
    50
}

fn default_screen_dim() -> i64 {
    30
}

/// On-disk form of [`Settings`], accepting out-of-range numbers.
#[derive(Debug, Deserialize)]
struct SettingsFile {
    #[serde(default = "default_sound_enabled")]
    sound_enabled: bool,
    #[serde(default = "default_vibration_enabled")]
    vibration_enabled: bool,
    #[serde(default = "default_vibration_strength")]
    vibration_strength_percent: i64,
    #[serde(default = "default_screen_dim")]
    screen_dim_percent: i64,
}

impl From<SettingsFile> for Settings {
    fn from(file: SettingsFile) -> Self {
        Settings {
            sound_enabled: file.sound_enabled,
            vibration_enabled: file.vibration_enabled,
            vibration_strength_percent: clamp_percent(file.vibration_strength_percent),
            screen_dim_percent: clamp_percent(file.screen_dim_percent),
        }
    }
}

fn clamp_percent(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

/// Snapshot of the user settings that influence cues.
///
/// Percentages are always within 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SettingsFile")]
pub struct Settings {
    /// Whether cues play audio
    pub sound_enabled: bool,
    /// Whether cues vibrate
    pub vibration_enabled: bool,
    /// Vibration strength (0 disables vibration)
    pub vibration_strength_percent: u8,
    /// Screen dim level, passed through to presentation
    pub screen_dim_percent: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: default_sound_enabled(),
            vibration_enabled: default_vibration_enabled(),
            vibration_strength_percent: clamp_percent(default_vibration_strength()),
            screen_dim_percent: clamp_percent(default_screen_dim()),
        }
    }
}

impl Settings {
    /// Returns a copy with the sound toggle changed.
    pub fn with_sound_enabled(mut self, enabled: bool) -> Self {
        self.sound_enabled = enabled;
        self
    }

    /// Returns a copy with the vibration toggle changed.
    pub fn with_vibration_enabled(mut self, enabled: bool) -> Self {
        self.vibration_enabled = enabled;
        self
    }

    /// Returns a copy with the vibration strength changed, clamped to 0-100.
    pub fn with_vibration_strength(mut self, percent: i64) -> Self {
        self.vibration_strength_percent = clamp_percent(percent);
        self
    }

    /// Returns a copy with the screen dim level changed, clamped to 0-100.
    pub fn with_screen_dim(mut self, percent: i64) -> Self {
        self.screen_dim_percent = clamp_percent(percent);
        self
    }

    /// Returns true if cues should vibrate at all.
    pub fn vibrates(&self) -> bool {
        self.vibration_enabled && self.vibration_strength_percent > 0
    }
}

// ============================================================================
// EngineState
// ============================================================================

/// Lifecycle state of the timer engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// Initialized, not yet started
    #[default]
    Idle,
    /// Counting down
    Running,
    /// Counting suspended
    Paused,
    /// Every stage ran to the end
    Completed,
    /// Stopped before the end
    Stopped,
}

impl EngineState {
    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineState::Idle => "idle",
            EngineState::Running => "running",
            EngineState::Paused => "paused",
            EngineState::Completed => "completed",
            EngineState::Stopped => "stopped",
        }
    }

    /// Returns true for `Completed` and `Stopped`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EngineState::Completed | EngineState::Stopped)
    }
}

/// Formats seconds as `mm:ss`.
pub fn format_duration(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod stage_tests {
        use super::*;

        #[test]
        fn test_builder() {
            let stage = Stage::new("Focus", 20)
                .with_repeat_minutes(5)
                .with_sound("chime.mp3")
                .with_sound("rain.wav");

            assert_eq!(stage.duration_seconds(), 1200);
            assert_eq!(stage.repeat_interval_seconds(), Some(300));
            assert_eq!(stage.sounds, vec!["chime.mp3", "rain.wav"]);
        }

        #[test]
        fn test_no_repeat() {
            let stage = Stage::new("Warm up", 5);
            assert!(!stage.has_repeat());
            assert_eq!(stage.repeat_interval_seconds(), None);
            assert_eq!(stage.repeat_description(), "plays once");
        }

        #[test]
        fn test_repeat_description() {
            let stage = Stage::new("Focus", 20).with_repeat_minutes(4);
            assert_eq!(stage.repeat_description(), "repeats every 4 min");
        }

        #[test]
        fn test_validate_boundary_values() {
            assert!(Stage::new("a", 1).validate().is_ok());
            assert!(Stage::new("a", 180).validate().is_ok());
            assert!(Stage::new("a", 10).with_repeat_minutes(60).validate().is_ok());
        }

        #[test]
        fn test_validate_duration_out_of_range() {
            let err = Stage::new("Zero", 0).validate().unwrap_err();
            assert!(err.to_string().contains("Zero"));
            assert!(Stage::new("Long", 181).validate().is_err());
        }

        #[test]
        fn test_validate_repeat_out_of_range() {
            let err = Stage::new("a", 90)
                .with_repeat_minutes(61)
                .validate()
                .unwrap_err();
            assert!(err.is_invalid_stage());
        }

        #[test]
        fn test_deserialize_defaults() {
            let stage: Stage = serde_json::from_str(r#"{"minutes": 3}"#).unwrap();
            assert_eq!(stage.name, "");
            assert_eq!(stage.repeat_minutes, 0);
            assert!(stage.sounds.is_empty());
        }
    }

    mod session_tests {
        use super::*;

        #[test]
        fn test_new_computes_total() {
            let session = Session::new(
                "Morning",
                vec![Stage::new("a", 5), Stage::new("b", 20), Stage::new("c", 5)],
            );
            assert_eq!(session.total_minutes, 30);
            assert_eq!(session.total_seconds(), 1800);
        }

        #[test]
        fn test_from_json_ignores_stale_total() {
            let json = r#"{
                "name": "Evening",
                "total_minutes": 99,
                "stages": [{"name": "Relax", "minutes": 10, "sounds": ["bell.mp3"]}]
            }"#;
            let mut session = Session::from_json(json).unwrap();
            assert_eq!(session.total_minutes, 99);
            session.recompute_total_minutes();
            assert_eq!(session.total_minutes, 10);
        }

        #[test]
        fn test_from_json_invalid() {
            let err = Session::from_json("{not json").unwrap_err();
            assert!(matches!(err, SessionError::Parse(_)));
        }

        #[test]
        fn test_from_json_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("session.json");
            std::fs::write(
                &path,
                r#"{"name": "S", "stages": [{"minutes": 2}, {"minutes": 3}]}"#,
            )
            .unwrap();

            let session = Session::from_json_file(&path).unwrap();
            assert_eq!(session.stages.len(), 2);
            assert_eq!(session.total_minutes, 5);
        }

        #[test]
        fn test_from_json_file_rejects_invalid_stage() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("session.json");
            std::fs::write(&path, r#"{"name": "S", "stages": [{"minutes": 500}]}"#).unwrap();

            let err = Session::from_json_file(&path).unwrap_err();
            assert!(err.is_invalid_stage());
        }

        #[test]
        fn test_from_json_file_missing() {
            let err = Session::from_json_file(Path::new("/nonexistent/session.json")).unwrap_err();
            assert!(matches!(err, SessionError::Read(_)));
        }
    }

    mod settings_tests {
        use super::*;

        #[test]
        fn test_default_values() {
            let settings = Settings::default();
            assert!(settings.sound_enabled);
            assert!(settings.vibration_enabled);
            assert_eq!(settings.vibration_strength_percent, 50);
            assert_eq!(settings.screen_dim_percent, 30);
        }

        #[test]
        fn test_builders_clamp() {
            let settings = Settings::default()
                .with_vibration_strength(150)
                .with_screen_dim(-5);
            assert_eq!(settings.vibration_strength_percent, 100);
            assert_eq!(settings.screen_dim_percent, 0);
        }

        #[test]
        fn test_vibrates() {
            assert!(Settings::default().vibrates());
            assert!(!Settings::default().with_vibration_strength(0).vibrates());
            assert!(!Settings::default().with_vibration_enabled(false).vibrates());
        }

        #[test]
        fn test_deserialize_clamps_and_defaults() {
            let settings: Settings =
                serde_json::from_str(r#"{"vibration_strength_percent": 400}"#).unwrap();
            assert_eq!(settings.vibration_strength_percent, 100);
            assert!(settings.sound_enabled);
            assert_eq!(settings.screen_dim_percent, 30);
        }

        #[test]
        fn test_serialize_deserialize() {
            let settings = Settings::default().with_sound_enabled(false);
            let json = serde_json::to_string(&settings).unwrap();
            let back: Settings = serde_json::from_str(&json).unwrap();
            assert_eq!(back, settings);
        }
    }

    mod engine_state_tests {
        use super::*;

        #[test]
        fn test_default_is_idle() {
            assert_eq!(EngineState::default(), EngineState::Idle);
        }

        #[test]
        fn test_is_terminal() {
            assert!(!EngineState::Idle.is_terminal());
            assert!(!EngineState::Running.is_terminal());
            assert!(!EngineState::Paused.is_terminal());
            assert!(EngineState::Completed.is_terminal());
            assert!(EngineState::Stopped.is_terminal());
        }

        #[test]
        fn test_as_str() {
            assert_eq!(EngineState::Running.as_str(), "running");
            assert_eq!(EngineState::Completed.as_str(), "completed");
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(59), "00:59");
        assert_eq!(format_duration(61), "01:01");
        assert_eq!(format_duration(180 * 60), "180:00");
    }
}
