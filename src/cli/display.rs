//! Display utilities for the meditimer CLI.
//!
//! This module provides formatted output for:
//! - Engine events while a session runs
//! - Session file checks
//! - Sound library listings
//! - Error messages

use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use crate::cue::CueKind;
use crate::engine::{EngineEvent, SessionSummary};
use crate::types::{format_duration, EngineState, Session};

/// Shown in place of an empty stage name.
const UNTITLED_STAGE: &str = "(untitled stage)";

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows one engine event.
    ///
    /// Countdown updates rewrite the current line; everything else gets a
    /// line of its own.
    pub fn show_event(event: &EngineEvent) {
        if let EngineEvent::Countdown(text) = event {
            print!("\r  {}  ", text);
            let _ = std::io::stdout().flush();
            return;
        }
        if let Some(line) = Self::format_event(event) {
            println!("\r{}", line);
        }
    }

    /// Formats an event as a line, or `None` for events shown elsewhere.
    pub fn format_event(event: &EngineEvent) -> Option<String> {
        match event {
            EngineEvent::StateChanged(state) => Self::format_state(*state).map(str::to_string),
            EngineEvent::StageTitle(title) => Some(format!("> {}", Self::stage_title(title))),
            EngineEvent::StageCounter(counter) if counter != "0/0" => {
                Some(format!("  Stage {}", counter))
            }
            EngineEvent::NextStage(next) if !next.is_empty() => {
                Some(format!("  Next: {}", next))
            }
            EngineEvent::Summary(text) if !text.is_empty() => Some(format!("* {}", text)),
            EngineEvent::SessionTotal(total) if total != "00:00" => {
                Some(format!("  Total time: {}", total))
            }
            EngineEvent::Error(message) => Some(format!("! {}", message)),
            EngineEvent::CueFired {
                kind: CueKind::Repeat,
                sound: Some(sound),
                ..
            } => Some(format!("  ~ {}", sound)),
            _ => None,
        }
    }

    /// Shows the summary after a session has ended.
    pub fn show_summary(summary: &SessionSummary) {
        println!();
        println!("{}", summary.text());
        println!("Time: {}", format_duration(summary.elapsed_seconds));
    }

    /// Shows a validated session.
    pub fn show_check(session: &Session) {
        println!("Session: {}", session.name);
        println!("─────────────────────────────");

        for (i, stage) in session.stages.iter().enumerate() {
            println!(
                "{:>2}. {} ({} min, {})",
                i + 1,
                Self::stage_title(&stage.name),
                stage.minutes,
                stage.repeat_description()
            );
            if !stage.sounds.is_empty() {
                println!("    sounds: {}", stage.sounds.join(", "));
            }
        }

        println!(
            "Total: {} min ({} stages)",
            session.total_minutes,
            session.stages.len()
        );
    }

    /// Shows the sound library listing.
    pub fn show_sounds(dir: &Path, sounds: &BTreeSet<String>) {
        println!("Sound library: {}", dir.display());
        if sounds.is_empty() {
            println!("  (no sounds)");
            return;
        }
        for sound in sounds {
            println!("  {}", sound);
        }
    }

    /// Shows the interactive command help.
    pub fn show_controls(started: bool) {
        if !started {
            println!("Type `s` to start.");
        }
        println!("Commands: p pause, r resume, q stop, sound on|off, vibration on|off");
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Shows how to resolve the last error.
    pub fn show_hint(hint: &str) {
        eprintln!("  hint: {}", hint);
    }

    fn format_state(state: EngineState) -> Option<&'static str> {
        match state {
            EngineState::Running => Some("> Running"),
            EngineState::Paused => Some("|| Paused"),
            EngineState::Stopped => Some("[] Stopped"),
            EngineState::Completed => Some("* Completed"),
            EngineState::Idle => None,
        }
    }

    fn stage_title(name: &str) -> &str {
        if name.is_empty() {
            UNTITLED_STAGE
        } else {
            name
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
