//! Observable engine outputs.
//!
//! The engine pushes every change as an [`EngineEvent`] over an unbounded
//! channel and mirrors the latest value of each output in an
//! [`EngineOutputs`] snapshot, so presentation code can either subscribe or
//! poll.

use crate::cue::CueKind;
use crate::types::EngineState;

// ============================================================================
// EngineEvent
// ============================================================================

/// A single change to one of the engine's observable outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine state changed
    StateChanged(EngineState),
    /// Remaining time in the current stage, `mm:ss`
    Countdown(String),
    /// Name of the current stage
    StageTitle(String),
    /// Position of the current stage, `i/n`
    StageCounter(String),
    /// Name of the following stage, empty when there is none
    NextStage(String),
    /// Stage completion text, published on completion or stop
    Summary(String),
    /// Total elapsed session time, `mm:ss`
    SessionTotal(String),
    /// Transient error message (a cue was skipped)
    Error(String),
    /// Screen dim level to apply while the session is shown
    ScreenDim(u8),
    /// A cue was dispatched
    CueFired {
        /// Why the cue fired
        kind: CueKind,
        /// Stage the cue belongs to (0-based)
        stage_index: usize,
        /// Sound handed to the player, if any
        sound: Option<String>,
        /// Whether a vibration pulse was sent
        vibrated: bool,
    },
}

// ============================================================================
// EngineOutputs
// ============================================================================

/// Latest value of every observable output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutputs {
    pub state: EngineState,
    pub countdown: String,
    pub stage_title: String,
    pub stage_counter: String,
    pub next_stage: String,
    pub summary: String,
    pub session_total: String,
    /// Most recent error message; cleared on `initialize`
    pub error: Option<String>,
    pub screen_dim_percent: u8,
}

impl EngineOutputs {
    /// Records an event in the snapshot.
    pub fn apply(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::StateChanged(state) => self.state = *state,
            EngineEvent::Countdown(text) => self.countdown.clone_from(text),
            EngineEvent::StageTitle(text) => self.stage_title.clone_from(text),
            EngineEvent::StageCounter(text) => self.stage_counter.clone_from(text),
            EngineEvent::NextStage(text) => self.next_stage.clone_from(text),
            EngineEvent::Summary(text) => self.summary.clone_from(text),
            EngineEvent::SessionTotal(text) => self.session_total.clone_from(text),
            EngineEvent::Error(text) => self.error = Some(text.clone()),
            EngineEvent::ScreenDim(percent) => self.screen_dim_percent = *percent,
            EngineEvent::CueFired { .. } => {}
        }
    }
}

// ============================================================================
// SessionSummary
// ============================================================================

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Stages that ran to the end
    pub completed_stages: usize,
    /// Stages in the session
    pub total_stages: usize,
    /// Seconds counted while running
    pub elapsed_seconds: u32,
    /// `Completed` or `Stopped`
    pub outcome: EngineState,
    /// Whether the stop came from the user
    pub user_initiated: bool,
}

impl SessionSummary {
    /// Stage completion text shown at the end of a session.
    #[must_use]
    pub fn text(&self) -> String {
        match self.outcome {
            EngineState::Completed => format!(
                "Completed {}/{} stages",
                self.completed_stages, self.total_stages
            ),
            _ => format!(
                "Stopped after {}/{} stages",
                self.completed_stages, self.total_stages
            ),
        }
    }

    /// Returns true if every stage ran to the end.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.outcome == EngineState::Completed
    }
}
