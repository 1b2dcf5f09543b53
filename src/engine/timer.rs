//! Timer engine for guided sessions.
//!
//! This module provides the session state machine:
//! - State transitions (Idle → Running ⇄ Paused → Completed / Stopped)
//! - Per-second countdown driven by an injected [`Scheduler`]
//! - Stage entry and repeat cues through the [`CueDispatcher`]
//! - Keep-awake handling while a session runs
//! - Summary accounting on completion and stop
//!
//! Control calls made in a state where they do not apply are ignored. They
//! are expected races between the UI and the engine, not errors.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, trace};
use uuid::Uuid;

use super::events::{EngineEvent, EngineOutputs, SessionSummary};
use super::keep_awake::KeepAwake;
use super::scheduler::Scheduler;
use crate::cue::{CueDispatcher, CueKind};
use crate::settings::SettingsProvider;
use crate::types::{format_duration, EngineState, Session, Settings, Stage};

// ============================================================================
// RuntimeContext
// ============================================================================

/// Repeat cue countdown for the current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatCountdown {
    /// Seconds between repeat cues
    pub interval_seconds: u32,
    /// Seconds until the next repeat cue; may reach zero or below at a stage end
    pub countdown: i64,
}

impl RepeatCountdown {
    fn new(interval_seconds: u32) -> Self {
        Self {
            interval_seconds,
            countdown: i64::from(interval_seconds),
        }
    }

    fn reset(&mut self) {
        self.countdown = i64::from(self.interval_seconds);
    }
}

/// Mutable state of one session run, created by `initialize`.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    /// Identifies this run in logs
    pub run_id: Uuid,
    /// Session display name
    pub session_name: String,
    /// Snapshot of the session's stages
    pub stages: Vec<Stage>,
    /// 0-based; equals `stages.len()` once every stage has finished
    pub current_stage_index: usize,
    /// Seconds left in the current stage
    pub seconds_remaining: u32,
    /// Seconds counted while running
    pub session_seconds_elapsed: u32,
    /// Repeat countdown, `None` when the stage has no repeat interval
    pub repeat: Option<RepeatCountdown>,
    /// Settings in effect for this run
    pub settings: Settings,
}

impl RuntimeContext {
    fn new(session: &Session, settings: Settings) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            session_name: session.name.clone(),
            stages: session.stages.clone(),
            current_stage_index: 0,
            seconds_remaining: 0,
            session_seconds_elapsed: 0,
            repeat: None,
            settings,
        }
    }

    /// Returns the stage being counted down, if any.
    #[must_use]
    pub fn current_stage(&self) -> Option<&Stage> {
        self.stages.get(self.current_stage_index)
    }

    fn completed_stages(&self) -> usize {
        self.current_stage_index.min(self.stages.len())
    }
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Drives a session through time.
pub struct TimerEngine {
    scheduler: Box<dyn Scheduler>,
    keep_awake: Arc<dyn KeepAwake>,
    settings_provider: Arc<dyn SettingsProvider>,
    dispatcher: CueDispatcher,
    event_tx: mpsc::UnboundedSender<EngineEvent>,
    outputs: EngineOutputs,
    state: EngineState,
    context: Option<RuntimeContext>,
    summary: Option<SessionSummary>,
    awake_held: bool,
    sound_override: Option<bool>,
    vibration_override: Option<bool>,
}

impl TimerEngine {
    /// Creates an idle engine with no session loaded.
    pub fn new(
        dispatcher: CueDispatcher,
        scheduler: impl Scheduler + 'static,
        keep_awake: Arc<dyn KeepAwake>,
        settings_provider: Arc<dyn SettingsProvider>,
        event_tx: mpsc::UnboundedSender<EngineEvent>,
    ) -> Self {
        Self {
            scheduler: Box::new(scheduler),
            keep_awake,
            settings_provider,
            dispatcher,
            event_tx,
            outputs: EngineOutputs::default(),
            state: EngineState::Idle,
            context: None,
            summary: None,
            awake_held: false,
            sound_override: None,
            vibration_override: None,
        }
    }

    /// Loads a session, replacing any previous one.
    ///
    /// A session without stages is valid: the engine goes straight to
    /// `Completed` without ever running.
    pub fn initialize(&mut self, session: &Session, start_immediately: bool) {
        self.teardown();

        let mut settings = self.settings_provider.current_settings();
        if let Some(enabled) = self.sound_override {
            settings.sound_enabled = enabled;
        }
        if let Some(enabled) = self.vibration_override {
            settings.vibration_enabled = enabled;
        }

        let context = RuntimeContext::new(session, settings);
        info!(
            run_id = %context.run_id,
            "Session '{}' initialized with {} stage(s)",
            context.session_name,
            context.stages.len()
        );
        self.context = Some(context);
        self.summary = None;
        self.outputs = EngineOutputs::default();

        self.set_state(EngineState::Idle);
        self.publish(EngineEvent::ScreenDim(settings.screen_dim_percent));
        self.publish(EngineEvent::Summary(String::new()));
        self.publish(EngineEvent::SessionTotal(format_duration(0)));

        if session.stages.is_empty() {
            self.publish(EngineEvent::Countdown(format_duration(0)));
            self.publish(EngineEvent::StageTitle(String::new()));
            self.publish(EngineEvent::StageCounter("0/0".to_string()));
            self.publish(EngineEvent::NextStage(String::new()));
            self.complete();
            return;
        }

        self.load_stage(0);
        if start_immediately {
            self.start();
        }
    }

    /// Starts counting down the loaded session.
    ///
    /// Applies to an initialized engine with at least one stage that is
    /// neither running nor finished. Starting a paused engine continues the
    /// current stage and replays its entry cue.
    pub fn start(&mut self) {
        let has_stages = self
            .context
            .as_ref()
            .is_some_and(|ctx| !ctx.stages.is_empty());
        if self.state == EngineState::Running || self.state.is_terminal() || !has_stages {
            debug!("Ignoring start while {}", self.state.as_str());
            return;
        }

        self.set_state(EngineState::Running);
        self.acquire_keep_awake();
        self.scheduler.cancel_pending();
        self.scheduler.schedule_next();
        if let Some(ctx) = &self.context {
            info!(run_id = %ctx.run_id, "Session '{}' started", ctx.session_name);
        }
        self.fire_cue(CueKind::StageEntry);
    }

    /// Suspends the countdown.
    pub fn pause(&mut self) {
        if self.state != EngineState::Running {
            debug!("Ignoring pause while {}", self.state.as_str());
            return;
        }

        self.scheduler.cancel_pending();
        self.release_keep_awake();
        self.set_state(EngineState::Paused);
    }

    /// Continues a paused countdown with a full tick interval.
    pub fn resume(&mut self) {
        if self.state != EngineState::Paused {
            debug!("Ignoring resume while {}", self.state.as_str());
            return;
        }

        self.set_state(EngineState::Running);
        self.acquire_keep_awake();
        self.scheduler.schedule_next();
    }

    /// Ends the session early.
    ///
    /// Stages reported as completed are those fully counted down; a stop
    /// during the first stage reports zero.
    pub fn stop(&mut self, user_initiated: bool) {
        if self.state.is_terminal() || self.context.is_none() {
            debug!("Ignoring stop while {}", self.state.as_str());
            return;
        }

        self.teardown();
        self.set_state(EngineState::Stopped);
        self.finish(EngineState::Stopped, user_initiated);
    }

    /// Handles one scheduler tick.
    pub fn handle_tick(&mut self) {
        if self.state != EngineState::Running {
            trace!("Dropping tick while {}", self.state.as_str());
            return;
        }
        let Some(ctx) = self.context.as_mut() else {
            return;
        };

        ctx.seconds_remaining = ctx.seconds_remaining.saturating_sub(1);
        ctx.session_seconds_elapsed += 1;
        let remaining = ctx.seconds_remaining;

        let mut repeat_due = false;
        if let Some(repeat) = ctx.repeat.as_mut() {
            repeat.countdown -= 1;
            // The stage end is reserved for the next stage's entry cue.
            if repeat.countdown <= 0 && remaining > 0 {
                repeat.reset();
                repeat_due = true;
            }
        }

        self.publish(EngineEvent::Countdown(format_duration(remaining)));
        if repeat_due {
            self.fire_cue(CueKind::Repeat);
        }

        if remaining == 0 {
            self.advance_stage();
        } else {
            self.scheduler.schedule_next();
        }
    }

    /// Turns cue sound on or off for this and every later session.
    pub fn update_sound_enabled(&mut self, enabled: bool) {
        self.sound_override = Some(enabled);
        if let Some(ctx) = self.context.as_mut() {
            ctx.settings.sound_enabled = enabled;
        }
        debug!("Cue sound {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Turns cue vibration on or off for this and every later session.
    pub fn update_vibration_enabled(&mut self, enabled: bool) {
        self.vibration_override = Some(enabled);
        if let Some(ctx) = self.context.as_mut() {
            ctx.settings.vibration_enabled = enabled;
        }
        debug!("Cue vibration {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Releases every held resource without changing the state.
    ///
    /// Also runs when the engine is dropped.
    pub fn shutdown(&mut self) {
        self.teardown();
    }

    /// Returns the current engine state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Returns the latest value of every output.
    pub fn outputs(&self) -> &EngineOutputs {
        &self.outputs
    }

    /// Returns the current run, if a session has been initialized.
    pub fn context(&self) -> Option<&RuntimeContext> {
        self.context.as_ref()
    }

    /// Returns the summary of the last finished session.
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// Returns true while the keep-awake resource is held.
    pub fn is_keep_awake_held(&self) -> bool {
        self.awake_held
    }

    fn advance_stage(&mut self) {
        let Some(ctx) = self.context.as_mut() else {
            return;
        };
        ctx.current_stage_index += 1;
        let index = ctx.current_stage_index;

        if index < ctx.stages.len() {
            debug!(run_id = %ctx.run_id, "Advancing to stage {}", index + 1);
            self.load_stage(index);
            self.fire_cue(CueKind::StageEntry);
            self.scheduler.schedule_next();
        } else {
            self.complete();
        }
    }

    fn load_stage(&mut self, index: usize) {
        let Some(ctx) = self.context.as_mut() else {
            return;
        };
        let Some(stage) = ctx.stages.get(index) else {
            return;
        };

        ctx.current_stage_index = index;
        ctx.seconds_remaining = stage.duration_seconds();
        ctx.repeat = stage.repeat_interval_seconds().map(RepeatCountdown::new);

        let countdown = format_duration(ctx.seconds_remaining);
        let title = stage.name.clone();
        let counter = format!("{}/{}", index + 1, ctx.stages.len());
        let next = ctx
            .stages
            .get(index + 1)
            .map(|s| s.name.clone())
            .unwrap_or_default();

        self.publish(EngineEvent::Countdown(countdown));
        self.publish(EngineEvent::StageTitle(title));
        self.publish(EngineEvent::StageCounter(counter));
        self.publish(EngineEvent::NextStage(next));
    }

    fn complete(&mut self) {
        self.teardown();
        self.set_state(EngineState::Completed);
        self.finish(EngineState::Completed, false);
    }

    fn finish(&mut self, outcome: EngineState, user_initiated: bool) {
        let Some(ctx) = &self.context else {
            return;
        };
        let summary = SessionSummary {
            completed_stages: ctx.completed_stages(),
            total_stages: ctx.stages.len(),
            elapsed_seconds: ctx.session_seconds_elapsed,
            outcome,
            user_initiated,
        };
        info!(
            run_id = %ctx.run_id,
            user_initiated,
            "Session '{}' {}: {} in {}",
            ctx.session_name,
            outcome.as_str(),
            summary.text(),
            format_duration(summary.elapsed_seconds)
        );

        self.summary = Some(summary);
        self.publish(EngineEvent::Summary(summary.text()));
        self.publish(EngineEvent::SessionTotal(format_duration(
            summary.elapsed_seconds,
        )));
    }

    fn fire_cue(&mut self, kind: CueKind) {
        let Some(ctx) = &self.context else {
            return;
        };
        let Some(stage) = ctx.current_stage() else {
            return;
        };
        let stage_index = ctx.current_stage_index;
        let outcome = self.dispatcher.dispatch(stage, &ctx.settings, kind);

        if let Some(err) = outcome.error() {
            self.publish(EngineEvent::Error(err.to_string()));
        }
        self.publish(EngineEvent::CueFired {
            kind,
            stage_index,
            sound: outcome.played().map(str::to_owned),
            vibrated: outcome.vibrated,
        });
    }

    fn teardown(&mut self) {
        self.scheduler.cancel_pending();
        self.release_keep_awake();
        self.dispatcher.silence();
    }

    fn acquire_keep_awake(&mut self) {
        if !self.awake_held {
            self.keep_awake.acquire();
            self.awake_held = true;
        }
    }

    fn release_keep_awake(&mut self) {
        if self.awake_held {
            self.keep_awake.release();
            self.awake_held = false;
        }
    }

    fn set_state(&mut self, state: EngineState) {
        if self.state != state {
            debug!("Engine {} -> {}", self.state.as_str(), state.as_str());
        }
        self.state = state;
        self.publish(EngineEvent::StateChanged(state));
    }

    fn publish(&mut self, event: EngineEvent) {
        self.outputs.apply(&event);
        // Nobody listening is fine; the snapshot still holds the value.
        let _ = self.event_tx.send(event);
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("state", &self.state)
            .field("context", &self.context)
            .field("awake_held", &self.awake_held)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
