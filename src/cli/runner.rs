//! Terminal session runner.
//!
//! Wires the engine to real collaborators and drives it from a single task:
//! scheduler ticks, typed commands and Ctrl-C are handled one at a time, so
//! the engine never sees two calls at once.

use std::future::Future;
use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::commands::{RunArgs, SessionCommand};
use super::display::Display;
use crate::cue::{CueDispatcher, NoopVibrator};
use crate::engine::{
    EngineEvent, InhibitorKeepAwake, KeepAwake, NoopKeepAwake, SessionSummary, TickReceiver,
    TimerEngine, TokioScheduler,
};
use crate::settings::{default_settings_path, FileSettingsProvider};
use crate::sound::{
    default_library_dir, try_create_player, CuePlayer, DirectorySoundLibrary, SilentCuePlayer,
};
use crate::types::Session;

/// Runs a session file to the end and returns its summary.
///
/// # Errors
///
/// Returns an error if the session file cannot be loaded.
pub async fn run_session(args: &RunArgs) -> Result<SessionSummary> {
    let session = Session::from_json_file(&args.session)
        .with_context(|| format!("Failed to load session {}", args.session.display()))?;

    let library = DirectorySoundLibrary::new(args.sounds.clone().unwrap_or_else(default_library_dir));
    let player: Arc<dyn CuePlayer> = match try_create_player(library.clone()) {
        Some(player) => Arc::new(player),
        None => {
            warn!("No audio output available, cues will be silent");
            Arc::new(SilentCuePlayer)
        }
    };
    let keep_awake: Arc<dyn KeepAwake> = match InhibitorKeepAwake::detect() {
        Some(inhibitor) => Arc::new(inhibitor),
        None => Arc::new(NoopKeepAwake),
    };
    let settings = Arc::new(FileSettingsProvider::new(
        args.settings.clone().unwrap_or_else(default_settings_path),
    ));

    let dispatcher = CueDispatcher::new(Arc::new(library), player, Arc::new(NoopVibrator));
    let (scheduler, mut ticks) = TokioScheduler::channel();
    let (event_tx, mut events) = mpsc::unbounded_channel();
    let mut engine = TimerEngine::new(dispatcher, scheduler, keep_awake, settings, event_tx);

    if args.no_sound {
        engine.update_sound_enabled(false);
    }
    if args.no_vibration {
        engine.update_vibration_enabled(false);
    }

    let commands = spawn_stdin_reader();

    println!("Session: {}", session.name);
    Display::show_controls(!args.paused);
    engine.initialize(&session, !args.paused);

    drive_session(
        &mut engine,
        &mut ticks,
        commands,
        &mut events,
        tokio::signal::ctrl_c(),
    )
    .await;

    engine
        .summary()
        .copied()
        .context("Session ended without a summary")
}

/// Feeds ticks, typed commands and the shutdown signal to the engine until
/// it reaches a terminal state.
///
/// The shutdown future is created once by the caller and polled across
/// iterations, so a signal arriving between two events is not lost.
pub async fn drive_session<F>(
    engine: &mut TimerEngine,
    ticks: &mut TickReceiver,
    mut commands: mpsc::UnboundedReceiver<String>,
    events: &mut mpsc::UnboundedReceiver<EngineEvent>,
    shutdown: F,
) where
    F: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(shutdown);
    let mut stdin_open = true;
    let mut shutdown_done = false;

    loop {
        drain_events(events);
        if engine.state().is_terminal() {
            break;
        }

        tokio::select! {
            tick = ticks.recv() => match tick {
                Some(_) => engine.handle_tick(),
                None => break,
            },
            line = commands.recv(), if stdin_open => match line {
                Some(line) => apply_command(engine, &line),
                None => {
                    debug!("stdin closed, only Ctrl-C can stop the session now");
                    stdin_open = false;
                }
            },
            signal = &mut shutdown, if !shutdown_done => {
                shutdown_done = true;
                if let Err(e) = signal {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                }
                engine.stop(true);
            }
        }
    }
    drain_events(events);
}

/// Applies a typed command to the engine.
pub fn apply_command(engine: &mut TimerEngine, line: &str) {
    match SessionCommand::parse(line) {
        Some(SessionCommand::Start) => engine.start(),
        Some(SessionCommand::Pause) => engine.pause(),
        Some(SessionCommand::Resume) => engine.resume(),
        Some(SessionCommand::Stop) => engine.stop(true),
        Some(SessionCommand::Sound(enabled)) => engine.update_sound_enabled(enabled),
        Some(SessionCommand::Vibration(enabled)) => engine.update_vibration_enabled(enabled),
        None if line.trim().is_empty() => {}
        None => Display::show_error(&format!("Unknown command: {}", line.trim())),
    }
}

fn drain_events(events: &mut mpsc::UnboundedReceiver<EngineEvent>) {
    while let Ok(event) = events.try_recv() {
        Display::show_event(&event);
    }
}

/// Forwards stdin lines from a plain thread so a pending read never holds
/// the runtime open at exit.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
