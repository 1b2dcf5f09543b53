//! Meditimer CLI - a multi-stage guided session timer
//!
//! Runs sessions made of timed stages in the terminal:
//! - A countdown per stage
//! - A cue sound on stage entry and at an optional repeat interval
//! - Pause, resume and stop from the keyboard

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use meditimer::cli::{run_session, Cli, Commands, Display};
use meditimer::sound::{default_library_dir, DirectorySoundLibrary, SoundError, SoundLibrary};
use meditimer::types::{Session, SessionError};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        if let Some(hint) = suggestion_for(&e) {
            Display::show_hint(hint);
        }
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Run(args)) => {
            let summary = run_session(&args).await?;
            Display::show_summary(&summary);
        }
        Some(Commands::Sounds { sounds }) => {
            let library = DirectorySoundLibrary::new(sounds.unwrap_or_else(default_library_dir));
            let names = library
                .list_available_sound_names()
                .with_context(|| format!("Failed to list {}", library.root().display()))?;
            Display::show_sounds(library.root(), &names);
        }
        Some(Commands::Check { session }) => {
            let session = Session::from_json_file(&session)
                .with_context(|| format!("Invalid session {}", session.display()))?;
            Display::show_check(&session);
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Returns a suggestion for errors raised by the library.
fn suggestion_for(error: &anyhow::Error) -> Option<&'static str> {
    if let Some(e) = error.downcast_ref::<SessionError>() {
        return Some(e.suggestion());
    }
    error.downcast_ref::<SoundError>().map(SoundError::suggestion)
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
