//! Command definitions for the meditimer CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI Structure
// ============================================================================

/// Meditimer CLI - a multi-stage guided session timer
#[derive(Parser, Debug)]
#[command(
    name = "meditimer",
    version,
    about = "Multi-stage guided session timer with sound and vibration cues",
    long_about = "Runs guided sessions made of timed stages in the terminal.\n\
                  Each stage can play a cue sound on entry and at a repeat interval.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a session in the terminal
    Run(RunArgs),

    /// List the sounds available for cues
    Sounds {
        /// Sound library directory
        #[arg(long)]
        sounds: Option<PathBuf>,
    },

    /// Validate a session file and show its stages
    Check {
        /// Session definition (JSON)
        session: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Session definition (JSON)
    pub session: PathBuf,

    /// Sound library directory
    #[arg(long)]
    pub sounds: Option<PathBuf>,

    /// Settings file (JSON)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Disable cue sounds
    #[arg(long)]
    pub no_sound: bool,

    /// Disable cue vibration
    #[arg(long)]
    pub no_vibration: bool,

    /// Load the session without starting it (type `s` to start)
    #[arg(long)]
    pub paused: bool,
}

// ============================================================================
// Interactive Commands
// ============================================================================

/// A line typed while a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    Pause,
    Resume,
    Stop,
    Sound(bool),
    Vibration(bool),
}

impl SessionCommand {
    /// Parses a typed line. Returns `None` for anything unrecognized.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = words.next()?.to_ascii_lowercase();
        let toggle = words.next().map(str::to_ascii_lowercase);

        match (command.as_str(), toggle.as_deref()) {
            ("s" | "start", None) => Some(Self::Start),
            ("p" | "pause", None) => Some(Self::Pause),
            ("r" | "resume", None) => Some(Self::Resume),
            ("q" | "quit" | "stop", None) => Some(Self::Stop),
            ("sound", Some(state)) => parse_toggle(state).map(Self::Sound),
            ("vibration", Some(state)) => parse_toggle(state).map(Self::Vibration),
            _ => None,
        }
    }
}

fn parse_toggle(state: &str) -> Option<bool> {
    match state {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Cli Tests
    // ------------------------------------------------------------------------

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_no_args() {
            let cli = Cli::parse_from(["meditimer"]);
            assert!(cli.command.is_none());
            assert!(!cli.verbose);
        }

        #[test]
        fn test_parse_short_verbose_flag() {
            let cli = Cli::parse_from(["meditimer", "-v"]);
            assert!(cli.verbose);
        }

        #[test]
        fn test_parse_check_command() {
            let cli = Cli::parse_from(["meditimer", "check", "morning.json"]);
            match cli.command {
                Some(Commands::Check { session }) => {
                    assert_eq!(session, PathBuf::from("morning.json"));
                }
                _ => panic!("Expected Check command"),
            }
        }

        #[test]
        fn test_parse_sounds_command() {
            let cli = Cli::parse_from(["meditimer", "sounds", "--sounds", "/tmp/bells"]);
            match cli.command {
                Some(Commands::Sounds { sounds }) => {
                    assert_eq!(sounds, Some(PathBuf::from("/tmp/bells")));
                }
                _ => panic!("Expected Sounds command"),
            }
        }

        #[test]
        fn test_parse_completions_zsh() {
            let cli = Cli::parse_from(["meditimer", "completions", "zsh"]);
            match cli.command {
                Some(Commands::Completions { shell }) => {
                    assert_eq!(shell, clap_complete::Shell::Zsh);
                }
                _ => panic!("Expected Completions command"),
            }
        }

        #[test]
        fn test_check_requires_session() {
            assert!(Cli::try_parse_from(["meditimer", "check"]).is_err());
        }
    }

    // ------------------------------------------------------------------------
    // Run Command Tests
    // ------------------------------------------------------------------------

    mod run_args_tests {
        use super::*;

        #[test]
        fn test_parse_run_defaults() {
            let cli = Cli::parse_from(["meditimer", "run", "s.json"]);
            match cli.command {
                Some(Commands::Run(args)) => {
                    assert_eq!(args.session, PathBuf::from("s.json"));
                    assert!(args.sounds.is_none());
                    assert!(args.settings.is_none());
                    assert!(!args.no_sound);
                    assert!(!args.no_vibration);
                    assert!(!args.paused);
                }
                _ => panic!("Expected Run command"),
            }
        }

        #[test]
        fn test_parse_run_all_options() {
            let cli = Cli::parse_from([
                "meditimer",
                "run",
                "s.json",
                "--sounds",
                "bells",
                "--settings",
                "settings.json",
                "--no-sound",
                "--no-vibration",
                "--paused",
            ]);
            match cli.command {
                Some(Commands::Run(args)) => {
                    assert_eq!(args.sounds, Some(PathBuf::from("bells")));
                    assert_eq!(args.settings, Some(PathBuf::from("settings.json")));
                    assert!(args.no_sound);
                    assert!(args.no_vibration);
                    assert!(args.paused);
                }
                _ => panic!("Expected Run command"),
            }
        }
    }

    // ------------------------------------------------------------------------
    // Session Command Tests
    // ------------------------------------------------------------------------

    mod session_command_tests {
        use super::*;

        #[test]
        fn test_short_forms() {
            assert_eq!(SessionCommand::parse("s"), Some(SessionCommand::Start));
            assert_eq!(SessionCommand::parse("p"), Some(SessionCommand::Pause));
            assert_eq!(SessionCommand::parse("r"), Some(SessionCommand::Resume));
            assert_eq!(SessionCommand::parse("q"), Some(SessionCommand::Stop));
        }

        #[test]
        fn test_long_forms_and_whitespace() {
            assert_eq!(SessionCommand::parse("  PAUSE \n"), Some(SessionCommand::Pause));
            assert_eq!(SessionCommand::parse("stop"), Some(SessionCommand::Stop));
        }

        #[test]
        fn test_toggles() {
            assert_eq!(
                SessionCommand::parse("sound off"),
                Some(SessionCommand::Sound(false))
            );
            assert_eq!(
                SessionCommand::parse("vibration on"),
                Some(SessionCommand::Vibration(true))
            );
            assert_eq!(SessionCommand::parse("sound maybe"), None);
        }

        #[test]
        fn test_unknown() {
            assert_eq!(SessionCommand::parse(""), None);
            assert_eq!(SessionCommand::parse("x"), None);
            assert_eq!(SessionCommand::parse("p now"), None);
        }
    }
}
