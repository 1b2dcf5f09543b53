//! CLI module for meditimer.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Output formatting and display logic
//! - `runner`: Drives a session in the terminal

pub mod commands;
pub mod display;
pub mod runner;

pub use commands::{Cli, Commands, RunArgs, SessionCommand};
pub use display::Display;
pub use runner::{apply_command, drive_session, run_session};
