//! Session timer engine.
//!
//! This module provides:
//! - The [`TimerEngine`] state machine
//! - Tick scheduling (tokio-backed and a manual virtual clock)
//! - The keep-awake capability
//! - Observable engine outputs and the end-of-session summary

mod events;
mod keep_awake;
mod scheduler;
mod timer;

pub use events::{EngineEvent, EngineOutputs, SessionSummary};
pub use keep_awake::{InhibitorKeepAwake, KeepAwake, MockKeepAwake, NoopKeepAwake};
pub use scheduler::{ManualScheduler, Scheduler, Tick, TickReceiver, TokioScheduler, TICK_INTERVAL};
pub use timer::{RepeatCountdown, RuntimeContext, TimerEngine};
