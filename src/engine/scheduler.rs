//! Tick scheduling for the timer engine.
//!
//! The engine never sleeps itself. It asks a [`Scheduler`] for the next tick
//! and is handed that tick later through [`TimerEngine::handle_tick`]. At
//! most one tick is ever pending: scheduling again replaces the pending one.
//!
//! Two implementations are provided:
//! - [`TokioScheduler`] delivers real ticks through a channel
//! - [`ManualScheduler`] is a virtual clock for deterministic tests
//!
//! [`TimerEngine::handle_tick`]: super::TimerEngine::handle_tick

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::trace;

use super::TimerEngine;

/// Fixed interval between ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Single-flight, restartable tick source.
pub trait Scheduler {
    /// Requests one tick after the fixed interval, replacing any pending one.
    fn schedule_next(&mut self);

    /// Cancels the pending tick, if any.
    fn cancel_pending(&mut self);

    /// Returns true while a requested tick has not been delivered yet.
    fn is_pending(&self) -> bool;
}

// ============================================================================
// TokioScheduler
// ============================================================================

/// A delivered tick, tagged with the scheduling generation it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    generation: u64,
}

/// Scheduler backed by `tokio::time::sleep`.
///
/// Each request spawns a sleeping task that sends a [`Tick`] into the paired
/// [`TickReceiver`]. Cancelling aborts the task and moves to a new
/// generation, so a tick that was already queued is discarded on receipt.
#[derive(Debug)]
pub struct TokioScheduler {
    interval: Duration,
    tick_tx: mpsc::UnboundedSender<Tick>,
    generation: Arc<AtomicU64>,
    in_flight: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

/// Receiving side of a [`TokioScheduler`].
#[derive(Debug)]
pub struct TickReceiver {
    tick_rx: mpsc::UnboundedReceiver<Tick>,
    generation: Arc<AtomicU64>,
    in_flight: Arc<AtomicBool>,
}

impl TokioScheduler {
    /// Creates a scheduler ticking every [`TICK_INTERVAL`] and its receiver.
    #[must_use]
    pub fn channel() -> (Self, TickReceiver) {
        Self::with_interval(TICK_INTERVAL)
    }

    /// Creates a scheduler with a custom interval.
    #[must_use]
    pub fn with_interval(interval: Duration) -> (Self, TickReceiver) {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let generation = Arc::new(AtomicU64::new(0));
        let in_flight = Arc::new(AtomicBool::new(false));

        let scheduler = Self {
            interval,
            tick_tx,
            generation: Arc::clone(&generation),
            in_flight: Arc::clone(&in_flight),
            task: None,
        };
        let receiver = TickReceiver {
            tick_rx,
            generation,
            in_flight,
        };
        (scheduler, receiver)
    }

    /// Returns the tick interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_next(&mut self) {
        self.cancel_pending();

        let generation = self.generation.load(Ordering::SeqCst);
        let interval = self.interval;
        let tick_tx = self.tick_tx.clone();

        self.in_flight.store(true, Ordering::SeqCst);
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            // The receiver is gone once the session runner exits.
            let _ = tick_tx.send(Tick { generation });
        }));
    }

    fn cancel_pending(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.in_flight.store(false, Ordering::SeqCst);
    }

    fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl TickReceiver {
    /// Waits for the next current tick, skipping cancelled ones.
    ///
    /// Returns `None` once the scheduler has been dropped.
    pub async fn recv(&mut self) -> Option<Tick> {
        loop {
            let tick = self.tick_rx.recv().await?;
            if tick.generation == self.generation.load(Ordering::SeqCst) {
                self.in_flight.store(false, Ordering::SeqCst);
                return Some(tick);
            }
            trace!("Discarding stale tick from generation {}", tick.generation);
        }
    }
}

// ============================================================================
// ManualScheduler
// ============================================================================

#[derive(Debug, Default)]
struct ManualState {
    pending: bool,
    scheduled: usize,
    cancelled: usize,
}

/// Virtual clock for tests.
///
/// Clones share state, so a test can keep one handle while the engine owns
/// another. Ticks are only delivered when the test fires them.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the pending tick. Returns false if none was pending.
    pub fn take_pending(&self) -> bool {
        std::mem::take(&mut self.lock().pending)
    }

    /// Delivers the pending tick to the engine, if there is one.
    pub fn fire(&self, engine: &mut TimerEngine) -> bool {
        if !self.take_pending() {
            return false;
        }
        engine.handle_tick();
        true
    }

    /// Delivers up to `count` ticks and returns how many were delivered.
    pub fn fire_many(&self, engine: &mut TimerEngine, count: u32) -> u32 {
        let mut delivered = 0;
        while delivered < count && self.fire(engine) {
            delivered += 1;
        }
        delivered
    }

    /// Delivers ticks until none is pending and returns how many were delivered.
    pub fn run_until_idle(&self, engine: &mut TimerEngine) -> u64 {
        let mut delivered = 0;
        while self.fire(engine) {
            delivered += 1;
        }
        delivered
    }

    /// Number of `schedule_next` calls so far.
    #[must_use]
    pub fn scheduled_count(&self) -> usize {
        self.lock().scheduled
    }

    /// Number of `cancel_pending` calls so far.
    #[must_use]
    pub fn cancelled_count(&self) -> usize {
        self.lock().cancelled
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_next(&mut self) {
        let mut state = self.lock();
        state.pending = true;
        state.scheduled += 1;
    }

    fn cancel_pending(&mut self) {
        let mut state = self.lock();
        state.pending = false;
        state.cancelled += 1;
    }

    fn is_pending(&self) -> bool {
        self.lock().pending
    }
}
