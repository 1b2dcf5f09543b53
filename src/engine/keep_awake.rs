//! Keep-awake resource for running sessions.
//!
//! While a session runs the host should not go to sleep. The engine holds
//! the resource from `start`/`resume` until `pause`/`stop`/completion.
//! Hosts with no way to inhibit sleep use [`NoopKeepAwake`]; that is never
//! an error.
//!
//! [`InhibitorKeepAwake`] runs the platform's sleep inhibitor as a child
//! process and kills it on release:
//! - macOS: `/usr/bin/caffeinate -di`
//! - Linux: `systemd-inhibit --what=idle:sleep ... sleep infinity`

use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use tracing::{debug, info, warn};

/// Path to the macOS sleep inhibitor.
const CAFFEINATE_PATH: &str = "/usr/bin/caffeinate";

/// Path to the systemd sleep inhibitor.
const SYSTEMD_INHIBIT_PATH: &str = "/usr/bin/systemd-inhibit";

/// A resource preventing the host from sleeping.
///
/// Both calls must be cheap and non-blocking. `release` without a prior
/// `acquire` is a no-op.
pub trait KeepAwake {
    /// Starts holding the resource.
    fn acquire(&self);

    /// Stops holding the resource.
    fn release(&self);
}

/// Keep-awake for hosts without a sleep inhibitor.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopKeepAwake;

impl KeepAwake for NoopKeepAwake {
    fn acquire(&self) {}

    fn release(&self) {}
}

/// Keep-awake backed by the platform's sleep inhibitor command.
#[derive(Debug)]
pub struct InhibitorKeepAwake {
    program: &'static str,
    args: &'static [&'static str],
    child: Mutex<Option<Child>>,
}

impl InhibitorKeepAwake {
    /// Detects the platform inhibitor. Returns `None` when there is none.
    #[must_use]
    pub fn detect() -> Option<Self> {
        if Path::new(CAFFEINATE_PATH).exists() {
            return Some(Self::new(CAFFEINATE_PATH, &["-di"]));
        }
        if Path::new(SYSTEMD_INHIBIT_PATH).exists() {
            return Some(Self::new(
                SYSTEMD_INHIBIT_PATH,
                &[
                    "--what=idle:sleep",
                    "--who=meditimer",
                    "--why=Session running",
                    "sleep",
                    "infinity",
                ],
            ));
        }
        None
    }

    fn new(program: &'static str, args: &'static [&'static str]) -> Self {
        Self {
            program,
            args,
            child: Mutex::new(None),
        }
    }

    /// Returns true while the inhibitor process is held.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Child>> {
        self.child.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeepAwake for InhibitorKeepAwake {
    fn acquire(&self) {
        let mut child = self.lock();
        if child.is_some() {
            return;
        }
        match Command::new(self.program)
            .args(self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(process) => {
                info!("Sleep inhibited via {} (pid {})", self.program, process.id());
                *child = Some(process);
            }
            Err(e) => warn!("Could not start {}: {}", self.program, e),
        }
    }

    fn release(&self) {
        if let Some(mut process) = self.lock().take() {
            if let Err(e) = process.kill() {
                debug!("Sleep inhibitor already exited: {}", e);
            }
            let _ = process.wait();
            info!("Sleep inhibitor released");
        }
    }
}

impl Drop for InhibitorKeepAwake {
    fn drop(&mut self) {
        self.release();
    }
}

/// Mock keep-awake for testing.
#[derive(Debug, Default)]
pub struct MockKeepAwake {
    acquire_calls: AtomicUsize,
    release_calls: AtomicUsize,
    held: AtomicBool,
}

impl MockKeepAwake {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn acquire_count(&self) -> usize {
        self.acquire_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn release_count(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

impl KeepAwake for MockKeepAwake {
    fn acquire(&self) {
        self.acquire_calls.fetch_add(1, Ordering::SeqCst);
        self.held.store(true, Ordering::SeqCst);
    }

    fn release(&self) {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        self.held.store(false, Ordering::SeqCst);
    }
}
