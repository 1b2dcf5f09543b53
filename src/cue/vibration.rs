//! Haptic feedback for cues.
//!
//! Hosts without a vibration motor use [`NoopVibrator`]; a missing motor is
//! never an error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Weakest amplitude used for a non-zero strength.
pub const MIN_AMPLITUDE: u8 = 30;
/// Strongest amplitude, used at 100 % strength.
pub const MAX_AMPLITUDE: u8 = 255;
/// Length of a cue pulse.
pub const PULSE_DURATION_MS: u64 = 250;

/// Vibration capability of the host.
pub trait Vibrator {
    /// Returns true if the host has a vibration motor.
    fn has_vibrator(&self) -> bool;

    /// Fires a single pulse. Must not block.
    fn pulse(&self, amplitude: u8, duration_ms: u64);
}

/// Maps a strength percentage to a motor amplitude.
///
/// Returns `None` for 0 %, otherwise an amplitude between
/// [`MIN_AMPLITUDE`] and [`MAX_AMPLITUDE`] that grows with the strength.
#[must_use]
pub fn amplitude_for_strength(strength_percent: u8) -> Option<u8> {
    if strength_percent == 0 {
        return None;
    }
    let percent = u32::from(strength_percent.min(100));
    let span = u32::from(MAX_AMPLITUDE - MIN_AMPLITUDE);
    let amplitude = u32::from(MIN_AMPLITUDE) + span * percent / 100;
    Some(amplitude as u8)
}

/// Vibrator for hosts without a motor.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopVibrator;

impl Vibrator for NoopVibrator {
    fn has_vibrator(&self) -> bool {
        false
    }

    fn pulse(&self, _amplitude: u8, _duration_ms: u64) {}
}

/// Mock vibrator for testing.
#[derive(Debug)]
pub struct MockVibrator {
    pulses: Mutex<Vec<(u8, u64)>>,
    available: AtomicBool,
}

impl Default for MockVibrator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVibrator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pulses: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    #[must_use]
    pub fn pulse_count(&self) -> usize {
        self.pulses.lock().unwrap().len()
    }

    #[must_use]
    pub fn get_pulses(&self) -> Vec<(u8, u64)> {
        self.pulses.lock().unwrap().clone()
    }
}

impl Vibrator for MockVibrator {
    fn has_vibrator(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn pulse(&self, amplitude: u8, duration_ms: u64) {
        self.pulses.lock().unwrap().push((amplitude, duration_ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amplitude_zero_disables() {
        assert_eq!(amplitude_for_strength(0), None);
    }

    #[test]
    fn test_amplitude_bounds() {
        assert_eq!(amplitude_for_strength(100), Some(MAX_AMPLITUDE));
        let weakest = amplitude_for_strength(1).unwrap();
        assert!(weakest >= MIN_AMPLITUDE);
        assert!(weakest < MAX_AMPLITUDE);
    }

    #[test]
    fn test_amplitude_is_monotonic() {
        let amplitudes: Vec<u8> = (1..=100).filter_map(amplitude_for_strength).collect();
        assert_eq!(amplitudes.len(), 100);
        assert!(amplitudes.windows(2).all(|w| w[0] <= w[1]));
        assert!(amplitude_for_strength(20) < amplitude_for_strength(80));
    }

    #[test]
    fn test_noop_vibrator() {
        let vibrator = NoopVibrator;
        assert!(!vibrator.has_vibrator());
        vibrator.pulse(100, 10);
    }

    #[test]
    fn test_mock_vibrator() {
        let vibrator = MockVibrator::new();
        assert!(vibrator.has_vibrator());
        vibrator.pulse(128, PULSE_DURATION_MS);
        assert_eq!(vibrator.get_pulses(), vec![(128, PULSE_DURATION_MS)]);

        vibrator.set_available(false);
        assert!(!vibrator.has_vibrator());
    }
}
