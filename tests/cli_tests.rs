//! End-to-end tests for the meditimer binary.
//!
//! These tests run the compiled binary on temporary files:
//! - `check` on valid and invalid session files
//! - `sounds` on a temporary library directory
//! - `run` on an empty session
//! - `completions`

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

fn meditimer() -> Command {
    Command::cargo_bin("meditimer").unwrap()
}

fn write_session(dir: &TempDir, name: &str, json: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, json).unwrap();
    path
}

const MORNING: &str = r#"{
    "name": "Morning",
    "total_minutes": 999,
    "stages": [
        {"name": "Settle", "minutes": 5, "sounds": ["bell.mp3"]},
        {"name": "Breathe", "minutes": 15, "repeat_minutes": 5, "sounds": ["bell.mp3", "gong.wav"]},
        {"minutes": 2}
    ]
}"#;

// ============================================================================
// check
// ============================================================================

mod check_tests {
    use super::*;

    #[test]
    fn test_check_prints_stages_and_recomputed_total() {
        let dir = TempDir::new().unwrap();
        let path = write_session(&dir, "morning.json", MORNING);

        meditimer()
            .arg("check")
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::contains("Session: Morning"))
            .stdout(predicate::str::contains("Breathe (15 min, repeats every 5 min)"))
            .stdout(predicate::str::contains("(untitled stage) (2 min, plays once)"))
            .stdout(predicate::str::contains("Total: 22 min (3 stages)"));
    }

    #[test]
    fn test_check_rejects_out_of_range_stage() {
        let dir = TempDir::new().unwrap();
        let path = write_session(
            &dir,
            "long.json",
            r#"{"name": "Long", "stages": [{"name": "Forever", "minutes": 500}]}"#,
        );

        meditimer()
            .arg("check")
            .arg(&path)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Forever"));
    }

    #[test]
    fn test_check_rejects_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = write_session(&dir, "broken.json", "{ not json");

        meditimer()
            .arg("check")
            .arg(&path)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }

    #[test]
    fn test_check_missing_file_fails() {
        meditimer()
            .args(["check", "/nonexistent/session.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to read session file"));
    }
}

// ============================================================================
// sounds
// ============================================================================

mod sounds_tests {
    use super::*;

    #[test]
    fn test_sounds_lists_supported_files_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["gong.wav", "bell.MP3", "notes.txt", "rain.ogg"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        meditimer()
            .arg("sounds")
            .arg("--sounds")
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("bell.MP3"))
            .stdout(predicate::str::contains("notes.txt").not())
            .stdout(predicate::function(|out: &str| {
                let bell = out.find("bell.MP3");
                let gong = out.find("gong.wav");
                let rain = out.find("rain.ogg");
                bell < gong && gong < rain
            }));
    }

    #[test]
    fn test_sounds_empty_library() {
        let dir = TempDir::new().unwrap();

        meditimer()
            .arg("sounds")
            .arg("--sounds")
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("(no sounds)"));
    }

    #[test]
    fn test_sounds_missing_directory_fails() {
        meditimer()
            .args(["sounds", "--sounds", "/nonexistent/library"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to list sound library"));
    }
}

// ============================================================================
// run
// ============================================================================

mod run_tests {
    use super::*;

    #[test]
    fn test_run_empty_session_completes_immediately() {
        let dir = TempDir::new().unwrap();
        let path = write_session(&dir, "empty.json", r#"{"name": "Empty", "stages": []}"#);

        meditimer()
            .arg("run")
            .arg(&path)
            .arg("--sounds")
            .arg(dir.path())
            .arg("--settings")
            .arg(dir.path().join("settings.json"))
            .arg("--no-sound")
            .write_stdin("")
            .assert()
            .success()
            .stdout(predicate::str::contains("Completed 0/0 stages"))
            .stdout(predicate::str::contains("Time: 00:00"));
    }

    #[test]
    fn test_run_stops_on_quit_command() {
        let dir = TempDir::new().unwrap();
        let path = write_session(&dir, "morning.json", MORNING);

        meditimer()
            .arg("run")
            .arg(&path)
            .arg("--sounds")
            .arg(dir.path())
            .arg("--settings")
            .arg(dir.path().join("settings.json"))
            .arg("--no-sound")
            .write_stdin("q\n")
            .timeout(std::time::Duration::from_secs(10))
            .assert()
            .success()
            .stdout(predicate::str::contains("Stopped after 0/3 stages"));
    }

    #[test]
    fn test_run_missing_session_fails() {
        meditimer()
            .args(["run", "/nonexistent/session.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to load session"));
    }
}

// ============================================================================
// completions
// ============================================================================

mod completions_tests {
    use super::*;

    #[test]
    fn test_completions_bash() {
        meditimer()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("meditimer"));
    }
}
