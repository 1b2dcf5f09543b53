//! Sound library listing.
//!
//! The library is a flat directory of audio files. Cues refer to sounds by
//! file name, and the dispatcher checks every request against the current
//! listing before asking the player for it.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use tracing::debug;

use super::error::SoundError;

/// Supported audio file extensions.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a"];

/// Directory name of the library under the user's audio directory.
const LIBRARY_DIR_NAME: &str = "meditimer";

/// Read access to the set of sounds that can be played.
pub trait SoundLibrary {
    /// Lists the names of all playable sounds, sorted.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::ListingError` if the library cannot be read.
    fn list_available_sound_names(&self) -> Result<BTreeSet<String>, SoundError>;
}

/// Returns true if the file name has a supported audio extension.
#[must_use]
pub fn is_supported_audio_file(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Default library location: `<audio dir>/meditimer`, falling back to the
/// current directory when the platform has no audio directory.
#[must_use]
pub fn default_library_dir() -> PathBuf {
    dirs::audio_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(LIBRARY_DIR_NAME)
}

/// Sound library backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectorySoundLibrary {
    root: PathBuf,
}

impl DirectorySoundLibrary {
    /// Creates a library rooted at the given directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the library directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a sound name to a file path inside the library.
    ///
    /// Returns `None` for names with path components or unsupported
    /// extensions.
    #[must_use]
    pub fn path_for(&self, sound_name: &str) -> Option<PathBuf> {
        let candidate = Path::new(sound_name);
        if candidate.components().count() != 1 || !is_supported_audio_file(sound_name) {
            return None;
        }
        Some(self.root.join(candidate))
    }
}

impl Default for DirectorySoundLibrary {
    fn default() -> Self {
        Self::new(default_library_dir())
    }
}

impl SoundLibrary for DirectorySoundLibrary {
    fn list_available_sound_names(&self) -> Result<BTreeSet<String>, SoundError> {
        let entries = std::fs::read_dir(&self.root)
            .map_err(|e| SoundError::ListingError(format!("{}: {}", self.root.display(), e)))?;

        let names: BTreeSet<String> = entries
            .flatten()
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| is_supported_audio_file(name))
            .collect();

        debug!("Found {} sounds in {}", names.len(), self.root.display());
        Ok(names)
    }
}

/// Mock sound library for testing.
#[derive(Debug, Default)]
pub struct MockSoundLibrary {
    names: Mutex<BTreeSet<String>>,
    should_fail: AtomicBool,
    list_calls: AtomicUsize,
}

impl MockSoundLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a library containing the given sounds.
    #[must_use]
    pub fn with_sounds<I, S>(sounds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let library = Self::new();
        for sound in sounds {
            library.add_sound(sound);
        }
        library
    }

    pub fn add_sound(&self, name: impl Into<String>) {
        self.names.lock().unwrap().insert(name.into());
    }

    pub fn remove_sound(&self, name: &str) {
        self.names.lock().unwrap().remove(name);
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn list_call_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

impl SoundLibrary for MockSoundLibrary {
    fn list_available_sound_names(&self) -> Result<BTreeSet<String>, SoundError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::ListingError("Mock failure".to_string()));
        }
        Ok(self.names.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported_audio_file() {
        assert!(is_supported_audio_file("bell.mp3"));
        assert!(is_supported_audio_file("Rain.WAV"));
        assert!(is_supported_audio_file("wind.ogg"));
        assert!(is_supported_audio_file("song.m4a"));
        assert!(!is_supported_audio_file("notes.txt"));
        assert!(!is_supported_audio_file("mp3"));
        assert!(!is_supported_audio_file(""));
    }

    #[test]
    fn test_directory_listing_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["rain.wav", "bell.mp3", "readme.txt", "Chime.OGG"] {
            std::fs::write(dir.path().join(name), b"data").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.mp3")).unwrap();

        let library = DirectorySoundLibrary::new(dir.path());
        let names: Vec<String> = library.list_available_sound_names().unwrap().into_iter().collect();

        assert_eq!(names, vec!["Chime.OGG", "bell.mp3", "rain.wav"]);
    }

    #[test]
    fn test_directory_listing_missing_dir() {
        let library = DirectorySoundLibrary::new("/nonexistent/meditimer/sounds");
        let err = library.list_available_sound_names().unwrap_err();
        assert!(matches!(err, SoundError::ListingError(_)));
    }

    #[test]
    fn test_path_for() {
        let library = DirectorySoundLibrary::new("/music");
        assert_eq!(
            library.path_for("bell.mp3"),
            Some(PathBuf::from("/music/bell.mp3"))
        );
        assert_eq!(library.path_for("../etc/bell.mp3"), None);
        assert_eq!(library.path_for("notes.txt"), None);
    }

    #[test]
    fn test_default_library_dir_name() {
        assert!(default_library_dir().ends_with(LIBRARY_DIR_NAME));
    }

    #[test]
    fn test_mock_library() {
        let library = MockSoundLibrary::with_sounds(["b.mp3", "a.mp3"]);
        let names = library.list_available_sound_names().unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(library.list_call_count(), 1);

        library.remove_sound("a.mp3");
        assert!(!library.list_available_sound_names().unwrap().contains("a.mp3"));

        library.set_should_fail(true);
        assert!(library.list_available_sound_names().is_err());
    }
}
