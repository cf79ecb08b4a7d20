//! Mock ports shared by the integration tests.

use netwatch_a11y::accessibility::{ClassList, LiveRegion, Politeness};
use netwatch_a11y::audio::{AudioBackend, AudioError, AudioHandle};
use netwatch_a11y::preferences::OsPreferences;
use netwatch_a11y::storage::{KeyValueStore, MemoryStore, SharedStore, StorageError};
use netwatch_a11y::{AccessibilityEngine, AppConfig};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Live region that records every write.
#[derive(Clone, Default)]
pub struct RecordingRegion {
    writes: Arc<Mutex<Vec<String>>>,
}

impl RecordingRegion {
    /// Non-empty writes, in order.
    pub fn delivered(&self) -> Vec<String> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|w| !w.is_empty())
            .cloned()
            .collect()
    }
}

impl LiveRegion for RecordingRegion {
    fn set_text(&mut self, text: &str) {
        self.writes.lock().unwrap().push(text.to_string());
    }
}

/// Audio backend that records loads and plays.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    pub loaded: Arc<Mutex<Vec<PathBuf>>>,
    pub played: Arc<Mutex<Vec<PathBuf>>>,
}

struct RecordingHandle {
    path: PathBuf,
    played: Arc<Mutex<Vec<PathBuf>>>,
}

impl AudioHandle for RecordingHandle {
    fn restart(&mut self) -> Result<(), AudioError> {
        self.played.lock().unwrap().push(self.path.clone());
        Ok(())
    }
}

impl AudioBackend for RecordingBackend {
    fn load(&self, path: &Path) -> Result<Box<dyn AudioHandle>, AudioError> {
        self.loaded.lock().unwrap().push(path.to_path_buf());
        Ok(Box::new(RecordingHandle {
            path: path.to_path_buf(),
            played: Arc::clone(&self.played),
        }))
    }
}

impl RecordingBackend {
    /// File names played, in order.
    pub fn played_files(&self) -> Vec<String> {
        self.played
            .lock()
            .unwrap()
            .iter()
            .filter_map(|p| p.file_name())
            .map(|f| f.to_string_lossy().into_owned())
            .collect()
    }
}

/// Store whose writes can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FlakyStore {
    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.inner.remove(key)
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.inner.keys(prefix)
    }
}

/// An engine over `storage` with recording regions on both channels.
pub struct Harness {
    pub engine: AccessibilityEngine,
    pub polite: RecordingRegion,
    pub assertive: RecordingRegion,
    pub audio: RecordingBackend,
}

impl Harness {
    pub fn new(storage: SharedStore) -> Self {
        Self::with_os(storage, OsPreferences::default())
    }

    pub fn with_os(storage: SharedStore, os: OsPreferences) -> Self {
        let mut config = AppConfig::default();
        config.announcer.clear_delay_ms = 1;
        config.announcer.tick_interval_ms = 1;
        config.sound.directory = Some(PathBuf::from("/opt/netwatch/sounds"));

        let audio = RecordingBackend::default();
        let engine = AccessibilityEngine::new(
            &config,
            storage,
            os,
            ClassList::new(),
            Some(Arc::new(audio.clone())),
        );

        let polite = RecordingRegion::default();
        let assertive = RecordingRegion::default();
        engine
            .announcer()
            .attach_region(Politeness::Polite, polite.clone());
        engine
            .announcer()
            .attach_region(Politeness::Assertive, assertive.clone());

        Self {
            engine,
            polite,
            assertive,
            audio,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Deliver everything queued on the announcer.
    pub async fn flush(&self) {
        tokio::time::timeout(Duration::from_secs(2), self.engine.flush_announcements())
            .await
            .expect("announcer did not go idle");
    }
}
