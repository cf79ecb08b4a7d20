//! Sound feedback player.

use super::{AudioBackend, AudioHandle, SoundCategory};
use crate::lock;
use crate::preferences::{PreferenceFlag, PreferenceStore};
use crate::storage::config::SoundSettings;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Plays one cue per event category.
///
/// Handles are cached by file name and loaded on first use. Playing a cue
/// that is still sounding restarts it from the beginning. Clones share the
/// cache.
#[derive(Clone)]
pub struct SoundFeedbackPlayer {
    store: PreferenceStore,
    backend: Arc<dyn AudioBackend>,
    sound_dir: PathBuf,
    settings: SoundSettings,
    cache: Arc<Mutex<HashMap<String, Box<dyn AudioHandle>>>>,
}

impl SoundFeedbackPlayer {
    pub fn new(
        store: PreferenceStore,
        backend: Arc<dyn AudioBackend>,
        sound_dir: impl Into<PathBuf>,
        settings: SoundSettings,
    ) -> Self {
        Self {
            store,
            backend,
            sound_dir: sound_dir.into(),
            settings,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Play the cue for `category`. Returns true if playback started.
    ///
    /// Does nothing while sound feedback is off. Failures are logged.
    ///
    /// A cache miss loads the file on the calling thread, outside the cache
    /// lock; cues are short, and [`SoundFeedbackPlayer::preload`] moves the
    /// cost to startup.
    pub fn play(&self, category: SoundCategory) -> bool {
        if !self.store.is_enabled(PreferenceFlag::SoundFeedback) {
            tracing::trace!("Sound feedback off, skipping {} cue", category);
            return false;
        }

        let file = self.settings.file_for(category).to_string();
        if let Some(played) = self.restart_cached(category, &file) {
            return played;
        }

        let handle = match self.backend.load(&self.sound_dir.join(&file)) {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!("Could not load {} cue: {}", category, e);
                return false;
            }
        };
        // Another caller may have loaded the same file meanwhile; keep the first.
        lock(&self.cache).entry(file.clone()).or_insert(handle);
        self.restart_cached(category, &file).unwrap_or(false)
    }

    /// Restart a cached handle. `None` when `file` is not cached.
    fn restart_cached(&self, category: SoundCategory, file: &str) -> Option<bool> {
        let mut cache = lock(&self.cache);
        let handle = cache.get_mut(file)?;
        Some(match handle.restart() {
            Ok(()) => {
                tracing::debug!("Playing {} cue", category);
                true
            }
            Err(e) => {
                tracing::warn!("Playback of {} cue rejected: {}", category, e);
                false
            }
        })
    }

    /// Load every category's sound into the cache. Returns how many loaded.
    pub fn preload(&self) -> usize {
        let mut cache = lock(&self.cache);
        for category in SoundCategory::ALL {
            let file = self.settings.file_for(category);
            if cache.contains_key(file) {
                continue;
            }
            match self.backend.load(&self.sound_dir.join(file)) {
                Ok(handle) => {
                    cache.insert(file.to_string(), handle);
                }
                Err(e) => tracing::warn!("Could not preload {} cue: {}", category, e),
            }
        }
        cache.len()
    }

    /// Drop every cached handle.
    pub fn clear_cache(&self) {
        lock(&self.cache).clear();
    }

    pub fn cached_count(&self) -> usize {
        lock(&self.cache).len()
    }
}
