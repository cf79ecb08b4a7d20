//! Profile storage and management.
//!
//! Profiles are cached in memory and written through to the key-value store.
//! When a write fails the in-memory state still changes for the session and
//! the failure is returned to the caller.

use super::document::ProfileDocument;
use super::{
    normalize_name, Backup, BackupReason, Profile, ProfileError, ACTIVE_PROFILE_KEY, BACKUPS_KEY,
    PROFILE_KEY_PREFIX,
};
use crate::lock;
use crate::preferences::{PreferenceSet, PreferenceStore};
use crate::storage::{SharedStore, StorageError};
use chrono::Utc;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Default number of backups kept.
pub const DEFAULT_MAX_BACKUPS: usize = 10;

struct RepositoryState {
    profiles: BTreeMap<String, Profile>,
    /// Oldest first
    backups: VecDeque<Backup>,
    active: Option<String>,
}

/// Manager for saved profiles and their backups. Clones share state.
#[derive(Clone)]
pub struct ProfileRepository {
    state: Arc<Mutex<RepositoryState>>,
    storage: SharedStore,
    max_backups: usize,
}

impl ProfileRepository {
    /// Load profiles, backups and the active profile from storage.
    ///
    /// Corrupt entries are skipped with a warning.
    pub fn open(storage: SharedStore, max_backups: usize) -> Self {
        let mut profiles = BTreeMap::new();

        match storage.keys(PROFILE_KEY_PREFIX) {
            Ok(keys) => {
                for key in keys {
                    match Self::read_profile(&storage, &key) {
                        Ok(profile) => {
                            profiles.insert(profile.name.clone(), profile);
                        }
                        Err(e) => tracing::warn!("Skipping profile {}: {}", key, e),
                    }
                }
            }
            Err(e) => tracing::warn!("Could not list profiles: {}", e),
        }

        let backups = match storage.get(BACKUPS_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<VecDeque<Backup>>(&raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding corrupt backup history: {}", e);
                VecDeque::new()
            }),
            Ok(None) => VecDeque::new(),
            Err(e) => {
                tracing::warn!("Could not read backup history: {}", e);
                VecDeque::new()
            }
        };

        let active = storage.get(ACTIVE_PROFILE_KEY).unwrap_or_else(|e| {
            tracing::warn!("Could not read active profile: {}", e);
            None
        });

        tracing::debug!(
            "Loaded {} profile(s), {} backup(s), active {:?}",
            profiles.len(),
            backups.len(),
            active
        );

        Self {
            state: Arc::new(Mutex::new(RepositoryState {
                profiles,
                backups,
                active,
            })),
            storage,
            max_backups: max_backups.max(1),
        }
    }

    fn read_profile(storage: &SharedStore, key: &str) -> Result<Profile, StorageError> {
        let raw = storage.get(key)?.ok_or_else(|| StorageError::Corrupt {
            key: key.to_string(),
            reason: "vanished while loading".to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    /// All profiles, sorted by name.
    pub fn list(&self) -> Vec<Profile> {
        lock(&self.state).profiles.values().cloned().collect()
    }

    /// Get a profile by name.
    pub fn get(&self, name: &str) -> Option<Profile> {
        lock(&self.state).profiles.get(name.trim()).cloned()
    }

    /// Check if a profile exists.
    pub fn contains(&self, name: &str) -> bool {
        lock(&self.state).profiles.contains_key(name.trim())
    }

    /// Get the number of profiles.
    pub fn count(&self) -> usize {
        lock(&self.state).profiles.len()
    }

    /// Save a snapshot under `name`.
    ///
    /// Saving over an existing profile first appends one backup holding the
    /// previous values, then overwrites in place (id and creation time kept).
    pub fn save(&self, name: &str, values: PreferenceSet) -> Result<Profile, ProfileError> {
        let name = normalize_name(name)?;

        let (profile, backup_written) = {
            let mut state = lock(&self.state);
            let existing = state.profiles.get(&name).cloned();
            let (profile, backup_written) = match existing {
                Some(mut profile) => {
                    let backup = Backup::new(&name, profile.values, BackupReason::Overwrite);
                    self.push_backup(&mut state, backup);
                    profile.values = values;
                    profile.updated_at = Utc::now();
                    (profile, true)
                }
                None => (Profile::new(&name, values), false),
            };
            state.profiles.insert(name.clone(), profile.clone());
            (profile, backup_written)
        };

        if backup_written {
            tracing::info!("Overwrote profile {}", name);
            self.persist_backups()?;
        } else {
            tracing::info!("Saved new profile {}", name);
        }
        self.persist_profile(&profile)?;

        Ok(profile)
    }

    /// Delete a profile.
    ///
    /// Its values are backed up first. If it was the active profile the
    /// active reference is cleared; the live preferences are not touched.
    pub fn delete(&self, name: &str) -> Result<(), ProfileError> {
        let name = name.trim();
        let was_active = {
            let mut state = lock(&self.state);
            let removed = state
                .profiles
                .remove(name)
                .ok_or_else(|| ProfileError::ProfileNotFound(name.to_string()))?;
            self.push_backup(&mut state, Backup::new(name, removed.values, BackupReason::Delete));

            let was_active = state.active.as_deref() == Some(name);
            if was_active {
                state.active = None;
            }
            was_active
        };

        tracing::info!("Deleted profile {}", name);
        self.storage.remove(&Profile::storage_key(name))?;
        self.persist_backups()?;
        if was_active {
            self.storage.remove(ACTIVE_PROFILE_KEY)?;
        }

        Ok(())
    }

    /// Name of the active profile. A reference to a missing profile reads as none.
    pub fn active(&self) -> Option<String> {
        let state = lock(&self.state);
        state
            .active
            .as_ref()
            .filter(|name| state.profiles.contains_key(name.as_str()))
            .cloned()
    }

    /// Mark a profile as active.
    pub fn set_active(&self, name: &str) -> Result<(), ProfileError> {
        let name = name.trim();
        {
            let mut state = lock(&self.state);
            if !state.profiles.contains_key(name) {
                return Err(ProfileError::ProfileNotFound(name.to_string()));
            }
            state.active = Some(name.to_string());
        }
        self.storage.set(ACTIVE_PROFILE_KEY, name)?;
        Ok(())
    }

    /// Forget the active profile.
    pub fn clear_active(&self) -> Result<(), StorageError> {
        lock(&self.state).active = None;
        self.storage.remove(ACTIVE_PROFILE_KEY)
    }

    /// Append a backup of arbitrary values (used before bulk resets).
    pub fn record_backup(
        &self,
        name: &str,
        values: PreferenceSet,
        reason: BackupReason,
    ) -> Result<(), StorageError> {
        {
            let mut state = lock(&self.state);
            self.push_backup(&mut state, Backup::new(name, values, reason));
        }
        self.persist_backups()
    }

    /// Backups, oldest first, optionally only those of one profile.
    pub fn list_backups(&self, name: Option<&str>) -> Vec<Backup> {
        let state = lock(&self.state);
        state
            .backups
            .iter()
            .filter(|b| name.map_or(true, |n| b.name == n.trim()))
            .cloned()
            .collect()
    }

    /// Backup at `index` of the full, oldest-first history.
    pub fn backup(&self, index: usize) -> Option<Backup> {
        lock(&self.state).backups.get(index).cloned()
    }

    /// Re-apply a backup's values as the live preferences.
    ///
    /// The backup stays in the history.
    pub fn restore_backup(
        &self,
        index: usize,
        store: &PreferenceStore,
    ) -> Result<Backup, ProfileError> {
        let backup = self.backup(index).ok_or(ProfileError::BackupNotFound(index))?;
        tracing::info!(
            "Restoring backup {} of {} taken {}",
            index,
            backup.name,
            backup.date
        );
        store.replace_all(backup.values)?;
        Ok(backup)
    }

    /// Export a profile as a transferable document.
    pub fn export(&self, name: &str) -> Result<ProfileDocument, ProfileError> {
        self.get(name)
            .map(|p| ProfileDocument::from_profile(&p))
            .ok_or_else(|| ProfileError::ProfileNotFound(name.trim().to_string()))
    }

    /// Export a profile as pretty-printed JSON.
    pub fn export_json(&self, name: &str) -> Result<String, ProfileError> {
        self.export(name)?.to_json()
    }

    /// Import a document and save it (overwriting, with backup, if the name exists).
    pub fn import(&self, json: &str) -> Result<Profile, ProfileError> {
        let doc = ProfileDocument::parse(json)?;
        tracing::info!("Importing profile {}", doc.name);
        self.save(&doc.name, doc.values)
    }

    /// Maximum number of backups kept.
    pub fn max_backups(&self) -> usize {
        self.max_backups
    }

    fn push_backup(&self, state: &mut RepositoryState, backup: Backup) {
        state.backups.push_back(backup);
        while state.backups.len() > self.max_backups {
            if let Some(evicted) = state.backups.pop_front() {
                tracing::debug!("Evicted backup of {} from {}", evicted.name, evicted.date);
            }
        }
    }

    fn persist_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string(profile).map_err(|e| StorageError::Serialize(e.to_string()))?;
        self.storage
            .set(&Profile::storage_key(&profile.name), &raw)
            .inspect_err(|e| tracing::warn!("Failed to persist profile {}: {}", profile.name, e))
    }

    fn persist_backups(&self) -> Result<(), StorageError> {
        let raw = {
            let state = lock(&self.state);
            serde_json::to_string(&state.backups)
                .map_err(|e| StorageError::Serialize(e.to_string()))?
        };
        self.storage
            .set(BACKUPS_KEY, &raw)
            .inspect_err(|e| tracing::warn!("Failed to persist backups: {}", e))
    }
}
