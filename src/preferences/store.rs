//! The live preference store.
//!
//! Holds the one live [`PreferenceSet`], persists each flag under its own key
//! and notifies subscribers after every effective change. A bulk replace
//! produces exactly one notification.

use super::{OsPreferences, PreferenceError, PreferenceFlag, PreferenceSet, PreferenceValue};
use crate::lock;
use crate::observer::ListenerSet;
use crate::storage::{SharedStore, StorageError};
use std::sync::{Arc, Mutex};

pub use crate::observer::Subscription;

/// A change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceChange {
    /// Flags whose value changed
    pub changed: Vec<PreferenceFlag>,
    /// The live set after the change
    pub snapshot: PreferenceSet,
    /// Whether the change came from a bulk replace
    pub bulk: bool,
}

struct StoreState {
    live: PreferenceSet,
    defaults: PreferenceSet,
}

/// Shared handle to the live preferences. Clones refer to the same state.
#[derive(Clone)]
pub struct PreferenceStore {
    state: Arc<Mutex<StoreState>>,
    storage: SharedStore,
    listeners: ListenerSet<PreferenceChange>,
}

impl PreferenceStore {
    /// Load the live set from storage.
    ///
    /// Every key is parsed on its own. Missing, unreadable or invalid values
    /// take the OS-derived default; loading never fails.
    pub fn load(storage: SharedStore, os: &OsPreferences) -> Self {
        let defaults = PreferenceSet::defaults_for(os);
        let mut live = defaults;

        for flag in PreferenceFlag::ALL {
            let key = flag.storage_key();
            let raw = match storage.get(&key) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!("Could not read {}: {}", key, e);
                    None
                }
            };

            let Some(raw) = raw else {
                continue;
            };

            match flag.parse_value(&raw) {
                Some(value) => {
                    // parse_value is flag-aware, kinds always match.
                    let _ = live.set(flag, value);
                }
                None => {
                    tracing::warn!("Ignoring invalid stored value {:?} for {}", raw, key);
                }
            }
        }

        tracing::debug!("Loaded preferences: {:?}", live);

        Self {
            state: Arc::new(Mutex::new(StoreState { live, defaults })),
            storage,
            listeners: ListenerSet::new(),
        }
    }

    /// Current value of a flag.
    pub fn get(&self, flag: PreferenceFlag) -> PreferenceValue {
        lock(&self.state).live.get(flag)
    }

    /// Whether a flag is on (for the color-blind flag: whether a mode is active).
    pub fn is_enabled(&self, flag: PreferenceFlag) -> bool {
        self.get(flag).is_enabled()
    }

    /// Snapshot of the live set.
    pub fn get_all(&self) -> PreferenceSet {
        lock(&self.state).live
    }

    /// Defaults used for resets.
    pub fn defaults(&self) -> PreferenceSet {
        lock(&self.state).defaults
    }

    /// Recompute defaults after the OS preferences changed. The live set is untouched.
    pub fn update_defaults(&self, os: &OsPreferences) {
        lock(&self.state).defaults = PreferenceSet::defaults_for(os);
    }

    /// Set one flag.
    ///
    /// The live value changes and subscribers are notified even when the write
    /// to storage fails; the failed write is reported through the result.
    pub fn set(&self, flag: PreferenceFlag, value: PreferenceValue) -> Result<(), PreferenceError> {
        let snapshot = {
            let mut state = lock(&self.state);
            let mut next = state.live;
            next.set(flag, value)?;
            if next == state.live {
                return Ok(());
            }
            state.live = next;
            next
        };

        tracing::debug!("Preference {} set to {}", flag, value);
        let written = self.persist(flag, value);

        self.listeners.emit(&PreferenceChange {
            changed: vec![flag],
            snapshot,
            bulk: false,
        });

        written.map_err(PreferenceError::from)
    }

    /// Flip a boolean flag or advance the color-blind mode. Returns the new value.
    pub fn toggle(&self, flag: PreferenceFlag) -> Result<PreferenceValue, PreferenceError> {
        let value = self.get_all().toggled(flag);
        self.set(flag, value)?;
        Ok(value)
    }

    /// Replace the whole live set in one step.
    ///
    /// Subscribers see a single notification carrying every changed flag.
    /// All keys are written; the first failed write is reported after the
    /// remaining keys were attempted.
    pub fn replace_all(&self, set: PreferenceSet) -> Result<(), StorageError> {
        let changed = {
            let mut state = lock(&self.state);
            let changed = state.live.diff(&set);
            state.live = set;
            changed
        };

        let mut first_error = None;
        for flag in PreferenceFlag::ALL {
            if let Err(e) = self.persist(flag, set.get(flag)) {
                first_error.get_or_insert(e);
            }
        }

        if !changed.is_empty() {
            tracing::debug!("Replaced preferences, {} flag(s) changed", changed.len());
            self.listeners.emit(&PreferenceChange {
                changed,
                snapshot: set,
                bulk: true,
            });
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Replace the live set with the defaults.
    pub fn reset_to_defaults(&self) -> Result<(), StorageError> {
        self.replace_all(self.defaults())
    }

    /// Listen for changes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&PreferenceChange) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    /// Whether values survive a restart.
    pub fn is_durable(&self) -> bool {
        self.storage.is_durable()
    }

    fn persist(&self, flag: PreferenceFlag, value: PreferenceValue) -> Result<(), StorageError> {
        let key = flag.storage_key();
        self.storage
            .set(&key, &value.to_storage_string())
            .inspect_err(|e| tracing::warn!("Failed to persist {}: {}", key, e))
    }
}
