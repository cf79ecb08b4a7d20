//! Profile activation.

use super::{BackupReason, Profile, ProfileError, ProfileRepository};
use crate::accessibility::{LiveAnnouncer, Politeness};
use crate::audio::{SoundCategory, SoundFeedbackPlayer};
use crate::preferences::{PreferenceFlag, PreferenceSet, PreferenceStore};
use crate::storage::StorageError;

/// Backup name used when the live set is reset.
pub const LIVE_BACKUP_NAME: &str = "live";

/// Outcome of activating a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationSummary {
    pub profile: Profile,
    /// Labels of the features now on
    pub enabled: Vec<String>,
    /// The announcement text
    pub message: String,
    /// Whether every write reached storage
    pub persisted: bool,
}

/// Labels of the features a set turns on, in display order.
///
/// The color-blind flag is listed by its mode name.
pub fn enabled_features(set: &PreferenceSet) -> Vec<String> {
    set.enabled_flags()
        .into_iter()
        .map(|flag| match flag {
            PreferenceFlag::ColorBlindMode => set.color_blind_mode.to_string(),
            other => other.label().to_string(),
        })
        .collect()
}

fn activation_message(name: &str, enabled: &[String]) -> String {
    if enabled.is_empty() {
        format!("Profile {} activated. No accessibility features enabled.", name)
    } else {
        format!(
            "Profile {} activated. Enabled features: {}.",
            name,
            enabled.join(", ")
        )
    }
}

/// Applies saved profiles to the live preferences.
#[derive(Clone)]
pub struct ProfileActivator {
    store: PreferenceStore,
    repository: ProfileRepository,
    announcer: LiveAnnouncer,
    sound: Option<SoundFeedbackPlayer>,
}

impl ProfileActivator {
    pub fn new(
        store: PreferenceStore,
        repository: ProfileRepository,
        announcer: LiveAnnouncer,
        sound: Option<SoundFeedbackPlayer>,
    ) -> Self {
        Self {
            store,
            repository,
            announcer,
            sound,
        }
    }

    /// Make a saved profile the live preference set.
    ///
    /// An unknown name fails without touching any state. Storage failures
    /// after that point are logged and reported through
    /// [`ActivationSummary::persisted`]; the profile is still applied for the
    /// session.
    pub fn activate(&self, name: &str) -> Result<ActivationSummary, ProfileError> {
        let profile = self
            .repository
            .get(name)
            .ok_or_else(|| ProfileError::ProfileNotFound(name.trim().to_string()))?;

        let mut persisted = true;
        if let Err(e) = self.store.replace_all(profile.values) {
            tracing::warn!("Profile {} applied but not saved: {}", profile.name, e);
            persisted = false;
        }
        match self.repository.set_active(&profile.name) {
            Ok(()) => {}
            Err(ProfileError::Storage(e)) => {
                tracing::warn!("Active profile {} not saved: {}", profile.name, e);
                persisted = false;
            }
            Err(e) => return Err(e),
        }

        let enabled = enabled_features(&profile.values);
        let message = activation_message(&profile.name, &enabled);
        tracing::info!("{}", message);

        self.announcer.announce(&message, Politeness::Polite);
        if let Some(sound) = &self.sound {
            sound.play(SoundCategory::Success);
        }

        Ok(ActivationSummary {
            profile,
            enabled,
            message,
            persisted,
        })
    }

    /// Back up the live set, then reset it to the defaults and forget the
    /// active profile.
    pub fn reset(&self) -> Result<(), StorageError> {
        let live = self.store.get_all();
        let backup = self
            .repository
            .record_backup(LIVE_BACKUP_NAME, live, BackupReason::Reset);
        let reset = self.store.reset_to_defaults();
        let cleared = self.repository.clear_active();

        tracing::info!("Preferences reset to defaults");
        self.announcer
            .announce("Accessibility settings reset to defaults", Politeness::Polite);
        if let Some(sound) = &self.sound {
            sound.play(SoundCategory::Info);
        }

        backup.and(reset).and(cleared)
    }
}
