//! Accessibility profiles.
//!
//! Named snapshots of the preference set, their backups, the transferable
//! export document, and activation of a profile onto the live preferences.

pub mod activator;
pub mod document;
pub mod repository;

use crate::preferences::PreferenceSet;
use crate::storage::StorageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use activator::{enabled_features, ActivationSummary, ProfileActivator, LIVE_BACKUP_NAME};
pub use document::{ProfileDocument, FORMAT_VERSION};
pub use repository::{ProfileRepository, DEFAULT_MAX_BACKUPS};

/// Key holding the active profile name.
pub const ACTIVE_PROFILE_KEY: &str = "a11y-active-profile";
/// Prefix of per-profile keys.
pub const PROFILE_KEY_PREFIX: &str = "a11y-profile:";
/// Key holding the backup history.
pub const BACKUPS_KEY: &str = "a11y-profile-backups";

/// A saved preference snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Unique identifier
    pub id: Uuid,
    /// Profile name
    pub name: String,
    /// Saved values
    pub values: PreferenceSet,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last overwrite timestamp
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create a new profile. The name is expected to be validated already.
    pub fn new(name: impl Into<String>, values: PreferenceSet) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            values,
            created_at: now,
            updated_at: now,
        }
    }

    /// Storage key for this profile name.
    pub fn storage_key(name: &str) -> String {
        format!("{}{}", PROFILE_KEY_PREFIX, name)
    }
}

/// Why a backup was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupReason {
    /// A profile was saved over
    Overwrite,
    /// A profile was deleted
    Delete,
    /// The live preferences were reset to defaults
    Reset,
}

impl std::fmt::Display for BackupReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackupReason::Overwrite => write!(f, "overwrite"),
            BackupReason::Delete => write!(f, "delete"),
            BackupReason::Reset => write!(f, "reset"),
        }
    }
}

/// A read-only copy of values taken before a destructive operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub id: Uuid,
    /// Profile name the values belonged to
    pub name: String,
    /// When the backup was taken
    pub date: DateTime<Utc>,
    /// Values before the operation
    pub values: PreferenceSet,
    pub reason: BackupReason,
}

impl Backup {
    pub fn new(name: impl Into<String>, values: PreferenceSet, reason: BackupReason) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            date: Utc::now(),
            values,
            reason,
        }
    }
}

/// Errors that can occur with profile management.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Profile name must not be empty")]
    InvalidProfileName,

    #[error("Malformed profile document: {0}")]
    MalformedProfileDocument(String),

    #[error("Profile document format version {found} is newer than supported version {supported}")]
    UnsupportedFormatVersion { found: u64, supported: u32 },

    #[error("No backup at index {0}")]
    BackupNotFound(usize),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Validate and normalize a user-supplied profile name.
pub fn normalize_name(name: &str) -> Result<String, ProfileError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ProfileError::InvalidProfileName);
    }
    Ok(trimmed.to_string())
}
