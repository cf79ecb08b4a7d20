//! Transferable profile documents.
//!
//! Format:
//! ```json
//! { "formatVersion": 1, "name": "Night shift", "values": { "highContrast": true, ... } }
//! ```
//! Readers accept any version up to [`FORMAT_VERSION`], ignore unknown keys
//! and fill missing ones with defaults.

use super::{normalize_name, Profile, ProfileError};
use crate::preferences::{PreferenceFlag, PreferenceSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Highest document version this build understands.
pub const FORMAT_VERSION: u32 = 1;

/// An exported profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    pub format_version: u32,
    pub name: String,
    pub values: PreferenceSet,
}

impl ProfileDocument {
    /// Build the export document for a profile.
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            name: profile.name.clone(),
            values: profile.values,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ProfileError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ProfileError::MalformedProfileDocument(e.to_string()))
    }

    /// Parse a document leniently.
    ///
    /// Fails only when the input is not a JSON object with a usable name, or
    /// when it declares a newer format version. Missing `formatVersion` reads
    /// as version 1; missing or ill-typed values take the defaults.
    pub fn parse(json: &str) -> Result<Self, ProfileError> {
        let root: Value = serde_json::from_str(json)
            .map_err(|e| ProfileError::MalformedProfileDocument(e.to_string()))?;

        let Value::Object(root) = root else {
            return Err(ProfileError::MalformedProfileDocument(
                "expected a JSON object".to_string(),
            ));
        };

        let version = match root.get("formatVersion") {
            None => 1,
            Some(v) => v.as_u64().ok_or_else(|| {
                ProfileError::MalformedProfileDocument(format!("invalid formatVersion: {}", v))
            })?,
        };
        if version > u64::from(FORMAT_VERSION) {
            return Err(ProfileError::UnsupportedFormatVersion {
                found: version,
                supported: FORMAT_VERSION,
            });
        }

        let name = root
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ProfileError::MalformedProfileDocument("missing name".to_string()))?;
        let name = normalize_name(name)?;

        let empty = Map::new();
        let values = match root.get("values") {
            Some(Value::Object(values)) => values,
            Some(other) => {
                tracing::warn!("Profile document values is not an object ({}), using defaults", other);
                &empty
            }
            None => &empty,
        };

        let (values, defaulted) =
            PreferenceSet::from_json_lenient(values, &PreferenceSet::default());
        if !defaulted.is_empty() {
            let names: Vec<&str> = defaulted.iter().map(PreferenceFlag::storage_name).collect();
            tracing::debug!("Imported profile {} defaulted: {}", name, names.join(", "));
        }

        Ok(Self {
            // Documents are upgraded to the current version on read.
            format_version: FORMAT_VERSION,
            name,
            values,
        })
    }
}
