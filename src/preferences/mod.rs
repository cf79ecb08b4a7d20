//! Accessibility preferences.
//!
//! This module provides:
//! - The fixed set of accessibility flags and their values
//! - Complete preference sets with documented defaults
//! - The live preference store with per-key persistence
//! - OS-level media preferences (reduced motion, contrast, color scheme)

pub mod colorblind;
pub mod os;
pub mod store;

use crate::storage::StorageError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::str::FromStr;

pub use colorblind::ColorBlindMode;
pub use os::{ColorScheme, OsPreferenceWatcher, OsPreferences};
pub use store::{PreferenceChange, PreferenceStore, Subscription};

/// Prefix of every per-flag storage key.
pub const STORAGE_KEY_PREFIX: &str = "a11y-";

/// Errors raised by preference mutations.
#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("Value {value} does not fit preference {flag}")]
    ValueMismatch {
        flag: PreferenceFlag,
        value: PreferenceValue,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// An accessibility flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PreferenceFlag {
    HighContrast,
    LargeText,
    ReducedMotion,
    FocusMode,
    DyslexicFont,
    ReadingGuide,
    SoundFeedback,
    ColorBlindMode,
    CustomCursor,
    InvertColors,
    Monochrome,
    TextSpacing,
    UnderlineLinks,
}

impl PreferenceFlag {
    /// Every flag, in display order.
    pub const ALL: [PreferenceFlag; 13] = [
        PreferenceFlag::HighContrast,
        PreferenceFlag::LargeText,
        PreferenceFlag::ReducedMotion,
        PreferenceFlag::FocusMode,
        PreferenceFlag::DyslexicFont,
        PreferenceFlag::ReadingGuide,
        PreferenceFlag::SoundFeedback,
        PreferenceFlag::ColorBlindMode,
        PreferenceFlag::CustomCursor,
        PreferenceFlag::InvertColors,
        PreferenceFlag::Monochrome,
        PreferenceFlag::TextSpacing,
        PreferenceFlag::UnderlineLinks,
    ];

    /// Name used in storage keys and export documents.
    pub fn storage_name(&self) -> &'static str {
        match self {
            PreferenceFlag::HighContrast => "highContrast",
            PreferenceFlag::LargeText => "largeText",
            PreferenceFlag::ReducedMotion => "reducedMotion",
            PreferenceFlag::FocusMode => "focusMode",
            PreferenceFlag::DyslexicFont => "dyslexicFont",
            PreferenceFlag::ReadingGuide => "readingGuide",
            PreferenceFlag::SoundFeedback => "soundFeedback",
            PreferenceFlag::ColorBlindMode => "colorBlindMode",
            PreferenceFlag::CustomCursor => "customCursor",
            PreferenceFlag::InvertColors => "invertColors",
            PreferenceFlag::Monochrome => "monochrome",
            PreferenceFlag::TextSpacing => "textSpacing",
            PreferenceFlag::UnderlineLinks => "underlineLinks",
        }
    }

    /// Storage key, e.g. `a11y-highContrast`.
    pub fn storage_key(&self) -> String {
        format!("{}{}", STORAGE_KEY_PREFIX, self.storage_name())
    }

    /// Human-readable feature name used in announcements.
    pub fn label(&self) -> &'static str {
        match self {
            PreferenceFlag::HighContrast => "High contrast",
            PreferenceFlag::LargeText => "Large text",
            PreferenceFlag::ReducedMotion => "Reduced motion",
            PreferenceFlag::FocusMode => "Focus mode",
            PreferenceFlag::DyslexicFont => "Dyslexia-friendly font",
            PreferenceFlag::ReadingGuide => "Reading guide",
            PreferenceFlag::SoundFeedback => "Sound feedback",
            PreferenceFlag::ColorBlindMode => "Color blind mode",
            PreferenceFlag::CustomCursor => "Large cursor",
            PreferenceFlag::InvertColors => "Invert colors",
            PreferenceFlag::Monochrome => "Monochrome",
            PreferenceFlag::TextSpacing => "Text spacing",
            PreferenceFlag::UnderlineLinks => "Underline links",
        }
    }

    /// Document marker for boolean flags. The color-blind flag has one marker per mode.
    pub fn marker_class(&self) -> Option<&'static str> {
        match self {
            PreferenceFlag::HighContrast => Some("high-contrast"),
            PreferenceFlag::LargeText => Some("large-text"),
            PreferenceFlag::ReducedMotion => Some("reduced-motion"),
            PreferenceFlag::FocusMode => Some("focus-mode"),
            PreferenceFlag::DyslexicFont => Some("dyslexic-font"),
            PreferenceFlag::ReadingGuide => Some("reading-guide"),
            PreferenceFlag::SoundFeedback => Some("sound-feedback"),
            PreferenceFlag::ColorBlindMode => None,
            PreferenceFlag::CustomCursor => Some("custom-cursor"),
            PreferenceFlag::InvertColors => Some("invert-colors"),
            PreferenceFlag::Monochrome => Some("monochrome"),
            PreferenceFlag::TextSpacing => Some("text-spacing"),
            PreferenceFlag::UnderlineLinks => Some("underline-links"),
        }
    }

    /// Whether the flag holds a boolean.
    pub fn is_boolean(&self) -> bool {
        *self != PreferenceFlag::ColorBlindMode
    }

    /// Parse a persisted string for this flag. Returns `None` for invalid input.
    pub fn parse_value(&self, raw: &str) -> Option<PreferenceValue> {
        if self.is_boolean() {
            match raw.trim() {
                "true" => Some(PreferenceValue::Bool(true)),
                "false" => Some(PreferenceValue::Bool(false)),
                _ => None,
            }
        } else {
            raw.parse().ok().map(PreferenceValue::ColorBlind)
        }
    }

    /// Spoken description of a value, e.g. "Large text on".
    pub fn describe(&self, value: PreferenceValue) -> String {
        match value {
            PreferenceValue::Bool(true) => format!("{} on", self.label()),
            PreferenceValue::Bool(false) => format!("{} off", self.label()),
            PreferenceValue::ColorBlind(ColorBlindMode::None) => format!("{} off", self.label()),
            PreferenceValue::ColorBlind(mode) => format!("{}: {}", self.label(), mode),
        }
    }

    /// Read a value for this flag out of a JSON document.
    pub fn value_from_json(&self, value: &Value) -> Option<PreferenceValue> {
        match value {
            Value::Bool(b) if self.is_boolean() => Some(PreferenceValue::Bool(*b)),
            Value::String(s) => self.parse_value(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for PreferenceFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.storage_name())
    }
}

impl FromStr for PreferenceFlag {
    type Err = String;

    /// Accepts the storage name (`highContrast`) or the kebab-case marker
    /// spelling (`high-contrast`, `color-blind-mode`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        Self::ALL
            .iter()
            .copied()
            .find(|flag| flag.storage_name().to_ascii_lowercase() == normalized)
            .ok_or_else(|| format!("unknown preference flag: {}", s))
    }
}

/// The value of one flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceValue {
    Bool(bool),
    ColorBlind(ColorBlindMode),
}

impl PreferenceValue {
    /// Whether the value counts as an enabled feature.
    pub fn is_enabled(&self) -> bool {
        match self {
            PreferenceValue::Bool(b) => *b,
            PreferenceValue::ColorBlind(mode) => mode.is_active(),
        }
    }

    /// Persisted string form: `"true"`/`"false"` or the enum value.
    pub fn to_storage_string(&self) -> String {
        match self {
            PreferenceValue::Bool(b) => b.to_string(),
            PreferenceValue::ColorBlind(mode) => mode.as_str().to_string(),
        }
    }

    /// JSON form used in export documents and stored profiles.
    pub fn to_json(&self) -> Value {
        match self {
            PreferenceValue::Bool(b) => Value::Bool(*b),
            PreferenceValue::ColorBlind(mode) => Value::String(mode.as_str().to_string()),
        }
    }
}

impl std::fmt::Display for PreferenceValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_storage_string())
    }
}

impl From<bool> for PreferenceValue {
    fn from(value: bool) -> Self {
        PreferenceValue::Bool(value)
    }
}

impl From<ColorBlindMode> for PreferenceValue {
    fn from(mode: ColorBlindMode) -> Self {
        PreferenceValue::ColorBlind(mode)
    }
}

/// A complete set of preference values. Every flag always has a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreferenceSet {
    pub high_contrast: bool,
    pub large_text: bool,
    pub reduced_motion: bool,
    pub focus_mode: bool,
    pub dyslexic_font: bool,
    pub reading_guide: bool,
    pub sound_feedback: bool,
    pub color_blind_mode: ColorBlindMode,
    pub custom_cursor: bool,
    pub invert_colors: bool,
    pub monochrome: bool,
    pub text_spacing: bool,
    pub underline_links: bool,
}

impl PreferenceSet {
    /// Defaults seeded from OS preferences.
    ///
    /// Reduced motion and high contrast start from the OS signal; everything
    /// else starts off.
    pub fn defaults_for(os: &OsPreferences) -> Self {
        Self {
            reduced_motion: os.reduced_motion,
            high_contrast: os.high_contrast,
            ..Self::default()
        }
    }

    /// Get the value of a flag.
    pub fn get(&self, flag: PreferenceFlag) -> PreferenceValue {
        match flag {
            PreferenceFlag::HighContrast => self.high_contrast.into(),
            PreferenceFlag::LargeText => self.large_text.into(),
            PreferenceFlag::ReducedMotion => self.reduced_motion.into(),
            PreferenceFlag::FocusMode => self.focus_mode.into(),
            PreferenceFlag::DyslexicFont => self.dyslexic_font.into(),
            PreferenceFlag::ReadingGuide => self.reading_guide.into(),
            PreferenceFlag::SoundFeedback => self.sound_feedback.into(),
            PreferenceFlag::ColorBlindMode => self.color_blind_mode.into(),
            PreferenceFlag::CustomCursor => self.custom_cursor.into(),
            PreferenceFlag::InvertColors => self.invert_colors.into(),
            PreferenceFlag::Monochrome => self.monochrome.into(),
            PreferenceFlag::TextSpacing => self.text_spacing.into(),
            PreferenceFlag::UnderlineLinks => self.underline_links.into(),
        }
    }

    /// Get a boolean flag. The color-blind flag reports whether a mode is active.
    pub fn is_enabled(&self, flag: PreferenceFlag) -> bool {
        self.get(flag).is_enabled()
    }

    /// Set the value of a flag, rejecting values of the wrong kind.
    pub fn set(&mut self, flag: PreferenceFlag, value: PreferenceValue) -> Result<(), PreferenceError> {
        match (flag, value) {
            (PreferenceFlag::ColorBlindMode, PreferenceValue::ColorBlind(mode)) => {
                self.color_blind_mode = mode;
                Ok(())
            }
            (_, PreferenceValue::Bool(enabled)) => match self.bool_slot(flag) {
                Some(slot) => {
                    *slot = enabled;
                    Ok(())
                }
                None => Err(PreferenceError::ValueMismatch { flag, value }),
            },
            _ => Err(PreferenceError::ValueMismatch { flag, value }),
        }
    }

    fn bool_slot(&mut self, flag: PreferenceFlag) -> Option<&mut bool> {
        match flag {
            PreferenceFlag::HighContrast => Some(&mut self.high_contrast),
            PreferenceFlag::LargeText => Some(&mut self.large_text),
            PreferenceFlag::ReducedMotion => Some(&mut self.reduced_motion),
            PreferenceFlag::FocusMode => Some(&mut self.focus_mode),
            PreferenceFlag::DyslexicFont => Some(&mut self.dyslexic_font),
            PreferenceFlag::ReadingGuide => Some(&mut self.reading_guide),
            PreferenceFlag::SoundFeedback => Some(&mut self.sound_feedback),
            PreferenceFlag::CustomCursor => Some(&mut self.custom_cursor),
            PreferenceFlag::InvertColors => Some(&mut self.invert_colors),
            PreferenceFlag::Monochrome => Some(&mut self.monochrome),
            PreferenceFlag::TextSpacing => Some(&mut self.text_spacing),
            PreferenceFlag::UnderlineLinks => Some(&mut self.underline_links),
            PreferenceFlag::ColorBlindMode => None,
        }
    }

    /// The value a toggle of `flag` would produce.
    ///
    /// Booleans flip; the color-blind mode advances to the next mode.
    pub fn toggled(&self, flag: PreferenceFlag) -> PreferenceValue {
        match self.get(flag) {
            PreferenceValue::Bool(b) => PreferenceValue::Bool(!b),
            PreferenceValue::ColorBlind(mode) => PreferenceValue::ColorBlind(mode.next()),
        }
    }

    /// Flags that are switched on, in display order.
    pub fn enabled_flags(&self) -> Vec<PreferenceFlag> {
        PreferenceFlag::ALL
            .iter()
            .copied()
            .filter(|flag| self.is_enabled(*flag))
            .collect()
    }

    /// Flags whose values differ between two sets.
    pub fn diff(&self, other: &PreferenceSet) -> Vec<PreferenceFlag> {
        PreferenceFlag::ALL
            .iter()
            .copied()
            .filter(|flag| self.get(*flag) != other.get(*flag))
            .collect()
    }

    /// JSON object keyed by storage name.
    pub fn to_json_map(&self) -> Map<String, Value> {
        PreferenceFlag::ALL
            .iter()
            .map(|flag| (flag.storage_name().to_string(), self.get(*flag).to_json()))
            .collect()
    }

    /// Build a set from a JSON object, filling anything missing or ill-typed
    /// from `defaults`. Unknown keys are ignored.
    ///
    /// Returns the set and the flags that fell back to their default.
    pub fn from_json_lenient(
        values: &Map<String, Value>,
        defaults: &PreferenceSet,
    ) -> (PreferenceSet, Vec<PreferenceFlag>) {
        let mut set = *defaults;
        let mut defaulted = Vec::new();

        for flag in PreferenceFlag::ALL {
            let parsed = values
                .get(flag.storage_name())
                .and_then(|value| flag.value_from_json(value));

            match parsed {
                // Kinds always match here; value_from_json is flag-aware.
                Some(value) => {
                    let _ = set.set(flag, value);
                }
                None => defaulted.push(flag),
            }
        }

        (set, defaulted)
    }
}

/// Serialized as a JSON object keyed by storage name.
impl Serialize for PreferenceSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_map().serialize(serializer)
    }
}

/// Missing or ill-typed keys take the plain defaults.
impl<'de> Deserialize<'de> for PreferenceSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Map::<String, Value>::deserialize(deserializer)?;
        let (set, _) = PreferenceSet::from_json_lenient(&values, &PreferenceSet::default());
        Ok(set)
    }
}
