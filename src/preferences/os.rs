//! OS-level media preferences.
//!
//! Mirrors the `prefers-reduced-motion`, `prefers-contrast` and
//! `prefers-color-scheme` media queries. Policy per input:
//! - reduced motion is a floor: the marker is applied whenever the OS asks for it
//! - contrast only seeds the default of the high-contrast flag
//! - color scheme is informational and never touches a flag

use crate::lock;
use crate::observer::{ListenerSet, Subscription};
use crate::storage::config::OsSettings;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// OS color scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorScheme {
    #[default]
    NoPreference,
    Light,
    Dark,
}

impl ColorScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::NoPreference => "no-preference",
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
        }
    }
}

/// Snapshot of the OS media preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OsPreferences {
    /// `prefers-reduced-motion: reduce`
    pub reduced_motion: bool,
    /// `prefers-contrast: more`
    pub high_contrast: bool,
    /// `prefers-color-scheme`
    pub color_scheme: ColorScheme,
}

impl OsPreferences {
    /// Detect the current desktop preferences.
    ///
    /// The color scheme comes from the desktop theme. Desktop hosts expose no
    /// portable reduced-motion or contrast signal, so those read from the
    /// configured overrides and default to off.
    pub fn detect(overrides: &OsSettings) -> Self {
        let detected_scheme = match dark_light::detect() {
            dark_light::Mode::Dark => ColorScheme::Dark,
            dark_light::Mode::Light => ColorScheme::Light,
            dark_light::Mode::Default => ColorScheme::NoPreference,
        };

        let prefs = Self {
            reduced_motion: overrides.reduced_motion.unwrap_or(false),
            high_contrast: overrides.high_contrast.unwrap_or(false),
            color_scheme: overrides.color_scheme.unwrap_or(detected_scheme),
        };
        tracing::debug!("Detected OS preferences: {:?}", prefs);
        prefs
    }
}

/// Observable holder for the OS preferences.
///
/// The host feeds media-query changes in through [`OsPreferenceWatcher::update`];
/// subscribers are told only about real changes.
#[derive(Clone)]
pub struct OsPreferenceWatcher {
    current: Arc<Mutex<OsPreferences>>,
    listeners: ListenerSet<OsPreferences>,
}

impl Default for OsPreferenceWatcher {
    fn default() -> Self {
        Self::new(OsPreferences::default())
    }
}

impl OsPreferenceWatcher {
    pub fn new(initial: OsPreferences) -> Self {
        Self {
            current: Arc::new(Mutex::new(initial)),
            listeners: ListenerSet::new(),
        }
    }

    /// Current OS preferences.
    pub fn current(&self) -> OsPreferences {
        *lock(&self.current)
    }

    /// Record new OS preferences. Returns true if anything changed.
    pub fn update(&self, prefs: OsPreferences) -> bool {
        {
            let mut current = lock(&self.current);
            if *current == prefs {
                return false;
            }
            *current = prefs;
        }
        tracing::info!("OS preferences changed: {:?}", prefs);
        self.listeners.emit(&prefs);
        true
    }

    /// Listen for changes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&OsPreferences) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }
}
