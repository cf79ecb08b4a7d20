//! Color vision deficiency modes.
//!
//! The color-blind preference is the only non-boolean flag. Exactly one mode is
//! active at a time, and each mode other than `None` owns one document marker.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Color vision mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBlindMode {
    /// Normal color vision
    #[default]
    None,
    /// Red-green colorblindness (most common, ~6% of males)
    Protanopia,
    /// Red-green colorblindness (similar to protanopia)
    Deuteranopia,
    /// Blue-yellow colorblindness (rare, ~0.01%)
    Tritanopia,
    /// Total color blindness
    Achromatopsia,
}

impl ColorBlindMode {
    /// All modes in cycling order.
    pub const ALL: [ColorBlindMode; 5] = [
        ColorBlindMode::None,
        ColorBlindMode::Protanopia,
        ColorBlindMode::Deuteranopia,
        ColorBlindMode::Tritanopia,
        ColorBlindMode::Achromatopsia,
    ];

    /// Persisted string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorBlindMode::None => "none",
            ColorBlindMode::Protanopia => "protanopia",
            ColorBlindMode::Deuteranopia => "deuteranopia",
            ColorBlindMode::Tritanopia => "tritanopia",
            ColorBlindMode::Achromatopsia => "achromatopsia",
        }
    }

    /// Document marker for this mode. `None` has no marker.
    pub fn marker_class(&self) -> Option<&'static str> {
        match self {
            ColorBlindMode::None => None,
            ColorBlindMode::Protanopia => Some("colorblind-protanopia"),
            ColorBlindMode::Deuteranopia => Some("colorblind-deuteranopia"),
            ColorBlindMode::Tritanopia => Some("colorblind-tritanopia"),
            ColorBlindMode::Achromatopsia => Some("colorblind-achromatopsia"),
        }
    }

    /// Every marker any mode can apply.
    pub fn all_marker_classes() -> impl Iterator<Item = &'static str> {
        Self::ALL.iter().filter_map(|mode| mode.marker_class())
    }

    /// The mode after this one, wrapping back to `None`.
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|m| m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Whether a filter is active.
    pub fn is_active(&self) -> bool {
        *self != ColorBlindMode::None
    }
}

impl std::fmt::Display for ColorBlindMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorBlindMode::None => write!(f, "None"),
            ColorBlindMode::Protanopia => write!(f, "Protanopia (Red-Green)"),
            ColorBlindMode::Deuteranopia => write!(f, "Deuteranopia (Red-Green)"),
            ColorBlindMode::Tritanopia => write!(f, "Tritanopia (Blue-Yellow)"),
            ColorBlindMode::Achromatopsia => write!(f, "Achromatopsia (Monochrome)"),
        }
    }
}

impl FromStr for ColorBlindMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}
