//! Input handling module.
//!
//! Keyboard shortcuts that toggle accessibility preferences.

pub mod keyboard;

// Re-export types
pub use keyboard::{
    default_bindings, FocusTarget, Key, KeyCombo, KeyboardShortcutRouter, Modifiers,
    ShortcutAction, ShortcutBinding, ShortcutOutcome,
};
