//! NetWatch Accessibility - preference and announcement engine
//!
//! Accessibility preferences for the NetWatch network-monitoring dashboard.
//! Persists a fixed set of accessibility flags, manages named profiles with
//! backups and export/import, mirrors the live flags onto the document root,
//! and narrates changes to screen readers and through short sound cues.

pub mod accessibility;
pub mod audio;
pub mod dispatch;
pub mod engine;
pub mod input;
mod observer;
pub mod preferences;
pub mod profiles;
pub mod storage;

use std::sync::{Mutex, MutexGuard, PoisonError};

// Re-export commonly used types
pub use accessibility::{LiveAnnouncer, Politeness};
pub use engine::AccessibilityEngine;
pub use observer::Subscription;
pub use preferences::{ColorBlindMode, PreferenceFlag, PreferenceSet, PreferenceStore, PreferenceValue};
pub use profiles::{ProfileActivator, ProfileRepository};
pub use storage::config::AppConfig;

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
