//! Behaviour when the backing store rejects writes.

use crate::mocks::{FlakyStore, Harness};
use netwatch_a11y::preferences::{PreferenceError, PreferenceFlag, PreferenceSet};
use netwatch_a11y::storage::{open_with_fallback, StorageError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_failed_write_still_updates_live_value() {
    let storage = Arc::new(FlakyStore::default());
    let h = Harness::new(storage.clone());
    let notified = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notified);
    let _sub = h.engine.store().subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    storage.fail_writes(true);
    let result = h
        .engine
        .set_preference(PreferenceFlag::HighContrast, true.into());

    assert!(matches!(
        result,
        Err(PreferenceError::Storage(StorageError::Unavailable(_)))
    ));
    assert!(h.engine.store().is_enabled(PreferenceFlag::HighContrast));
    assert_eq!(notified.load(Ordering::SeqCst), 1);
    assert!(h.engine.applier().inspect(|root| root.has_class("high-contrast")));
}

#[test]
fn test_failed_write_is_not_persisted() {
    let storage = Arc::new(FlakyStore::default());
    let h = Harness::new(storage.clone());
    storage.fail_writes(true);
    let _ = h
        .engine
        .set_preference(PreferenceFlag::Monochrome, true.into());
    drop(h);

    storage.fail_writes(false);
    let reopened = Harness::new(storage);
    assert!(!reopened.engine.store().is_enabled(PreferenceFlag::Monochrome));
}

#[tokio::test]
async fn test_activation_applies_for_session_when_storage_fails() {
    let storage = Arc::new(FlakyStore::default());
    let h = Harness::new(storage.clone());
    let values = PreferenceSet {
        reading_guide: true,
        ..Default::default()
    };
    h.engine.repository().save("Travel", values).unwrap();

    storage.fail_writes(true);
    let summary = h.engine.activator().activate("Travel").unwrap();

    assert!(!summary.persisted);
    assert_eq!(h.engine.store().get_all(), values);
    assert_eq!(h.engine.repository().active().as_deref(), Some("Travel"));
    h.flush().await;
    assert_eq!(h.polite.delivered(), vec![summary.message]);
}

#[test]
fn test_save_fails_when_storage_rejects() {
    let storage = Arc::new(FlakyStore::default());
    let h = Harness::new(storage.clone());
    storage.fail_writes(true);

    assert!(h
        .engine
        .repository()
        .save("Lost", PreferenceSet::default())
        .is_err());
}

#[test]
fn test_open_with_fallback_on_directory() {
    let dir = tempfile::tempdir().unwrap();

    let (storage, error) = open_with_fallback(dir.path());

    assert!(error.is_some());
    assert!(!storage.is_durable());
    let h = Harness::new(storage);
    h.engine
        .set_preference(PreferenceFlag::LargeText, true.into())
        .unwrap();
    assert!(h.engine.store().is_enabled(PreferenceFlag::LargeText));
    assert!(!h.engine.store().is_durable());
}
