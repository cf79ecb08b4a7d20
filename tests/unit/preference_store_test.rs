//! Unit tests for the preference store.

use netwatch_a11y::preferences::{
    ColorBlindMode, OsPreferences, PreferenceChange, PreferenceFlag, PreferenceSet,
    PreferenceStore, PreferenceValue,
};
use netwatch_a11y::storage::{KeyValueStore, MemoryStore};
use std::sync::{Arc, Mutex};

fn fresh() -> (PreferenceStore, Arc<MemoryStore>) {
    let storage = Arc::new(MemoryStore::new());
    let store = PreferenceStore::load(storage.clone(), &OsPreferences::default());
    (store, storage)
}

/// Every flag reads back what was set, in memory and after a reload.
#[test]
fn test_set_get_round_trip_every_flag() {
    let (store, storage) = fresh();

    for flag in PreferenceFlag::ALL {
        let value = store.get_all().toggled(flag);
        store.set(flag, value).unwrap();
        assert_eq!(store.get(flag), value, "{} in memory", flag);
    }

    let reloaded = PreferenceStore::load(storage, &OsPreferences::default());
    assert_eq!(reloaded.get_all(), store.get_all());
}

#[test]
fn test_every_color_blind_mode_persists() {
    let (store, storage) = fresh();
    for mode in ColorBlindMode::ALL {
        store
            .set(PreferenceFlag::ColorBlindMode, PreferenceValue::ColorBlind(mode))
            .unwrap();
        assert_eq!(
            storage.get("a11y-colorBlindMode").unwrap().as_deref(),
            Some(mode.as_str())
        );
    }
}

#[test]
fn test_missing_keys_take_os_defaults() {
    let storage = Arc::new(MemoryStore::new());
    storage.set("a11y-highContrast", "false").unwrap();
    let os = OsPreferences {
        reduced_motion: true,
        high_contrast: true,
        ..Default::default()
    };

    let store = PreferenceStore::load(storage, &os);
    // Stored explicit value wins over the OS default.
    assert!(!store.is_enabled(PreferenceFlag::HighContrast));
    assert!(store.is_enabled(PreferenceFlag::ReducedMotion));
}

#[test]
fn test_reset_to_defaults_is_one_notification() {
    let (store, _) = fresh();
    store.set(PreferenceFlag::LargeText, true.into()).unwrap();
    store.set(PreferenceFlag::Monochrome, true.into()).unwrap();

    let events: Arc<Mutex<Vec<PreferenceChange>>> = Arc::default();
    let sink = Arc::clone(&events);
    let _sub = store.subscribe(move |change| sink.lock().unwrap().push(change.clone()));

    store.reset_to_defaults().unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].changed,
        vec![PreferenceFlag::LargeText, PreferenceFlag::Monochrome]
    );
    assert_eq!(store.get_all(), PreferenceSet::default());
}

#[test]
fn test_replace_with_identical_set_is_silent() {
    let (store, _) = fresh();
    let calls = Arc::new(Mutex::new(0));
    let c = Arc::clone(&calls);
    let _sub = store.subscribe(move |_| *c.lock().unwrap() += 1);

    store.replace_all(store.get_all()).unwrap();
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[test]
fn test_unsubscribe_stops_notifications() {
    let (store, _) = fresh();
    let calls = Arc::new(Mutex::new(0));
    let c = Arc::clone(&calls);
    let sub = store.subscribe(move |_| *c.lock().unwrap() += 1);

    store.toggle(PreferenceFlag::ReadingGuide).unwrap();
    sub.unsubscribe();
    store.toggle(PreferenceFlag::ReadingGuide).unwrap();

    assert_eq!(*calls.lock().unwrap(), 1);
}

#[test]
fn test_listener_can_read_store() {
    let (store, _) = fresh();
    let reader = store.clone();
    let seen = Arc::new(Mutex::new(None));
    let s = Arc::clone(&seen);
    let _sub = store.subscribe(move |_| {
        *s.lock().unwrap() = Some(reader.is_enabled(PreferenceFlag::TextSpacing));
    });

    store.set(PreferenceFlag::TextSpacing, true.into()).unwrap();
    assert_eq!(*seen.lock().unwrap(), Some(true));
}
