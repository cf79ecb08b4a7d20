//! Document-root effects driven by the store.

use crate::mocks::Harness;
use netwatch_a11y::accessibility::Reconciliation;
use netwatch_a11y::input::{FocusTarget, KeyCombo, ShortcutOutcome};
use netwatch_a11y::preferences::{ColorBlindMode, OsPreferences, PreferenceFlag, PreferenceSet};
use netwatch_a11y::storage::MemoryStore;
use std::sync::{Arc, Mutex};

/// A bulk replace produces exactly one reconciliation pass.
#[test]
fn test_one_reconciliation_per_replace_all() {
    let h = Harness::in_memory();
    let reports: Arc<Mutex<Vec<Reconciliation>>> = Arc::default();
    let sink = Arc::clone(&reports);
    let _sub = h
        .engine
        .applier()
        .subscribe(move |r| sink.lock().unwrap().push(r.clone()));

    let set = PreferenceSet {
        high_contrast: true,
        large_text: true,
        reduced_motion: true,
        focus_mode: true,
        color_blind_mode: ColorBlindMode::Achromatopsia,
        ..Default::default()
    };
    h.engine.store().replace_all(set).unwrap();

    let reports = reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(
        reports[0].markers,
        vec![
            "high-contrast",
            "large-text",
            "reduced-motion",
            "focus-mode",
            "colorblind-achromatopsia"
        ]
    );
}

/// At most one colorblind marker is present, whatever the sequence of changes.
#[test]
fn test_colorblind_marker_exclusivity() {
    let h = Harness::in_memory();
    let count_markers = || {
        h.engine.applier().inspect(|root| {
            ColorBlindMode::all_marker_classes()
                .filter(|class| root.has_class(class))
                .count()
        })
    };

    for _ in 0..(ColorBlindMode::ALL.len() * 2 - 1) {
        h.engine
            .toggle_preference(PreferenceFlag::ColorBlindMode)
            .unwrap();
        let expected = usize::from(h.engine.store().is_enabled(PreferenceFlag::ColorBlindMode));
        assert_eq!(count_markers(), expected);
    }

    let outcome = h
        .engine
        .router()
        .handle_key(KeyCombo::alt_shift('0'), FocusTarget::None);
    assert!(matches!(outcome, ShortcutOutcome::Applied { .. }));
    assert_eq!(count_markers(), 0);
    assert!(!h.engine.store().is_enabled(PreferenceFlag::ColorBlindMode));
}

#[test]
fn test_os_reduced_motion_floor_survives_user_off() {
    let os = OsPreferences {
        reduced_motion: true,
        ..Default::default()
    };
    let h = Harness::with_os(Arc::new(MemoryStore::new()), os);
    let engine = &h.engine;

    assert!(engine.store().is_enabled(PreferenceFlag::ReducedMotion));
    engine
        .set_preference(PreferenceFlag::ReducedMotion, false.into())
        .unwrap();
    assert!(engine.applier().inspect(|root| root.has_class("reduced-motion")));

    engine.os_watcher().update(OsPreferences::default());
    assert!(!engine.applier().inspect(|root| root.has_class("reduced-motion")));
}

#[test]
fn test_user_high_contrast_not_downgraded_by_os() {
    let os = OsPreferences {
        high_contrast: true,
        ..Default::default()
    };
    let h = Harness::with_os(Arc::new(MemoryStore::new()), os);
    let engine = &h.engine;
    assert!(engine.store().is_enabled(PreferenceFlag::HighContrast));

    engine.os_watcher().update(OsPreferences::default());
    assert!(engine.store().is_enabled(PreferenceFlag::HighContrast));
    assert!(engine.applier().inspect(|root| root.has_class("high-contrast")));
}

#[tokio::test]
async fn test_shortcut_announces_change() {
    let h = Harness::in_memory();
    h.engine
        .router()
        .handle_key("alt+shift+t".parse().unwrap(), FocusTarget::Button);
    h.engine
        .router()
        .handle_key("alt+shift+b".parse().unwrap(), FocusTarget::Button);
    h.flush().await;

    // Queued texts on one channel coalesce to the latest.
    assert_eq!(
        h.polite.delivered(),
        vec!["Color blind mode: Protanopia (Red-Green)"]
    );
    assert!(h.engine.applier().inspect(|root| root.has_class("large-text")));
}

/// The last thing read out matches the live value after repeated toggles.
#[tokio::test]
async fn test_triple_toggle_ends_on_live_value() {
    let h = Harness::in_memory();
    let router = h.engine.router();

    router.handle_key(KeyCombo::alt_shift('t'), FocusTarget::None);
    h.flush().await;
    router.handle_key(KeyCombo::alt_shift('t'), FocusTarget::None);
    router.handle_key(KeyCombo::alt_shift('t'), FocusTarget::None);
    h.flush().await;

    assert!(h.engine.store().is_enabled(PreferenceFlag::LargeText));
    assert_eq!(
        h.polite.delivered().last().map(String::as_str),
        Some("Large text on")
    );
}
