//! Sound cues through the engine.

use crate::mocks::Harness;
use netwatch_a11y::audio::SoundCategory;
use netwatch_a11y::input::{FocusTarget, KeyCombo};
use netwatch_a11y::preferences::{PreferenceFlag, PreferenceSet};

#[test]
fn test_no_cue_while_sound_feedback_off() {
    let h = Harness::in_memory();
    let engine = &h.engine;

    engine.toggle_preference(PreferenceFlag::LargeText).unwrap();
    engine
        .router()
        .handle_key(KeyCombo::alt_shift('c'), FocusTarget::None);
    engine.repository().save("Quiet", PreferenceSet::default()).unwrap();
    engine.activator().activate("Quiet").unwrap();

    assert!(h.audio.loaded.lock().unwrap().is_empty());
    assert!(h.audio.played_files().is_empty());
    assert!(!engine.sound().unwrap().play(SoundCategory::Error));
}

#[test]
fn test_shortcut_plays_toggle_cue() {
    let h = Harness::in_memory();
    let engine = &h.engine;
    engine
        .set_preference(PreferenceFlag::SoundFeedback, true.into())
        .unwrap();
    // Turning sound on is itself announced with a cue.
    assert_eq!(h.audio.played_files(), vec!["toggle.mp3"]);

    engine
        .router()
        .handle_key(KeyCombo::alt_shift('m'), FocusTarget::Button);
    engine
        .router()
        .handle_key(KeyCombo::alt_shift('f'), FocusTarget::Button);

    assert_eq!(
        h.audio.played_files(),
        vec!["toggle.mp3", "toggle.mp3", "toggle.mp3"]
    );
    // One load per file; later plays reuse the cached handle.
    assert_eq!(h.audio.loaded.lock().unwrap().len(), 1);
}

#[test]
fn test_activation_plays_success_cue() {
    let h = Harness::in_memory();
    let engine = &h.engine;
    let values = PreferenceSet {
        sound_feedback: true,
        dyslexic_font: true,
        ..Default::default()
    };
    engine.repository().save("Audible", values).unwrap();

    engine.activator().activate("Audible").unwrap();

    assert_eq!(h.audio.played_files(), vec!["success.mp3"]);
    let loaded = h.audio.loaded.lock().unwrap().clone();
    assert_eq!(
        loaded[0].to_string_lossy(),
        "/opt/netwatch/sounds/success.mp3"
    );
}

#[test]
fn test_suppressed_shortcut_is_silent() {
    let h = Harness::in_memory();
    h.engine
        .set_preference(PreferenceFlag::SoundFeedback, true.into())
        .unwrap();
    let before = h.audio.played_files().len();

    h.engine
        .router()
        .handle_key(KeyCombo::alt_shift('c'), FocusTarget::TextArea);

    assert_eq!(h.audio.played_files().len(), before);
}
