//! Global announce/play entry points.
//!
//! The dispatch slot is process-wide, so everything touching it lives in one test.

use crate::mocks::Harness;
use netwatch_a11y::audio::SoundCategory;
use netwatch_a11y::dispatch;
use netwatch_a11y::preferences::PreferenceFlag;
use netwatch_a11y::Politeness;

#[tokio::test]
async fn test_dispatch_lifecycle() {
    // Before init everything is a no-op.
    dispatch::teardown();
    assert!(!dispatch::is_initialized());
    assert!(!dispatch::announce("too early", Politeness::Polite));
    assert!(!dispatch::play_sound(SoundCategory::Info));

    let mut h = Harness::in_memory();
    h.engine
        .set_preference(PreferenceFlag::SoundFeedback, true.into())
        .unwrap();
    h.flush().await;
    let played_before = h.audio.played_files().len();

    h.engine.install_global_dispatch();
    assert!(dispatch::is_initialized());
    assert!(dispatch::announce("Connection lost", Politeness::Assertive));
    assert!(dispatch::play_sound(SoundCategory::Warning));
    h.flush().await;

    assert_eq!(h.assertive.delivered(), vec!["Connection lost"]);
    assert_eq!(h.audio.played_files()[played_before..], ["warning.mp3"]);

    h.engine.shutdown();
    assert!(!dispatch::is_initialized());
    assert!(!dispatch::announce("too late", Politeness::Polite));
    assert!(!dispatch::play_sound(SoundCategory::Info));

    // Dropping an engine that installed dispatch removes it.
    let mut second = Harness::in_memory();
    second.engine.install_global_dispatch();
    assert!(dispatch::is_initialized());
    drop(second);
    assert!(!dispatch::is_initialized());

    // A later install survives the earlier owner going away.
    let mut first = Harness::in_memory();
    let mut latest = Harness::in_memory();
    first.engine.install_global_dispatch();
    latest.engine.install_global_dispatch();
    drop(first);
    assert!(dispatch::is_initialized());
    assert!(dispatch::announce("Still here", Politeness::Polite));
    latest.flush().await;
    assert_eq!(latest.polite.delivered(), vec!["Still here"]);
    drop(latest);
    assert!(!dispatch::is_initialized());
}
