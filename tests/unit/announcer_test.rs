//! Unit tests for the live announcer.

use netwatch_a11y::accessibility::{
    Announcement, ChannelState, LiveAnnouncer, LiveRegion, Politeness,
};
use netwatch_a11y::storage::config::AnnouncerSettings;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Clone, Default)]
struct Region {
    writes: Arc<Mutex<Vec<String>>>,
}

impl LiveRegion for Region {
    fn set_text(&mut self, text: &str) {
        self.writes.lock().unwrap().push(text.to_string());
    }
}

impl Region {
    fn delivered(&self) -> Vec<String> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|w| !w.is_empty())
            .cloned()
            .collect()
    }
}

fn attached() -> (LiveAnnouncer, Region, Region) {
    let announcer = LiveAnnouncer::new(&AnnouncerSettings::default());
    let polite = Region::default();
    let assertive = Region::default();
    announcer.attach_region(Politeness::Polite, polite.clone());
    announcer.attach_region(Politeness::Assertive, assertive.clone());
    (announcer, polite, assertive)
}

/// Advance in 16 ms steps for `total`.
fn run_for(announcer: &LiveAnnouncer, start: Instant, total: Duration) -> Instant {
    let step = Duration::from_millis(16);
    let mut now = start;
    while now < start + total {
        announcer.tick(now);
        now += step;
    }
    announcer.tick(now);
    now
}

/// Identical consecutive polite announcements are delivered once.
#[test]
fn test_identical_polite_announcements_deliver_once() {
    let (announcer, polite, _) = attached();
    let t0 = Instant::now();

    announcer.announce_at("High contrast on", Politeness::Polite, t0);
    announcer.announce_at("High contrast on", Politeness::Polite, t0);
    let now = run_for(&announcer, t0, Duration::from_millis(150));
    announcer.announce_at("High contrast on", Politeness::Polite, now);
    run_for(&announcer, now, Duration::from_millis(150));

    assert_eq!(polite.delivered(), vec!["High contrast on"]);
}

#[test]
fn test_assertive_does_not_cancel_polite() {
    let (announcer, polite, assertive) = attached();
    let t0 = Instant::now();

    announcer.announce_at("Profile saved", Politeness::Polite, t0);
    announcer.tick(t0);
    assert_eq!(announcer.state(Politeness::Polite), ChannelState::Flushing);

    announcer.announce_at("Connection lost", Politeness::Assertive, t0 + Duration::from_millis(20));
    run_for(&announcer, t0, Duration::from_millis(300));

    assert_eq!(polite.delivered(), vec!["Profile saved"]);
    assert_eq!(assertive.delivered(), vec!["Connection lost"]);
}

#[test]
fn test_order_within_channel_follows_submission() {
    let (announcer, polite, _) = attached();
    let t0 = Instant::now();

    announcer.announce_at("first", Politeness::Polite, t0);
    announcer.tick(t0);
    // Queued behind the in-flight message.
    announcer.announce_at("second", Politeness::Polite, t0 + Duration::from_millis(10));
    run_for(&announcer, t0, Duration::from_millis(400));

    assert_eq!(polite.delivered(), vec!["first", "second"]);
}

#[test]
fn test_subscribers_see_deliveries() {
    let (announcer, _, _) = attached();
    let seen: Arc<Mutex<Vec<Announcement>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let _sub = announcer.subscribe(move |a| sink.lock().unwrap().push(a.clone()));

    let t0 = Instant::now();
    announcer.announce_at("Ready", Politeness::Assertive, t0);
    run_for(&announcer, t0, Duration::from_millis(200));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].text, "Ready");
    assert_eq!(seen[0].politeness, Politeness::Assertive);
}

#[test]
fn test_detached_region_drops_message() {
    let (announcer, polite, _) = attached();
    announcer.detach_region(Politeness::Polite);

    let t0 = Instant::now();
    assert!(!announcer.announce_at("Lost", Politeness::Polite, t0));
    assert!(announcer.is_idle());
    run_for(&announcer, t0, Duration::from_millis(200));
    assert!(polite.delivered().is_empty());
}

/// Text that was delivered, then superseded, may be announced again inside the window.
#[test]
fn test_returning_text_after_delivery_is_announced() {
    let (announcer, polite, _) = attached();
    let t0 = Instant::now();

    announcer.announce_at("Sound feedback on", Politeness::Polite, t0);
    let now = run_for(&announcer, t0, Duration::from_millis(150));
    announcer.announce_at("Sound feedback off", Politeness::Polite, now);
    let now = run_for(&announcer, now, Duration::from_millis(150));
    assert!(announcer.announce_at("Sound feedback on", Politeness::Polite, now));
    run_for(&announcer, now, Duration::from_millis(150));

    assert_eq!(
        polite.delivered(),
        vec!["Sound feedback on", "Sound feedback off", "Sound feedback on"]
    );
}

#[test]
fn test_returning_text_replaces_pending() {
    let (announcer, polite, _) = attached();
    let t0 = Instant::now();

    announcer.announce_at("Monochrome on", Politeness::Polite, t0);
    announcer.announce_at("Monochrome off", Politeness::Polite, t0);
    assert!(announcer.announce_at("Monochrome on", Politeness::Polite, t0));
    run_for(&announcer, t0, Duration::from_millis(150));

    assert_eq!(polite.delivered(), vec!["Monochrome on"]);
}
