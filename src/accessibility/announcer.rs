//! Screen reader live announcements.
//!
//! Two independent channels, polite and assertive, each backed by one live
//! region. A channel moves IDLE -> QUEUED -> FLUSHING -> IDLE:
//!
//! - `announce` queues text; while queued, newer text replaces the pending one
//! - a tick flushes the queue by clearing the region
//! - after the clear delay the text is written, which is what screen readers
//!   pick up as a new announcement
//!
//! Time is passed in explicitly. The host loop calls [`LiveAnnouncer::tick`]
//! or awaits [`LiveAnnouncer::drive_until_idle`].

use crate::lock;
use crate::observer::{ListenerSet, Subscription};
use crate::storage::config::AnnouncerSettings;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Announcement urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Politeness {
    /// Read when the screen reader is idle
    #[default]
    Polite,
    /// Interrupts current speech
    Assertive,
}

impl Politeness {
    pub const ALL: [Politeness; 2] = [Politeness::Polite, Politeness::Assertive];

    /// Value of the `aria-live` attribute for this channel.
    pub fn as_str(&self) -> &'static str {
        match self {
            Politeness::Polite => "polite",
            Politeness::Assertive => "assertive",
        }
    }
}

impl std::fmt::Display for Politeness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message for assistive technology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub text: String,
    pub politeness: Politeness,
    /// When the message was submitted
    pub timestamp: DateTime<Utc>,
}

/// A live region the announcer writes into.
pub trait LiveRegion: Send {
    fn set_text(&mut self, text: &str);
}

/// Channel lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Idle,
    Queued,
    Flushing,
}

/// Announcer failures. Logged, never returned.
#[derive(Debug, Error)]
pub enum AnnouncerError {
    #[error("No live region attached for {0} announcements")]
    TargetMissing(Politeness),
}

struct InFlight {
    announcement: Announcement,
    write_at: Instant,
}

#[derive(Default)]
struct Channel {
    region: Option<Box<dyn LiveRegion>>,
    pending: Option<Announcement>,
    in_flight: Option<InFlight>,
    last_delivered: Option<(String, Instant)>,
}

impl Channel {
    fn state(&self) -> ChannelState {
        if self.in_flight.is_some() {
            ChannelState::Flushing
        } else if self.pending.is_some() {
            ChannelState::Queued
        } else {
            ChannelState::Idle
        }
    }

    /// The text this channel will read out last: pending, else in flight,
    /// else the last delivery if it is still inside the dedup window.
    fn latest_text(&self, now: Instant, window: Duration) -> Option<&str> {
        if let Some(pending) = &self.pending {
            return Some(pending.text.as_str());
        }
        if let Some(flight) = &self.in_flight {
            return Some(flight.announcement.text.as_str());
        }
        match &self.last_delivered {
            Some((last, at)) if now.saturating_duration_since(*at) < window => Some(last.as_str()),
            _ => None,
        }
    }

    fn is_duplicate(&self, text: &str, now: Instant, window: Duration) -> bool {
        self.latest_text(now, window) == Some(text)
    }

    /// Advance this channel to `now`, pushing delivered announcements into `out`.
    fn advance(&mut self, politeness: Politeness, now: Instant, clear_delay: Duration, out: &mut Vec<Announcement>) {
        loop {
            if let Some(flight) = self.in_flight.take() {
                if now < flight.write_at {
                    self.in_flight = Some(flight);
                    return;
                }
                match self.region.as_mut() {
                    Some(region) => {
                        region.set_text(&flight.announcement.text);
                        tracing::debug!(
                            "Announced ({}): {}",
                            politeness,
                            flight.announcement.text
                        );
                        self.last_delivered = Some((flight.announcement.text.clone(), now));
                        out.push(flight.announcement);
                    }
                    None => {
                        tracing::warn!("{}", AnnouncerError::TargetMissing(politeness));
                    }
                }
            }

            let Some(next) = self.pending.take() else {
                return;
            };
            match self.region.as_mut() {
                Some(region) => {
                    region.set_text("");
                    self.in_flight = Some(InFlight {
                        announcement: next,
                        write_at: now + clear_delay,
                    });
                }
                None => {
                    tracing::warn!(
                        "{}, dropping: {}",
                        AnnouncerError::TargetMissing(politeness),
                        next.text
                    );
                    return;
                }
            }
        }
    }
}

struct AnnouncerState {
    polite: Channel,
    assertive: Channel,
    clear_delay: Duration,
    dedup_window: Duration,
}

impl AnnouncerState {
    fn channel(&self, politeness: Politeness) -> &Channel {
        match politeness {
            Politeness::Polite => &self.polite,
            Politeness::Assertive => &self.assertive,
        }
    }

    fn channel_mut(&mut self, politeness: Politeness) -> &mut Channel {
        match politeness {
            Politeness::Polite => &mut self.polite,
            Politeness::Assertive => &mut self.assertive,
        }
    }
}

/// Shared handle to the announcer. Clones refer to the same channels.
#[derive(Clone)]
pub struct LiveAnnouncer {
    state: Arc<Mutex<AnnouncerState>>,
    listeners: ListenerSet<Announcement>,
}

impl LiveAnnouncer {
    pub fn new(settings: &AnnouncerSettings) -> Self {
        Self {
            state: Arc::new(Mutex::new(AnnouncerState {
                polite: Channel::default(),
                assertive: Channel::default(),
                clear_delay: settings.clear_delay(),
                dedup_window: settings.dedup_window(),
            })),
            listeners: ListenerSet::new(),
        }
    }

    /// Mount a live region for a channel, replacing any previous one.
    pub fn attach_region(&self, politeness: Politeness, region: impl LiveRegion + 'static) {
        lock(&self.state).channel_mut(politeness).region = Some(Box::new(region));
        tracing::debug!("Attached {} live region", politeness);
    }

    /// Unmount a channel's live region.
    pub fn detach_region(&self, politeness: Politeness) {
        lock(&self.state).channel_mut(politeness).region = None;
        tracing::debug!("Detached {} live region", politeness);
    }

    /// Queue text now. See [`LiveAnnouncer::announce_at`].
    pub fn announce(&self, text: &str, politeness: Politeness) -> bool {
        self.announce_at(text, politeness, Instant::now())
    }

    /// Queue text on a channel. Returns false if it was ignored.
    ///
    /// Blank text is ignored, as is text identical to the newest text the
    /// channel already holds (pending, in flight, or delivered inside the
    /// dedup window). A channel without a live region ignores everything.
    pub fn announce_at(&self, text: &str, politeness: Politeness, now: Instant) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        let mut state = lock(&self.state);
        let window = state.dedup_window;
        let channel = state.channel_mut(politeness);

        if channel.region.is_none() {
            tracing::warn!("{}, dropping: {}", AnnouncerError::TargetMissing(politeness), text);
            return false;
        }
        if channel.is_duplicate(text, now, window) {
            tracing::trace!("Dropping duplicate {} announcement: {}", politeness, text);
            return false;
        }

        if let Some(replaced) = channel.pending.replace(Announcement {
            text: text.to_string(),
            politeness,
            timestamp: Utc::now(),
        }) {
            tracing::trace!("Superseded queued announcement: {}", replaced.text);
        }
        true
    }

    /// Advance both channels to `now`. Returns how many announcements were written.
    pub fn tick(&self, now: Instant) -> usize {
        let mut delivered = Vec::new();
        {
            let mut state = lock(&self.state);
            let clear_delay = state.clear_delay;
            for politeness in Politeness::ALL {
                state
                    .channel_mut(politeness)
                    .advance(politeness, now, clear_delay, &mut delivered);
            }
        }

        for announcement in &delivered {
            self.listeners.emit(announcement);
        }
        delivered.len()
    }

    pub fn state(&self, politeness: Politeness) -> ChannelState {
        lock(&self.state).channel(politeness).state()
    }

    /// Whether both channels are idle.
    pub fn is_idle(&self) -> bool {
        let state = lock(&self.state);
        Politeness::ALL
            .iter()
            .all(|p| state.channel(*p).state() == ChannelState::Idle)
    }

    /// Text most recently written to a channel's region.
    pub fn last_delivered(&self, politeness: Politeness) -> Option<String> {
        lock(&self.state)
            .channel(politeness)
            .last_delivered
            .as_ref()
            .map(|(text, _)| text.clone())
    }

    /// Listen for delivered announcements.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Announcement) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    /// Tick on a timer until both channels are idle.
    pub async fn drive_until_idle(&self, interval: Duration) {
        loop {
            self.tick(Instant::now());
            if self.is_idle() {
                return;
            }
            tokio::time::sleep(interval).await;
        }
    }
}
