//! Process-wide entry points for announcements and sound cues.
//!
//! Code outside the engine calls [`announce`] and [`play_sound`] without
//! holding engine handles. Both are no-ops until [`init`] and after
//! [`teardown`]. An owner that called [`init`] removes only its own handles
//! through [`release`], so a later owner's handles survive.

use crate::accessibility::{LiveAnnouncer, Politeness};
use crate::audio::{SoundCategory, SoundFeedbackPlayer};
use crate::lock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

/// Identifies one [`init`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchToken(u64);

#[derive(Clone)]
struct Dispatcher {
    token: DispatchToken,
    announcer: LiveAnnouncer,
    sound: Option<SoundFeedbackPlayer>,
}

static DISPATCH: OnceLock<Mutex<Option<Dispatcher>>> = OnceLock::new();
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

fn slot() -> &'static Mutex<Option<Dispatcher>> {
    DISPATCH.get_or_init(|| Mutex::new(None))
}

fn current() -> Option<Dispatcher> {
    lock(slot()).clone()
}

/// Install the handles used by the global functions, replacing any previous ones.
pub fn init(announcer: LiveAnnouncer, sound: Option<SoundFeedbackPlayer>) -> DispatchToken {
    let token = DispatchToken(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed));
    let previous = lock(slot()).replace(Dispatcher {
        token,
        announcer,
        sound,
    });
    match previous {
        Some(old) => tracing::debug!("Global dispatch re-initialized, replacing {:?}", old.token),
        None => tracing::debug!("Global dispatch initialized"),
    }
    token
}

/// Remove the handles installed under `token`. Returns false if another
/// [`init`] replaced them in the meantime.
pub fn release(token: DispatchToken) -> bool {
    let mut slot = lock(slot());
    if slot.as_ref().is_some_and(|d| d.token == token) {
        *slot = None;
        tracing::debug!("Global dispatch released");
        true
    } else {
        false
    }
}

/// Remove the installed handles, whoever installed them.
pub fn teardown() {
    if lock(slot()).take().is_some() {
        tracing::debug!("Global dispatch torn down");
    }
}

pub fn is_initialized() -> bool {
    lock(slot()).is_some()
}

/// Queue an announcement. Returns false if not initialized or the text was dropped.
pub fn announce(text: &str, politeness: Politeness) -> bool {
    match current() {
        Some(dispatcher) => dispatcher.announcer.announce(text, politeness),
        None => {
            tracing::trace!("announce before init: {}", text);
            false
        }
    }
}

/// Play a cue. Returns false if not initialized, no player is set or the cue did not play.
pub fn play_sound(category: SoundCategory) -> bool {
    current()
        .and_then(|dispatcher| dispatcher.sound)
        .is_some_and(|sound| sound.play(category))
}
