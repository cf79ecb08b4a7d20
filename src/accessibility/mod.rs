//! Accessibility output module.
//!
//! This module provides:
//! - Document-root markers that mirror the live preferences
//! - Screen reader live announcements with politeness channels

pub mod announcer;
pub mod dom;

// Re-export primary types
pub use announcer::{
    Announcement, AnnouncerError, ChannelState, LiveAnnouncer, LiveRegion, Politeness,
};
pub use dom::{ClassList, DocumentRoot, DomEffectApplier, Reconciliation, COLOR_SCHEME_ATTRIBUTE};
