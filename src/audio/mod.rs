//! Sound feedback module.
//!
//! Short audio cues for accessibility events, played only while the
//! sound-feedback preference is on. Playback goes through the
//! [`AudioBackend`] port so tests can substitute a recording backend.

pub mod player;
pub mod rodio_backend;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub use player::SoundFeedbackPlayer;
pub use rodio_backend::RodioBackend;

/// Errors that can occur during audio operations.
///
/// These are logged by the player and never returned to callers of `play`.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Audio device not available")]
    DeviceNotAvailable,

    #[error("Sound file not found: {0}")]
    SoundNotFound(String),

    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),
}

/// Event category of a sound cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundCategory {
    Success,
    Error,
    Warning,
    Info,
    Toggle,
}

impl SoundCategory {
    pub const ALL: [SoundCategory; 5] = [
        SoundCategory::Success,
        SoundCategory::Error,
        SoundCategory::Warning,
        SoundCategory::Info,
        SoundCategory::Toggle,
    ];

    /// Name used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCategory::Success => "success",
            SoundCategory::Error => "error",
            SoundCategory::Warning => "warning",
            SoundCategory::Info => "info",
            SoundCategory::Toggle => "toggle",
        }
    }

    /// Built-in file name for this category.
    pub fn default_file(&self) -> &'static str {
        match self {
            SoundCategory::Success => "success.mp3",
            SoundCategory::Error => "error.mp3",
            SoundCategory::Warning => "warning.mp3",
            SoundCategory::Info => "info.mp3",
            SoundCategory::Toggle => "toggle.mp3",
        }
    }
}

impl std::fmt::Display for SoundCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SoundCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown sound category: {}", s))
    }
}

/// A loaded sound that can be played again from the start.
pub trait AudioHandle: Send {
    /// Stop any running playback of this sound and start it from zero.
    fn restart(&mut self) -> Result<(), AudioError>;
}

/// Loads sound files into playable handles.
pub trait AudioBackend: Send + Sync {
    fn load(&self, path: &Path) -> Result<Box<dyn AudioHandle>, AudioError>;
}
