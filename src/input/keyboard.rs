//! Keyboard shortcuts for the accessibility flags.
//!
//! Every shortcut is Alt+Shift plus a key. Shortcuts are ignored while focus
//! is in a text-entry element, except the help shortcut.

use crate::accessibility::{LiveAnnouncer, Politeness};
use crate::audio::{SoundCategory, SoundFeedbackPlayer};
use crate::preferences::{ColorBlindMode, PreferenceFlag, PreferenceStore, PreferenceValue};
use bitflags::bitflags;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

bitflags! {
    /// Held modifier keys.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const CTRL  = 0b0001;
        const ALT   = 0b0010;
        const SHIFT = 0b0100;
        const META  = 0b1000;
    }
}

/// A key, independent of modifiers. Letters are stored uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    F(u8),
    Escape,
    Enter,
    Tab,
    Space,
}

impl Key {
    fn name(&self) -> String {
        match self {
            Key::Char(c) => c.to_string(),
            Key::F(n) => format!("F{}", n),
            Key::Escape => "Esc".to_string(),
            Key::Enter => "Enter".to_string(),
            Key::Tab => "Tab".to_string(),
            Key::Space => "Space".to_string(),
        }
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "esc" | "escape" => return Ok(Key::Escape),
            "enter" | "return" => return Ok(Key::Enter),
            "tab" => return Ok(Key::Tab),
            "space" => return Ok(Key::Space),
            _ => {}
        }

        if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            if (1..=12).contains(&n) {
                return Ok(Key::F(n));
            }
        }

        let mut chars = lower.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_whitespace() => Ok(Key::Char(c.to_ascii_uppercase())),
            _ => Err(format!("unknown key: {}", s)),
        }
    }
}

/// A key plus the exact set of modifiers held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        let key = match key {
            Key::Char(c) => Key::Char(c.to_ascii_uppercase()),
            other => other,
        };
        Self { key, modifiers }
    }

    /// Alt+Shift+`c`.
    pub fn alt_shift(c: char) -> Self {
        Self::new(Key::Char(c), Modifiers::ALT | Modifiers::SHIFT)
    }

    /// Check if this combo matches the given input.
    pub fn matches(&self, key: Key, modifiers: Modifiers) -> bool {
        *self == Self::new(key, modifiers)
    }
}

impl std::fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();

        if self.modifiers.contains(Modifiers::CTRL) {
            parts.push("Ctrl".to_string());
        }
        if self.modifiers.contains(Modifiers::ALT) {
            parts.push("Alt".to_string());
        }
        if self.modifiers.contains(Modifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.modifiers.contains(Modifiers::META) {
            parts.push("Meta".to_string());
        }

        parts.push(self.key.name());

        write!(f, "{}", parts.join("+"))
    }
}

impl FromStr for KeyCombo {
    type Err = String;

    /// Parses combos such as `alt+shift+c` or `Ctrl+F1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let Some((key, mods)) = parts.split_last() else {
            return Err(format!("empty key combo: {}", s));
        };

        let mut modifiers = Modifiers::empty();
        for m in mods {
            modifiers |= match m.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => Modifiers::CTRL,
                "alt" | "option" => Modifiers::ALT,
                "shift" => Modifiers::SHIFT,
                "meta" | "cmd" | "super" => Modifiers::META,
                other => return Err(format!("unknown modifier: {}", other)),
            };
        }

        Ok(Self::new(key.parse()?, modifiers))
    }
}

/// Kind of element holding keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    #[default]
    None,
    Button,
    TextInput,
    TextArea,
    ContentEditable,
    Select,
}

impl FocusTarget {
    /// Whether typing in this element produces text.
    pub fn is_text_entry(&self) -> bool {
        matches!(
            self,
            FocusTarget::TextInput | FocusTarget::TextArea | FocusTarget::ContentEditable
        )
    }
}

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Flip a flag (advance the mode for the color-blind flag)
    Toggle(PreferenceFlag),
    /// Set a flag to a fixed value
    Set(PreferenceFlag, PreferenceValue),
    /// Show the shortcut help
    ShowHelp,
}

/// A shortcut definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutBinding {
    pub combo: KeyCombo,
    pub action: ShortcutAction,
    pub description: &'static str,
}

/// The built-in shortcut table.
pub fn default_bindings() -> Vec<ShortcutBinding> {
    let toggles = [
        ('C', PreferenceFlag::HighContrast, "Toggle high contrast"),
        ('T', PreferenceFlag::LargeText, "Toggle large text"),
        ('M', PreferenceFlag::ReducedMotion, "Toggle reduced motion"),
        ('F', PreferenceFlag::FocusMode, "Toggle focus mode"),
        ('D', PreferenceFlag::DyslexicFont, "Toggle dyslexia-friendly font"),
        ('R', PreferenceFlag::ReadingGuide, "Toggle reading guide"),
        ('S', PreferenceFlag::SoundFeedback, "Toggle sound feedback"),
        ('B', PreferenceFlag::ColorBlindMode, "Cycle color blind mode"),
        ('K', PreferenceFlag::CustomCursor, "Toggle large cursor"),
        ('I', PreferenceFlag::InvertColors, "Toggle inverted colors"),
        ('G', PreferenceFlag::Monochrome, "Toggle monochrome"),
        ('P', PreferenceFlag::TextSpacing, "Toggle text spacing"),
        ('U', PreferenceFlag::UnderlineLinks, "Toggle underlined links"),
    ];

    let mut bindings: Vec<ShortcutBinding> = toggles
        .into_iter()
        .map(|(key, flag, description)| ShortcutBinding {
            combo: KeyCombo::alt_shift(key),
            action: ShortcutAction::Toggle(flag),
            description,
        })
        .collect();

    bindings.push(ShortcutBinding {
        combo: KeyCombo::alt_shift('0'),
        action: ShortcutAction::Set(
            PreferenceFlag::ColorBlindMode,
            PreferenceValue::ColorBlind(ColorBlindMode::None),
        ),
        description: "Turn off color blind mode",
    });
    bindings.push(ShortcutBinding {
        combo: KeyCombo::alt_shift('/'),
        action: ShortcutAction::ShowHelp,
        description: "Show keyboard shortcuts",
    });

    bindings
}

/// Result of routing one key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutOutcome {
    /// Not a shortcut, or the router is detached
    Ignored,
    /// A shortcut, but focus is in a text-entry element
    Suppressed,
    /// A flag changed
    Applied {
        flag: PreferenceFlag,
        value: PreferenceValue,
    },
    /// The host should show the shortcut help
    ShowHelp,
}

/// Routes key presses to preference changes.
#[derive(Clone)]
pub struct KeyboardShortcutRouter {
    store: PreferenceStore,
    announcer: LiveAnnouncer,
    sound: Option<SoundFeedbackPlayer>,
    bindings: Arc<Vec<ShortcutBinding>>,
    attached: Arc<AtomicBool>,
}

impl KeyboardShortcutRouter {
    /// Create an attached router with the default table.
    pub fn new(
        store: PreferenceStore,
        announcer: LiveAnnouncer,
        sound: Option<SoundFeedbackPlayer>,
    ) -> Self {
        Self {
            store,
            announcer,
            sound,
            bindings: Arc::new(default_bindings()),
            attached: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Resume handling keys.
    pub fn attach(&self) {
        self.attached.store(true, Ordering::SeqCst);
    }

    /// Stop handling keys.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Shortcut table for the help overlay.
    pub fn shortcuts(&self) -> &[ShortcutBinding] {
        &self.bindings
    }

    /// Handle a key press.
    pub fn handle_key(&self, combo: KeyCombo, focus: FocusTarget) -> ShortcutOutcome {
        if !self.is_attached() {
            return ShortcutOutcome::Ignored;
        }

        let Some(binding) = self
            .bindings
            .iter()
            .find(|b| b.combo.matches(combo.key, combo.modifiers))
        else {
            return ShortcutOutcome::Ignored;
        };

        if focus.is_text_entry() && binding.action != ShortcutAction::ShowHelp {
            tracing::trace!("Shortcut {} suppressed in {:?}", combo, focus);
            return ShortcutOutcome::Suppressed;
        }

        let (flag, result) = match binding.action {
            ShortcutAction::ShowHelp => {
                self.announcer
                    .announce("Keyboard shortcuts help opened", Politeness::Polite);
                return ShortcutOutcome::ShowHelp;
            }
            ShortcutAction::Toggle(flag) => (flag, self.store.toggle(flag).map(|_| ())),
            ShortcutAction::Set(flag, value) => (flag, self.store.set(flag, value)),
        };

        if let Err(e) = result {
            tracing::warn!("Shortcut {} not saved: {}", combo, e);
        }

        let value = self.store.get(flag);
        tracing::debug!("Shortcut {} set {} to {}", combo, flag, value);
        self.announcer.announce(&flag.describe(value), Politeness::Polite);
        if let Some(sound) = &self.sound {
            sound.play(SoundCategory::Toggle);
        }

        ShortcutOutcome::Applied { flag, value }
    }
}
