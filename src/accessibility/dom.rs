//! Document-root effects of the live preferences.
//!
//! Every flag maps to a class marker on the document root. A reconciliation
//! pass rewrites all markers from the current preference set, so the root
//! always mirrors the set exactly.

use crate::lock;
use crate::observer::{ListenerSet, Subscription};
use crate::preferences::{ColorBlindMode, ColorScheme, OsPreferences, PreferenceFlag, PreferenceSet};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

/// Attribute carrying the OS color scheme.
pub const COLOR_SCHEME_ATTRIBUTE: &str = "data-color-scheme";

/// The document root the markers are applied to.
pub trait DocumentRoot: Send {
    fn add_class(&mut self, class: &str);
    fn remove_class(&mut self, class: &str);
    fn has_class(&self, class: &str) -> bool;
    fn get_attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&mut self, name: &str, value: &str);
    fn remove_attribute(&mut self, name: &str);
}

/// In-memory document root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
}

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Space-separated `class` attribute value.
    pub fn class_attribute(&self) -> String {
        self.classes().collect::<Vec<_>>().join(" ")
    }
}

impl DocumentRoot for ClassList {
    fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }
}

/// Report of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Sequence number of the pass, starting at 1
    pub pass: u64,
    /// Markers present after the pass
    pub markers: Vec<&'static str>,
    pub color_scheme: ColorScheme,
}

struct ApplierState {
    root: Box<dyn DocumentRoot>,
    prefs: PreferenceSet,
    os: OsPreferences,
    passes: u64,
}

impl ApplierState {
    fn run_pass(&mut self) -> Reconciliation {
        let mut markers = Vec::new();

        for flag in PreferenceFlag::ALL {
            let Some(class) = flag.marker_class() else {
                continue;
            };
            // Reduced motion is a floor: the OS request alone turns the marker on.
            let on = self.prefs.is_enabled(flag)
                || (flag == PreferenceFlag::ReducedMotion && self.os.reduced_motion);
            if on {
                self.root.add_class(class);
                markers.push(class);
            } else {
                self.root.remove_class(class);
            }
        }

        for class in ColorBlindMode::all_marker_classes() {
            self.root.remove_class(class);
        }
        if let Some(class) = self.prefs.color_blind_mode.marker_class() {
            self.root.add_class(class);
            markers.push(class);
        }

        match self.os.color_scheme {
            ColorScheme::NoPreference => self.root.remove_attribute(COLOR_SCHEME_ATTRIBUTE),
            scheme => self
                .root
                .set_attribute(COLOR_SCHEME_ATTRIBUTE, scheme.as_str()),
        }

        self.passes += 1;
        Reconciliation {
            pass: self.passes,
            markers,
            color_scheme: self.os.color_scheme,
        }
    }
}

/// Applies preference markers to a document root.
///
/// Holds no preference state of its own beyond the last set it was given;
/// the engine feeds it every store notification.
#[derive(Clone)]
pub struct DomEffectApplier {
    state: Arc<Mutex<ApplierState>>,
    listeners: ListenerSet<Reconciliation>,
}

impl DomEffectApplier {
    /// Wrap a root and bring it in line with `prefs` immediately.
    pub fn new(root: impl DocumentRoot + 'static, prefs: PreferenceSet, os: OsPreferences) -> Self {
        let mut state = ApplierState {
            root: Box::new(root),
            prefs,
            os,
            passes: 0,
        };
        let initial = state.run_pass();
        tracing::debug!("Initial markers: {:?}", initial.markers);

        Self {
            state: Arc::new(Mutex::new(state)),
            listeners: ListenerSet::new(),
        }
    }

    /// Run one pass for a new preference set.
    pub fn reconcile(&self, prefs: PreferenceSet) -> Reconciliation {
        let report = {
            let mut state = lock(&self.state);
            state.prefs = prefs;
            state.run_pass()
        };
        tracing::debug!("Reconciliation {} applied {:?}", report.pass, report.markers);
        self.listeners.emit(&report);
        report
    }

    /// Run one pass for new OS preferences.
    pub fn set_os(&self, os: OsPreferences) -> Reconciliation {
        let report = {
            let mut state = lock(&self.state);
            state.os = os;
            state.run_pass()
        };
        self.listeners.emit(&report);
        report
    }

    /// Number of passes run so far, including the initial one.
    pub fn passes(&self) -> u64 {
        lock(&self.state).passes
    }

    /// Listen for reconciliation reports.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Reconciliation) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    /// Read the document root.
    pub fn inspect<R>(&self, f: impl FnOnce(&dyn DocumentRoot) -> R) -> R {
        let state = lock(&self.state);
        f(state.root.as_ref())
    }
}
