//! The accessibility engine: every component wired together.

use crate::accessibility::{DocumentRoot, DomEffectApplier, LiveAnnouncer, Politeness};
use crate::audio::{AudioBackend, SoundCategory, SoundFeedbackPlayer};
use crate::dispatch::{self, DispatchToken};
use crate::input::KeyboardShortcutRouter;
use crate::observer::Subscription;
use crate::preferences::{
    OsPreferenceWatcher, OsPreferences, PreferenceError, PreferenceFlag, PreferenceStore,
    PreferenceValue,
};
use crate::profiles::{ProfileActivator, ProfileRepository};
use crate::storage::{AppConfig, SharedStore};
use std::sync::Arc;
use std::time::Duration;

/// Owns the components and the subscriptions between them.
///
/// Store changes drive the document root; OS changes update the defaults and
/// the document root. Dropping the engine (or calling
/// [`AccessibilityEngine::shutdown`]) removes those links and the global
/// dispatch handles.
pub struct AccessibilityEngine {
    os: OsPreferenceWatcher,
    store: PreferenceStore,
    repository: ProfileRepository,
    applier: DomEffectApplier,
    announcer: LiveAnnouncer,
    sound: Option<SoundFeedbackPlayer>,
    activator: ProfileActivator,
    router: KeyboardShortcutRouter,
    tick_interval: Duration,
    subscriptions: Vec<Subscription>,
    dispatch_token: Option<DispatchToken>,
}

impl AccessibilityEngine {
    /// Build the engine.
    ///
    /// Without an audio backend no cues are played.
    pub fn new(
        config: &AppConfig,
        storage: SharedStore,
        os: OsPreferences,
        root: impl DocumentRoot + 'static,
        audio: Option<Arc<dyn AudioBackend>>,
    ) -> Self {
        let os_watcher = OsPreferenceWatcher::new(os);
        let store = PreferenceStore::load(Arc::clone(&storage), &os);
        let repository = ProfileRepository::open(storage, config.profiles.max_backups);
        let applier = DomEffectApplier::new(root, store.get_all(), os);
        let announcer = LiveAnnouncer::new(&config.announcer);
        let sound = audio.map(|backend| {
            SoundFeedbackPlayer::new(
                store.clone(),
                backend,
                config.sound_dir(),
                config.sound.clone(),
            )
        });
        let activator = ProfileActivator::new(
            store.clone(),
            repository.clone(),
            announcer.clone(),
            sound.clone(),
        );
        let router = KeyboardShortcutRouter::new(store.clone(), announcer.clone(), sound.clone());

        let mut subscriptions = Vec::new();

        let on_change = applier.clone();
        subscriptions.push(store.subscribe(move |change| {
            on_change.reconcile(change.snapshot);
        }));

        let on_os = applier.clone();
        let defaults = store.clone();
        subscriptions.push(os_watcher.subscribe(move |os| {
            defaults.update_defaults(os);
            on_os.set_os(*os);
        }));

        tracing::info!(
            "Accessibility engine ready (durable storage: {}, sound: {})",
            store.is_durable(),
            sound.is_some()
        );

        Self {
            os: os_watcher,
            store,
            repository,
            applier,
            announcer,
            sound,
            activator,
            router,
            tick_interval: config.announcer.tick_interval(),
            subscriptions,
            dispatch_token: None,
        }
    }

    pub fn store(&self) -> &PreferenceStore {
        &self.store
    }

    pub fn repository(&self) -> &ProfileRepository {
        &self.repository
    }

    pub fn activator(&self) -> &ProfileActivator {
        &self.activator
    }

    pub fn router(&self) -> &KeyboardShortcutRouter {
        &self.router
    }

    pub fn announcer(&self) -> &LiveAnnouncer {
        &self.announcer
    }

    pub fn applier(&self) -> &DomEffectApplier {
        &self.applier
    }

    pub fn os_watcher(&self) -> &OsPreferenceWatcher {
        &self.os
    }

    pub fn sound(&self) -> Option<&SoundFeedbackPlayer> {
        self.sound.as_ref()
    }

    /// Set a flag from a UI control, announcing the change.
    pub fn set_preference(
        &self,
        flag: PreferenceFlag,
        value: PreferenceValue,
    ) -> Result<(), PreferenceError> {
        let before = self.store.get(flag);
        let result = self.store.set(flag, value);
        self.narrate(flag, before);
        result
    }

    /// Toggle a flag from a UI control, announcing the change.
    pub fn toggle_preference(&self, flag: PreferenceFlag) -> Result<PreferenceValue, PreferenceError> {
        let before = self.store.get(flag);
        let result = self.store.toggle(flag);
        self.narrate(flag, before);
        result
    }

    fn narrate(&self, flag: PreferenceFlag, before: PreferenceValue) {
        let after = self.store.get(flag);
        if after == before {
            return;
        }
        self.announcer.announce(&flag.describe(after), Politeness::Polite);
        if let Some(sound) = &self.sound {
            sound.play(SoundCategory::Toggle);
        }
    }

    /// Expose this engine's announcer and player through [`crate::dispatch`].
    ///
    /// Shutdown removes them again unless another engine installed its own since.
    pub fn install_global_dispatch(&mut self) {
        self.dispatch_token = Some(dispatch::init(self.announcer.clone(), self.sound.clone()));
    }

    /// Deliver every queued announcement, sleeping between ticks.
    pub async fn flush_announcements(&self) {
        self.announcer.drive_until_idle(self.tick_interval).await;
    }

    /// Unlink the components. Idempotent.
    pub fn shutdown(&mut self) {
        if self.subscriptions.is_empty() && self.dispatch_token.is_none() {
            return;
        }
        self.subscriptions.clear();
        self.router.detach();
        if let Some(token) = self.dispatch_token.take() {
            dispatch::release(token);
        }
        tracing::info!("Accessibility engine shut down");
    }
}

impl Drop for AccessibilityEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
