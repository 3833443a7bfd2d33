//! In-memory owner of the user settings.
//!
//! Updates are applied to memory immediately and handed to the write queue
//! for persistence; `poll()` folds the completions back in. Failures never
//! reach the caller: explicit saves end with a success or failure
//! notification, background work only logs.

use crate::auth::AuthProvider;
use crate::io::{Completion, SaveOrigin, Sequence, WriteIntent, WriteQueue};
use crate::notify::{NotificationKind, Notifier};
use crate::settings::{AccountTheme, PartialUserSettings, UserSettings};
use crate::sync::SettingsSynchronizer;
use std::sync::Arc;
use std::time::Duration;

/// Lifecycle of the store. Saving is tracked separately by `is_saving`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Uninitialized,
    Loading,
    Ready,
}

pub struct SettingsStore {
    settings: UserSettings,
    status: StoreStatus,
    synchronizer: SettingsSynchronizer,
    notifier: Arc<dyn Notifier>,
    queue: WriteQueue,
    /// Sync started by `load()`; the store is `Loading` until it completes
    initial_sync: Option<Sequence>,
    /// Save intents submitted but not yet completed
    pending_saves: usize,
    /// Account theme picked up from an edit or a server copy, not yet
    /// handed to the theme store
    account_theme_change: Option<AccountTheme>,
}

impl SettingsStore {
    pub fn new(synchronizer: SettingsSynchronizer, notifier: Arc<dyn Notifier>) -> Self {
        let queue = WriteQueue::spawn(synchronizer.clone());
        Self {
            settings: UserSettings::default(),
            status: StoreStatus::Uninitialized,
            synchronizer,
            notifier,
            queue,
            initial_sync: None,
            pending_saves: 0,
            account_theme_change: None,
        }
    }

    // ===== Queries =====

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn status(&self) -> StoreStatus {
        self.status
    }

    /// True only during the initial load.
    pub fn is_loading(&self) -> bool {
        self.status == StoreStatus::Loading
    }

    /// True while any write is in flight.
    pub fn is_saving(&self) -> bool {
        self.pending_saves > 0
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth().is_authenticated()
    }

    fn auth(&self) -> &Arc<dyn AuthProvider> {
        self.synchronizer.auth()
    }

    // ===== Operations =====

    /// Loads the local copy right away, then reconciles with the server in
    /// the background when signed in.
    pub fn load(&mut self) {
        self.status = StoreStatus::Loading;
        self.settings = self.synchronizer.local().load();

        if self.is_authenticated() {
            self.initial_sync = Some(self.queue.submit(WriteIntent::Sync));
        } else {
            self.initial_sync = None;
            self.status = StoreStatus::Ready;
        }
    }

    /// Merges `partial` into the current settings and persists the result.
    pub fn update_settings(&mut self, partial: PartialUserSettings) {
        if let Some(theme) = partial.account.as_ref().and_then(|a| a.theme) {
            self.account_theme_change = Some(theme);
        }
        self.save(self.settings.merged(partial), SaveOrigin::Update);
    }

    /// Same as `update_settings`, without a notification. Used for changes
    /// the user did not make on the settings page.
    pub fn update_settings_in_background(&mut self, partial: PartialUserSettings) {
        if partial.is_empty() {
            return;
        }
        let next = self.settings.merged(partial);
        if next != self.settings {
            self.save(next, SaveOrigin::Background);
        }
    }

    /// Restores and persists the defaults.
    pub fn reset_settings(&mut self) {
        let defaults = UserSettings::default();
        if defaults.account.theme != self.settings.account.theme {
            self.account_theme_change = Some(defaults.account.theme);
        }
        self.save(defaults, SaveOrigin::Reset);
    }

    /// Re-fetches the server copy. No-op when signed out.
    pub fn sync_settings_with_server(&mut self) {
        if !self.is_authenticated() {
            log::debug!("Skipping settings sync, not signed in");
            return;
        }
        self.queue.submit(WriteIntent::Sync);
    }

    /// Applies finished background work. Returns true if the settings or
    /// the status changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Some(completion) = self.queue.try_completion() {
            changed |= self.apply_completion(completion);
        }
        changed
    }

    /// Blocks until all queued work is done, then applies it.
    pub fn wait_idle(&mut self) -> bool {
        self.queue.wait_idle();
        self.poll()
    }

    /// Waits at most `timeout` for queued work, then applies what finished.
    /// Returns false if work was still pending when the time ran out.
    pub fn wait_idle_for(&mut self, timeout: Duration) -> bool {
        let drained = self.queue.wait_idle_for(timeout);
        self.poll();
        drained
    }

    /// Theme picked up from the account group since the last call.
    pub fn take_account_theme_change(&mut self) -> Option<AccountTheme> {
        self.account_theme_change.take()
    }

    pub fn set_repaint_context(&self, ctx: &egui::Context) {
        self.queue.set_repaint_context(ctx);
    }

    fn save(&mut self, settings: UserSettings, origin: SaveOrigin) {
        self.settings = settings.clone();
        self.pending_saves += 1;
        self.queue.submit(WriteIntent::Save { settings, origin });
    }

    /// Only the completion of the most recently issued intent may replace
    /// the in-memory settings; older ones were superseded by later edits.
    fn is_latest(&self, seq: Sequence) -> bool {
        seq == self.queue.last_seq()
    }

    fn apply_completion(&mut self, completion: Completion) -> bool {
        let seq = completion.seq();
        let latest = self.is_latest(seq);
        let mut changed = false;

        match completion {
            Completion::Synced {
                settings,
                from_remote,
                ..
            } => {
                // The local fallback is what memory was loaded from already.
                if latest && from_remote && settings != self.settings {
                    if settings.account.theme != self.settings.account.theme {
                        self.account_theme_change = Some(settings.account.theme);
                    }
                    self.settings = settings;
                    changed = true;
                }
                if self.initial_sync == Some(seq) {
                    self.initial_sync = None;
                    self.status = StoreStatus::Ready;
                    changed = true;
                }
            }
            Completion::Saved {
                origin,
                settings,
                local_persisted,
                ..
            } => {
                self.pending_saves = self.pending_saves.saturating_sub(1);
                if latest && settings != self.settings {
                    self.settings = settings;
                }
                changed = true;

                if origin.is_explicit() {
                    self.notify_saved(origin, local_persisted);
                }
            }
        }
        changed
    }

    fn notify_saved(&self, origin: SaveOrigin, local_persisted: bool) {
        if !local_persisted {
            self.notifier.show_notification(
                NotificationKind::Error,
                "Settings could not be saved. Changes are kept for this session only.",
            );
            return;
        }
        let message = match origin {
            SaveOrigin::Reset => "Settings reset to defaults",
            _ => "Settings saved",
        };
        self.notifier.show_notification(NotificationKind::Success, message);
    }
}
