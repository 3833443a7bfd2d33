//! Centralized application state for the Quill client.
//!
//! Composes the library stores with the UI-only state (the settings form
//! draft, the sign-in field, visible toasts). Stores are constructed here
//! and passed around explicitly; nothing is global.

use anyhow::{Context, Result};
use rquill::storage::{self, SharedStorage};
use rquill::{
    AuthProvider, ClientConfig, FileStorage, HttpSettingsClient, LocalSettingsAdapter,
    MemoryStorage, Notification, NotificationQueue, PartialUserSettings, SessionAuth,
    SettingsStore, SettingsSynchronizer, ThemeManager, ThemeStore, UserSettings,
};
use std::path::PathBuf;
use std::sync::Arc;

/// A notification currently on screen.
pub struct Toast {
    pub notification: Notification,
    /// `egui` input time at which the toast was first shown
    pub shown_at: f64,
}

/// Main application state.
pub struct AppState {
    /// Sign-in state shared with the stores and the HTTP client
    pub auth: Arc<SessionAuth>,

    /// User settings owner
    pub settings: SettingsStore,

    /// Theme selection owner
    pub theme: ThemeStore,

    /// Palettes used to build the window visuals
    pub theme_manager: ThemeManager,

    /// Notifications raised by the stores, not yet turned into toasts
    pub notifications: Arc<NotificationQueue>,

    /// Toasts currently displayed
    pub toasts: Vec<Toast>,

    /// Settings form buffer; saved through `SettingsStore::update_settings`
    pub draft: UserSettings,

    /// Last store value the draft was refreshed from
    pub last_seen: UserSettings,

    /// Text buffer of the access token field
    pub token_input: String,

    /// OS theme reported by the windowing backend
    pub system_theme: Option<egui::Theme>,

    /// File behind the durable local storage
    pub storage_path: PathBuf,

    /// Backend URL, shown in the status bar
    pub api_base_url: String,
}

impl AppState {
    /// Wires storages, collaborators and stores from `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let file_storage = FileStorage::in_dir(&config.storage_dir);
        let storage_path = file_storage.path().to_path_buf();
        let local: SharedStorage = storage::shared(file_storage);
        let session: SharedStorage = storage::shared(MemoryStorage::new());

        let auth = Arc::new(SessionAuth::with_token(config.access_token.clone()));
        let remote = HttpSettingsClient::new(config, auth.clone())
            .context("Failed to build the settings API client")?;
        let notifications = Arc::new(NotificationQueue::new());

        let synchronizer = SettingsSynchronizer::new(
            LocalSettingsAdapter::new(local.clone()),
            Arc::new(remote),
            auth.clone(),
        );

        Ok(Self {
            settings: SettingsStore::new(synchronizer, notifications.clone()),
            theme: ThemeStore::new(local, session, auth.clone()),
            theme_manager: ThemeManager::new(),
            notifications,
            toasts: Vec::new(),
            draft: UserSettings::default(),
            last_seen: UserSettings::default(),
            token_input: String::new(),
            system_theme: None,
            storage_path,
            api_base_url: config.api_base_url.clone(),
            auth,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    /// True if the form holds edits that are not in the store yet.
    pub fn has_unsaved_changes(&self) -> bool {
        &self.draft != self.settings.settings()
    }

    /// Follows store changes in the form. Fields the user edited since the
    /// last refresh keep their edited value.
    pub fn refresh_draft(&mut self) {
        let current = self.settings.settings();
        if current != &self.last_seen {
            self.draft = current.merged(self.pending_edits());
            self.last_seen = current.clone();
        }
    }

    /// Form edits relative to the store value the draft was built from.
    pub fn pending_edits(&self) -> PartialUserSettings {
        self.last_seen.diff(&self.draft)
    }

    /// Discards form edits.
    pub fn revert_draft(&mut self) {
        self.draft = self.settings.settings().clone();
        self.last_seen = self.draft.clone();
    }
}
