//! Theme selection state and its persistence.
//!
//! `ThemeStore` is the single owner of the theme selection. The `theme`
//! field of the account settings is only a projection of it
//! (`account_theme`), and `reconcile_with_account` brings the two back in
//! line when the server copy of the settings disagrees.
//!
//! Each change is written to the durable storage under `theme`,
//! `themeColor` and `useSystemTheme`, and mirrored into the session storage
//! while a user is signed in.

use crate::auth::AuthProvider;
use crate::error::Result;
use crate::settings::{AccountTheme, PartialUserSettings};
use crate::storage::{lock, KeyValueStorage, SharedStorage};
use crate::theme::{AccentColor, ThemeName};
use std::sync::Arc;

pub const THEME_KEY: &str = "theme";
pub const THEME_COLOR_KEY: &str = "themeColor";
pub const USE_SYSTEM_THEME_KEY: &str = "useSystemTheme";

const THEME_KEYS: [&str; 3] = [THEME_KEY, THEME_COLOR_KEY, USE_SYSTEM_THEME_KEY];

/// The visual appearance selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThemePreference {
    pub theme: ThemeName,
    pub theme_color: AccentColor,
    /// When set, `theme` was resolved from the OS preference at the moment
    /// the flag was turned on.
    pub use_system_theme: bool,
}

/// Owns the theme selection and its storage side effects.
pub struct ThemeStore {
    preference: ThemePreference,
    local: SharedStorage,
    session: SharedStorage,
    auth: Arc<dyn AuthProvider>,
    initialized: bool,
    remote_save_requested: bool,
}

impl std::fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeStore")
            .field("preference", &self.preference)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

impl ThemeStore {
    /// Creates an uninitialized store holding the default theme.
    pub fn new(local: SharedStorage, session: SharedStorage, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            preference: ThemePreference::default(),
            local,
            session,
            auth,
            initialized: false,
            remote_save_requested: false,
        }
    }

    /// Restores the stored selection.
    ///
    /// Each key is read from the session storage for signed-in users, then
    /// from the durable storage. A missing theme falls back to the OS
    /// preference, then to dark.
    pub fn initialize(&mut self, system: Option<egui::Theme>) {
        let theme = self.read_key(THEME_KEY).and_then(|v| v.parse::<ThemeName>().ok());
        let theme_color = self
            .read_key(THEME_COLOR_KEY)
            .and_then(|v| v.parse::<AccentColor>().ok())
            .unwrap_or_default();
        let use_system_theme = self.read_key(USE_SYSTEM_THEME_KEY).as_deref() == Some("true");

        let theme = match (use_system_theme, system) {
            (true, Some(system)) => ThemeName::from(system),
            _ => theme
                .or_else(|| system.map(ThemeName::from))
                .unwrap_or_default(),
        };

        self.preference = ThemePreference {
            theme,
            theme_color,
            use_system_theme,
        };
        self.initialized = true;
        log::debug!("Theme initialized: {:?}", self.preference);
    }

    // ===== Theme Queries =====

    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    pub fn theme(&self) -> ThemeName {
        self.preference.theme
    }

    pub fn theme_color(&self) -> AccentColor {
        self.preference.theme_color
    }

    pub fn use_system_theme(&self) -> bool {
        self.preference.use_system_theme
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The theme as recorded in the account settings group.
    ///
    /// While the system-theme gate is on this is `AccountTheme::System`, so
    /// the account keeps following the OS instead of freezing the theme
    /// resolved at activation. Sepia has no account counterpart and projects
    /// to light.
    pub fn account_theme(&self) -> AccountTheme {
        if self.preference.use_system_theme {
            return AccountTheme::System;
        }
        match self.preference.theme {
            ThemeName::Light | ThemeName::Sepia => AccountTheme::Light,
            ThemeName::Dark => AccountTheme::Dark,
        }
    }

    // ===== Theme Mutations =====

    /// Selects `theme` directly. Clears the system-theme gate.
    pub fn set_theme(&mut self, theme: ThemeName) {
        self.preference.theme = theme;
        self.preference.use_system_theme = false;
        self.persist();
        self.request_remote_save();
    }

    /// Advances along light, dark, sepia and returns the new theme.
    pub fn toggle_theme(&mut self) -> ThemeName {
        let next = self.preference.theme.next();
        self.set_theme(next);
        next
    }

    pub fn set_theme_color(&mut self, color: AccentColor) {
        self.preference.theme_color = color;
        self.persist();
        self.request_remote_save();
    }

    /// Turns the system-theme gate on or off.
    ///
    /// Turning it on resolves the OS preference once, now; later OS changes
    /// are not followed. Without a known OS preference the theme is kept.
    pub fn set_use_system_theme(&mut self, enabled: bool, system: Option<egui::Theme>) {
        self.preference.use_system_theme = enabled;
        if enabled {
            if let Some(system) = system {
                self.preference.theme = ThemeName::from(system);
            }
        }
        self.persist();
        self.request_remote_save();
    }

    /// Adopts the account's theme when it disagrees with the current
    /// projection. Returns true if anything changed.
    ///
    /// No remote save is requested, the value came from the account.
    pub fn reconcile_with_account(
        &mut self,
        account: AccountTheme,
        system: Option<egui::Theme>,
    ) -> bool {
        if self.account_theme() == account {
            return false;
        }
        match account {
            AccountTheme::System => {
                self.preference.use_system_theme = true;
                if let Some(system) = system {
                    self.preference.theme = ThemeName::from(system);
                }
            }
            AccountTheme::Light => {
                self.preference.use_system_theme = false;
                self.preference.theme = ThemeName::Light;
            }
            AccountTheme::Dark => {
                self.preference.use_system_theme = false;
                self.preference.theme = ThemeName::Dark;
            }
        }
        self.persist();
        true
    }

    /// Returns the account update to push after a user change, once.
    pub fn take_remote_save_request(&mut self) -> Option<PartialUserSettings> {
        if std::mem::take(&mut self.remote_save_requested) {
            Some(PartialUserSettings::account_theme(self.account_theme()))
        } else {
            None
        }
    }

    /// Mirrors the current selection into the session storage, e.g. right
    /// after signing in.
    pub fn mirror_to_session(&self) {
        if self.auth.is_authenticated() {
            self.write_keys(&self.session, "session");
        }
    }

    /// Drops the session copy of the theme keys, e.g. on sign-out.
    pub fn clear_session(&self) {
        let mut session = lock(&self.session);
        for key in THEME_KEYS {
            if let Err(e) = session.remove(key) {
                log::warn!("Could not clear session key {key:?}: {e}");
            }
        }
    }

    fn request_remote_save(&mut self) {
        // Changes made before initialization are restored values, not edits.
        if self.initialized {
            self.remote_save_requested = true;
        }
    }

    fn read_key(&self, key: &str) -> Option<String> {
        let from_session = if self.auth.is_authenticated() {
            lock(&self.session).get_string(key)
        } else {
            None
        };
        from_session.or_else(|| lock(&self.local).get_string(key))
    }

    fn persist(&self) {
        self.write_keys(&self.local, "local");
        self.mirror_to_session();
    }

    fn write_keys(&self, storage: &SharedStorage, label: &str) {
        let mut storage = lock(storage);
        if let Err(e) = write_preference(&mut *storage, self.preference) {
            log::warn!("Could not persist theme to {label} storage: {e}");
        }
    }
}

fn write_preference(storage: &mut dyn KeyValueStorage, preference: ThemePreference) -> Result<()> {
    storage.set_string(THEME_KEY, preference.theme.to_string())?;
    storage.set_string(THEME_COLOR_KEY, preference.theme_color.to_string())?;
    storage.set_string(USE_SYSTEM_THEME_KEY, preference.use_system_theme.to_string())?;
    storage.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionAuth;
    use crate::storage::{shared, MemoryStorage};

    struct Fixture {
        local: SharedStorage,
        session: SharedStorage,
        auth: Arc<SessionAuth>,
    }

    impl Fixture {
        fn new(local: MemoryStorage, session: MemoryStorage, token: Option<&str>) -> Self {
            Self {
                local: shared(local),
                session: shared(session),
                auth: Arc::new(SessionAuth::with_token(token.map(str::to_string))),
            }
        }

        fn store(&self) -> ThemeStore {
            ThemeStore::new(self.local.clone(), self.session.clone(), self.auth.clone())
        }
    }

    #[test]
    fn test_defaults_to_dark_without_any_source() {
        let fx = Fixture::new(MemoryStorage::new(), MemoryStorage::new(), None);
        let mut store = fx.store();
        store.initialize(None);
        assert_eq!(store.theme(), ThemeName::Dark);
        assert_eq!(store.theme_color(), AccentColor::Blue);
        assert!(!store.use_system_theme());
    }

    #[test]
    fn test_falls_back_to_os_preference() {
        let fx = Fixture::new(MemoryStorage::new(), MemoryStorage::new(), None);
        let mut store = fx.store();
        store.initialize(Some(egui::Theme::Light));
        assert_eq!(store.theme(), ThemeName::Light);
    }

    #[test]
    fn test_session_wins_for_signed_in_users() {
        let local = MemoryStorage::new().with_entry(THEME_KEY, "light");
        let session = MemoryStorage::new().with_entry(THEME_KEY, "sepia");

        let fx = Fixture::new(local, session, Some("token"));
        let mut store = fx.store();
        store.initialize(None);
        assert_eq!(store.theme(), ThemeName::Sepia);

        fx.auth.sign_out();
        let mut store = fx.store();
        store.initialize(None);
        assert_eq!(store.theme(), ThemeName::Light);
    }

    #[test]
    fn test_invalid_stored_values_are_ignored() {
        let local = MemoryStorage::new()
            .with_entry(THEME_KEY, "neon")
            .with_entry(THEME_COLOR_KEY, "teal");
        let fx = Fixture::new(local, MemoryStorage::new(), None);
        let mut store = fx.store();
        store.initialize(None);
        assert_eq!(store.theme(), ThemeName::Dark);
        assert_eq!(store.theme_color(), AccentColor::Blue);
    }

    #[test]
    fn test_set_theme_persists_and_clears_gate() {
        let fx = Fixture::new(MemoryStorage::new(), MemoryStorage::new(), Some("token"));
        let mut store = fx.store();
        store.initialize(None);

        store.set_use_system_theme(true, Some(egui::Theme::Dark));
        assert_eq!(store.theme(), ThemeName::Dark);
        assert!(store.use_system_theme());

        store.set_theme(ThemeName::Light);
        assert!(!store.use_system_theme());
        assert_eq!(lock(&fx.local).get_string(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(lock(&fx.local).get_string(USE_SYSTEM_THEME_KEY).as_deref(), Some("false"));
        assert_eq!(lock(&fx.session).get_string(THEME_KEY).as_deref(), Some("light"));
    }

    #[test]
    fn test_signed_out_changes_skip_session() {
        let fx = Fixture::new(MemoryStorage::new(), MemoryStorage::new(), None);
        let mut store = fx.store();
        store.initialize(None);
        store.set_theme_color(AccentColor::Orange);

        assert_eq!(lock(&fx.local).get_string(THEME_COLOR_KEY).as_deref(), Some("orange"));
        assert!(lock(&fx.session).get_string(THEME_COLOR_KEY).is_none());
    }

    #[test]
    fn test_toggle_cycles_through_three_themes() {
        let fx = Fixture::new(MemoryStorage::new().with_entry(THEME_KEY, "light"), MemoryStorage::new(), None);
        let mut store = fx.store();
        store.initialize(None);

        assert_eq!(store.toggle_theme(), ThemeName::Dark);
        assert_eq!(store.toggle_theme(), ThemeName::Sepia);
        assert_eq!(store.toggle_theme(), ThemeName::Light);
    }

    #[test]
    fn test_remote_save_requested_only_after_initialization() {
        let fx = Fixture::new(MemoryStorage::new(), MemoryStorage::new(), None);
        let mut store = fx.store();

        store.set_theme(ThemeName::Sepia);
        assert!(store.take_remote_save_request().is_none());

        store.initialize(None);
        store.set_theme(ThemeName::Dark);
        let partial = store.take_remote_save_request().unwrap();
        assert_eq!(partial, PartialUserSettings::account_theme(AccountTheme::Dark));
        assert!(store.take_remote_save_request().is_none());
    }

    #[test]
    fn test_account_projection_and_reconcile() {
        let fx = Fixture::new(MemoryStorage::new(), MemoryStorage::new(), None);
        let mut store = fx.store();
        store.initialize(None);

        store.set_theme(ThemeName::Sepia);
        assert_eq!(store.account_theme(), AccountTheme::Light);
        assert!(!store.reconcile_with_account(AccountTheme::Light, None));
        assert_eq!(store.theme(), ThemeName::Sepia);

        assert!(store.reconcile_with_account(AccountTheme::System, Some(egui::Theme::Dark)));
        assert!(store.use_system_theme());
        assert_eq!(store.theme(), ThemeName::Dark);
        assert_eq!(store.account_theme(), AccountTheme::System);
    }

    #[test]
    fn test_failing_local_storage_keeps_memory_state() {
        let fx = Fixture::new(MemoryStorage::failing(), MemoryStorage::new(), None);
        let mut store = fx.store();
        store.initialize(None);
        store.set_theme(ThemeName::Light);
        assert_eq!(store.theme(), ThemeName::Light);
    }

    #[test]
    fn test_clear_session() {
        let fx = Fixture::new(MemoryStorage::new(), MemoryStorage::new(), Some("token"));
        let mut store = fx.store();
        store.initialize(None);
        store.set_theme(ThemeName::Sepia);
        assert!(lock(&fx.session).get_string(THEME_KEY).is_some());

        store.clear_session();
        assert!(lock(&fx.session).get_string(THEME_KEY).is_none());
    }
}
