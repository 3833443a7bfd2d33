//! Reconciliation of the local and remote settings copies.

use crate::auth::AuthProvider;
use crate::error::{Result, SettingsError};
use crate::io::{LocalSettingsAdapter, RemoteSettings};
use crate::settings::UserSettings;
use std::sync::Arc;

/// Prefers the remote copy when signed in, the local copy otherwise.
#[derive(Clone)]
pub struct SettingsSynchronizer {
    local: LocalSettingsAdapter,
    remote: Arc<dyn RemoteSettings>,
    auth: Arc<dyn AuthProvider>,
}

impl SettingsSynchronizer {
    pub fn new(
        local: LocalSettingsAdapter,
        remote: Arc<dyn RemoteSettings>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self { local, remote, auth }
    }

    /// Returns the settings the application should run with.
    ///
    /// Signed out: the local copy, without touching the network. Signed in:
    /// the remote copy, also written to local storage. Any remote failure
    /// is logged and answered with the local copy.
    pub fn sync(&self) -> UserSettings {
        match self.try_sync() {
            Ok(settings) => settings,
            Err(SettingsError::Unauthenticated) => self.local.load(),
            Err(e) => {
                log::warn!("Settings sync failed, keeping local copy: {e}");
                self.local.load()
            }
        }
    }

    /// Fetches the remote copy and stores it locally.
    pub fn try_sync(&self) -> Result<UserSettings> {
        if !self.auth.is_authenticated() {
            return Err(SettingsError::Unauthenticated);
        }
        let settings = self.remote.load()?;
        // A local write failure leaves the fetched copy in memory only.
        let _ = self.local.save(&settings);
        Ok(settings)
    }

    pub fn local(&self) -> &LocalSettingsAdapter {
        &self.local
    }

    pub fn remote(&self) -> &Arc<dyn RemoteSettings> {
        &self.remote
    }

    pub fn auth(&self) -> &Arc<dyn AuthProvider> {
        &self.auth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionAuth;
    use crate::storage::{shared, MemoryStorage};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeRemote {
        settings: Option<UserSettings>,
        calls: AtomicUsize,
    }

    impl RemoteSettings for FakeRemote {
        fn load(&self) -> Result<UserSettings> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.settings.clone().ok_or(SettingsError::Status(503))
        }

        fn save(&self, settings: &UserSettings) -> Result<UserSettings> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(settings.clone())
        }
    }

    fn remote_settings() -> UserSettings {
        let mut settings = UserSettings::default();
        settings.account.display_name = "From server".to_string();
        settings
    }

    fn setup(remote: Option<UserSettings>, token: Option<&str>) -> (SettingsSynchronizer, Arc<FakeRemote>) {
        let local = LocalSettingsAdapter::new(shared(MemoryStorage::new()));
        let mut local_settings = UserSettings::default();
        local_settings.account.display_name = "From disk".to_string();
        local.save(&local_settings).unwrap();

        let remote = Arc::new(FakeRemote {
            settings: remote,
            calls: AtomicUsize::new(0),
        });
        let auth = Arc::new(SessionAuth::with_token(token.map(str::to_string)));
        (SettingsSynchronizer::new(local, remote.clone(), auth), remote)
    }

    #[test]
    fn test_unauthenticated_returns_local_without_network() {
        let (sync, remote) = setup(Some(remote_settings()), None);
        assert_eq!(sync.sync().account.display_name, "From disk");
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_authenticated_prefers_remote_and_persists_it() {
        let (sync, _remote) = setup(Some(remote_settings()), Some("token"));
        assert_eq!(sync.sync().account.display_name, "From server");
        assert_eq!(sync.local().load().account.display_name, "From server");
    }

    #[test]
    fn test_remote_failure_falls_back_to_local() {
        let (sync, remote) = setup(None, Some("token"));
        assert_eq!(sync.sync().account.display_name, "From disk");
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(sync.try_sync(), Err(SettingsError::Status(503))));
    }
}
