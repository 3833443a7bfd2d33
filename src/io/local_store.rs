//! Local settings persistence.
//!
//! Provides JSON loading/saving of individual keys on top of a
//! `KeyValueStorage`, and the `LocalSettingsAdapter` that keeps the whole
//! `UserSettings` blob under `user_settings`.

use crate::error::Result;
use crate::settings::UserSettings;
use crate::storage::{lock, KeyValueStorage, SharedStorage};
use serde::{Deserialize, Serialize};

/// Storage key of the settings blob.
pub const SETTINGS_KEY: &str = "user_settings";

/// Loads a JSON value, falling back to `default` when the key is absent or
/// does not parse.
pub fn load_setting_or<T>(storage: &dyn KeyValueStorage, key: &str, default: T) -> T
where
    T: for<'de> Deserialize<'de>,
{
    if let Some(json_str) = storage.get_string(key) {
        match serde_json::from_str(&json_str) {
            Ok(value) => return value,
            Err(e) => {
                log::warn!("Stored value under {key:?} is not valid JSON, using default: {e}")
            }
        }
    }
    default
}

/// Loads a JSON value, returning None if not found or invalid.
pub fn try_load_setting<T>(storage: &dyn KeyValueStorage, key: &str) -> Option<T>
where
    T: for<'de> Deserialize<'de>,
{
    let json_str = storage.get_string(key)?;
    serde_json::from_str(&json_str).ok()
}

/// Serializes `value` as JSON under `key` and flushes the storage.
///
/// If the flush fails the previous entry is restored, so readers never see
/// a value that did not reach the backing store.
pub fn save_setting<T>(storage: &mut dyn KeyValueStorage, key: &str, value: &T) -> Result<()>
where
    T: Serialize,
{
    let json_str = serde_json::to_string(value)?;
    let previous = storage.get_string(key);
    storage.set_string(key, json_str)?;

    if let Err(e) = storage.flush() {
        let _ = match previous {
            Some(previous) => storage.set_string(key, previous),
            None => storage.remove(key),
        };
        return Err(e);
    }
    Ok(())
}

/// Reads and writes `UserSettings` in the durable local storage.
#[derive(Clone)]
pub struct LocalSettingsAdapter {
    storage: SharedStorage,
}

impl LocalSettingsAdapter {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    /// Returns the stored settings, or the defaults when nothing usable is
    /// stored. Never fails.
    pub fn load(&self) -> UserSettings {
        let storage = lock(&self.storage);
        load_setting_or(&*storage, SETTINGS_KEY, UserSettings::default()).normalized()
    }

    /// Writes `settings`. On failure the storage is left as it was and the
    /// error is returned for the caller to report.
    pub fn save(&self, settings: &UserSettings) -> Result<()> {
        let mut storage = lock(&self.storage);
        save_setting(&mut *storage, SETTINGS_KEY, settings).map_err(|e| {
            log::warn!("Could not persist settings locally: {e}");
            e
        })
    }

    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DEFAULT_SETTINGS;
    use crate::storage::{shared, MemoryStorage};

    #[test]
    fn test_save_and_load_simple() {
        let mut storage = MemoryStorage::new();
        save_setting(&mut storage, "test_key", &42i32).unwrap();

        let loaded: i32 = load_setting_or(&storage, "test_key", 0);
        assert_eq!(loaded, 42);
    }

    #[test]
    fn test_try_load_setting() {
        let mut storage = MemoryStorage::new();

        let result: Option<i32> = try_load_setting(&storage, "missing");
        assert_eq!(result, None);

        save_setting(&mut storage, "test", &123i32).unwrap();
        let result: Option<i32> = try_load_setting(&storage, "test");
        assert_eq!(result, Some(123));
    }

    #[test]
    fn test_load_without_entry_returns_defaults() {
        let adapter = LocalSettingsAdapter::new(shared(MemoryStorage::new()));
        assert_eq!(adapter.load(), *DEFAULT_SETTINGS);
    }

    #[test]
    fn test_corrupt_json_returns_defaults() {
        let storage = MemoryStorage::new().with_entry(SETTINGS_KEY, "{not json");
        let adapter = LocalSettingsAdapter::new(shared(storage));
        assert_eq!(adapter.load(), *DEFAULT_SETTINGS);
    }

    #[test]
    fn test_load_is_idempotent() {
        let adapter = LocalSettingsAdapter::new(shared(MemoryStorage::new()));
        let mut settings = UserSettings::default();
        settings.account.bio = "Editor".to_string();
        adapter.save(&settings).unwrap();

        assert_eq!(adapter.load(), adapter.load());
        assert_eq!(adapter.load().account.bio, "Editor");
    }

    #[test]
    fn test_save_failure_keeps_previous_value() {
        let adapter = LocalSettingsAdapter::new(shared(MemoryStorage::failing()));
        let mut settings = UserSettings::default();
        settings.comments.allow_anonymous = true;

        assert!(adapter.save(&settings).is_err());
        assert_eq!(adapter.load(), *DEFAULT_SETTINGS);
    }

    #[test]
    fn test_failed_file_flush_restores_previous_entry() {
        use crate::storage::FileStorage;
        use std::{env, fs};

        // A regular file where the storage directory should be
        let blocker = env::temp_dir().join(format!("rquill-blocked-{}", std::process::id()));
        fs::write(&blocker, "not a directory").unwrap();
        let mut storage = FileStorage::in_dir(&blocker);
        storage.set_string(SETTINGS_KEY, "{}".to_string()).unwrap();

        let adapter = LocalSettingsAdapter::new(shared(storage));
        let mut settings = UserSettings::default();
        settings.account.bio = "unsaved".to_string();

        assert!(adapter.save(&settings).is_err());
        assert_eq!(adapter.load().account.bio, "");
        assert_eq!(
            lock(adapter.storage()).get_string(SETTINGS_KEY).as_deref(),
            Some("{}")
        );

        let _ = fs::remove_file(&blocker);
    }
}
