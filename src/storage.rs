//! Key/value storage backends.
//!
//! Both the settings blob and the individual theme keys live in plain
//! string-keyed storages. `FileStorage` is the durable one (survives
//! restarts), `MemoryStorage` plays the session storage and doubles as the
//! test backend. Stores receive a `SharedStorage` handle so tests can inject
//! their own.

use crate::error::{Result, SettingsError};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// String key/value storage with fallible writes.
///
/// Same shape as `eframe::Storage`, except writes report failures so the
/// caller can fall back to memory-only operation.
pub trait KeyValueStorage {
    fn get_string(&self, key: &str) -> Option<String>;

    fn set_string(&mut self, key: &str, value: String) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;

    /// Makes previous writes durable. No-op for in-memory backends.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Process-wide handle to a storage backend. Last writer wins.
pub type SharedStorage = Arc<Mutex<dyn KeyValueStorage + Send>>;

/// Wraps a backend into a `SharedStorage`.
pub fn shared<S: KeyValueStorage + Send + 'static>(storage: S) -> SharedStorage {
    Arc::new(Mutex::new(storage))
}

/// Locks a shared storage, recovering the guard if another thread panicked
/// while holding it. The map inside stays usable either way.
pub fn lock(storage: &SharedStorage) -> MutexGuard<'_, dyn KeyValueStorage + Send + 'static> {
    storage.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory storage, dropped with the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A storage whose writes always fail, like a browser storage in
    /// privacy mode or over quota.
    pub fn failing() -> Self {
        Self {
            data: HashMap::new(),
            fail_writes: true,
        }
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.data.insert(key.to_string(), value.to_string());
        self
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_string(&self, key: &str) -> Option<String> {
        self.data.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: String) -> Result<()> {
        if self.fail_writes {
            return Err(SettingsError::storage("memory storage is read-only"));
        }
        self.data.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.fail_writes {
            return Err(SettingsError::storage("memory storage is read-only"));
        }
        self.data.remove(key);
        Ok(())
    }
}

/// Durable storage backed by a single JSON object file.
///
/// The whole map is read at open time and rewritten on `flush`. A missing,
/// unreadable or corrupt file opens as an empty storage.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    data: BTreeMap<String, String>,
    dirty: bool,
}

impl FileStorage {
    pub const FILE_NAME: &'static str = "storage.json";

    /// Opens (or prepares to create) the storage file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                log::warn!("Ignoring corrupt storage file {}: {e}", path.display());
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                log::warn!("Cannot read storage file {}: {e}", path.display());
                BTreeMap::new()
            }
        };

        Self {
            path,
            data,
            dirty: false,
        }
    }

    /// Opens `storage.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::open(dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStorage for FileStorage {
    fn get_string(&self, key: &str) -> Option<String> {
        self.data.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: String) -> Result<()> {
        if self.data.get(key) != Some(&value) {
            self.data.insert(key.to_string(), value);
            self.dirty = true;
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.data.remove(key).is_some() {
            self.dirty = true;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(SettingsError::storage)?;
        }

        let contents = serde_json::to_string_pretty(&self.data)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).map_err(SettingsError::storage)?;
        fs::rename(&tmp, &self.path).map_err(SettingsError::storage)?;
        self.dirty = false;
        Ok(())
    }
}
