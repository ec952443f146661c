//! Client-local persisted key/value storage.
//!
//! The compare-set, wishlist and pending preselect all persist through the
//! [`LocalStore`] trait so they can run against a directory on disk
//! ([`FileStore`]) or purely in memory ([`MemoryStore`]) in tests.
//!
//! Values are JSON-encoded arrays. Reading is forgiving: a missing key, an
//! unreadable file or content that does not parse all come back as an empty
//! collection (logged at `warn` when something was actually there).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Storage key holding the compare-set.
pub const COMPARE_LIST_KEY: &str = "compareList";
/// Storage key holding the wishlist.
pub const WISHLIST_KEY: &str = "wishlist";
/// Storage key holding a product id to preselect after sign-in.
pub const PENDING_PRESELECT_KEY: &str = "comparex_pending_preselect";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not encode value for key {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Raw string storage addressed by key.
pub trait LocalStore {
    /// Returns the stored value, or `None` when the key has never been written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing medium cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replaces the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing medium cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing medium cannot be modified.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: LocalStore + ?Sized> LocalStore for &S {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-process store, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a state directory.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn io_error(key: &str, source: std::io::Error) -> StoreError {
        StoreError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl LocalStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(key, e))?;
        let target = self.path_for(key);
        let staging = self.dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&staging, value).map_err(|e| Self::io_error(key, e))?;
        std::fs::rename(&staging, &target).map_err(|e| Self::io_error(key, e))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }
}

/// Loads the JSON array stored under `key`.
///
/// Never fails: absent keys, read errors and corrupt content all yield an
/// empty `Vec`.
pub fn load_collection<T, S>(store: &S, key: &str) -> Vec<T>
where
    T: DeserializeOwned,
    S: LocalStore + ?Sized,
{
    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(key, error = %e, "local store unreadable; starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(key, error = %e, "local store content corrupt; starting empty");
            Vec::new()
        }
    }
}

/// Serialises `items` as a JSON array and writes it under `key`.
///
/// # Errors
///
/// Returns [`StoreError::Serialize`] if encoding fails or any error from
/// the underlying [`LocalStore::write`].
pub fn save_collection<T, S>(store: &S, key: &str, items: &[T]) -> Result<(), StoreError>
where
    T: Serialize,
    S: LocalStore + ?Sized,
{
    let encoded = serde_json::to_string(items).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.write(key, &encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_key_is_empty() {
        let store = MemoryStore::new();
        let items: Vec<i64> = load_collection(&store, "nothing-here");
        assert!(items.is_empty());
    }

    #[test]
    fn load_corrupt_content_is_empty() {
        let store = MemoryStore::new();
        store.write(WISHLIST_KEY, "{not json").unwrap();
        let items: Vec<i64> = load_collection(&store, WISHLIST_KEY);
        assert!(items.is_empty());
    }

    #[test]
    fn load_wrong_shape_is_empty() {
        let store = MemoryStore::new();
        store.write(WISHLIST_KEY, r#"{"id": 1}"#).unwrap();
        let items: Vec<i64> = load_collection(&store, WISHLIST_KEY);
        assert!(items.is_empty());
    }

    #[test]
    fn save_then_load_returns_items() {
        let store = MemoryStore::new();
        save_collection(&store, "ids", &[3_i64, 1, 2]).unwrap();
        let items: Vec<i64> = load_collection(&store, "ids");
        assert_eq!(items, vec![3, 1, 2]);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state_dir = dir.path().join("state");

        save_collection(&FileStore::new(&state_dir), COMPARE_LIST_KEY, &[7_i64]).unwrap();

        let reopened = FileStore::new(&state_dir);
        let items: Vec<i64> = load_collection(&reopened, COMPARE_LIST_KEY);
        assert_eq!(items, vec![7]);
        assert!(state_dir.join("compareList.json").exists());
    }

    #[test]
    fn file_store_remove_missing_key_is_ok() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        store.remove("never-written").expect("remove is idempotent");
        assert!(store.read("never-written").unwrap().is_none());
    }

    #[test]
    fn file_store_heals_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("wishlist.json"), "\u{0}\u{1}garbage").unwrap();
        let items: Vec<i64> = load_collection(&FileStore::new(dir.path()), WISHLIST_KEY);
        assert!(items.is_empty());
    }
}
