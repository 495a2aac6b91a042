//! Key/value repository implementations.
//!
//! - [`InMemoryKeyValueRepository`]: process-local, for tests and ephemeral callers.
//! - [`FileKeyValueRepository`]: one JSON object on disk, written atomically.

use crate::paths::SellwisePaths;
use crate::storage::AtomicFile;
use sellwise_core::error::{Result, SellwiseError};
use sellwise_core::store::{ChangeCallback, KeyValueRepository, SubscriberRegistry, Subscription};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Process-local repository.
#[derive(Default)]
pub struct InMemoryKeyValueRepository {
    entries: RwLock<BTreeMap<String, Value>>,
    subscribers: SubscriberRegistry,
}

impl InMemoryKeyValueRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueRepository for InMemoryKeyValueRepository {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| SellwiseError::internal(format!("repository lock poisoned: {e}")))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: Value) -> Result<()> {
        {
            let mut entries = self
                .entries
                .write()
                .map_err(|e| SellwiseError::internal(format!("repository lock poisoned: {e}")))?;
            entries.insert(key.to_string(), value.clone());
        }
        self.subscribers.notify(key, Some(&value));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let existed = {
            let mut entries = self
                .entries
                .write()
                .map_err(|e| SellwiseError::internal(format!("repository lock poisoned: {e}")))?;
            entries.remove(key).is_some()
        };
        if existed {
            self.subscribers.notify(key, None);
        }
        Ok(existed)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| SellwiseError::internal(format!("repository lock poisoned: {e}")))?;
        Ok(entries.keys().cloned().collect())
    }

    fn subscribe(&self, key: &str, callback: ChangeCallback) -> Subscription {
        self.subscribers.register(key, callback)
    }
}

/// Repository persisted as a single JSON object (e.g. `vault.json`).
///
/// Every mutation is a locked read-modify-write, so separate processes
/// sharing the file do not lose each other's writes. Subscriptions only see
/// changes made through this instance.
pub struct FileKeyValueRepository {
    file: AtomicFile<BTreeMap<String, Value>>,
    subscribers: SubscriberRegistry,
}

impl FileKeyValueRepository {
    /// Opens the default vault file.
    pub fn vault() -> Result<Self> {
        let path = SellwisePaths::vault_file()
            .map_err(|e| SellwiseError::config(format!("Failed to get vault path: {}", e)))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::json(path),
            subscribers: SubscriberRegistry::new(),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    fn load_all(&self) -> Result<BTreeMap<String, Value>> {
        Ok(self.file.load()?.unwrap_or_default())
    }
}

impl KeyValueRepository for FileKeyValueRepository {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.load_all()?.remove(key))
    }

    fn put(&self, key: &str, value: Value) -> Result<()> {
        self.file.update(BTreeMap::new(), |entries| {
            entries.insert(key.to_string(), value.clone());
        })?;
        tracing::debug!("[Vault] Stored key '{}'", key);
        self.subscribers.notify(key, Some(&value));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let existed = self
            .file
            .update(BTreeMap::new(), |entries| entries.remove(key).is_some())?;
        if existed {
            tracing::debug!("[Vault] Removed key '{}'", key);
            self.subscribers.notify(key, None);
        }
        Ok(existed)
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.load_all()?.into_keys().collect())
    }

    fn subscribe(&self, key: &str, callback: ChangeCallback) -> Subscription {
        self.subscribers.register(key, callback)
    }
}
