//! Key/value repository for results and other client-side state.
//!
//! Task adapters never touch this; callers inject a repository wherever they
//! persist things (the CLI vault, a UI layer).

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::error::Result;

/// Called with the key and its new value (`None` after removal).
pub type ChangeCallback = Arc<dyn Fn(&str, Option<&Value>) + Send + Sync>;

/// Repository of JSON values addressed by string keys.
pub trait KeyValueRepository: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn put(&self, key: &str, value: Value) -> Result<()>;

    /// Returns `true` if the key existed.
    fn remove(&self, key: &str) -> Result<bool>;

    /// All keys, sorted.
    fn keys(&self) -> Result<Vec<String>>;

    /// Registers `callback` for changes to `key` until the returned
    /// [`Subscription`] is dropped.
    fn subscribe(&self, key: &str, callback: ChangeCallback) -> Subscription;
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    callbacks: HashMap<String, Vec<(u64, ChangeCallback)>>,
}

/// Shared bookkeeping of change subscribers, used by repository implementations.
#[derive(Default, Clone)]
pub struct SubscriberRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, key: &str, callback: ChangeCallback) -> Subscription {
        let mut inner = lock(&self.inner);
        inner.next_id += 1;
        let id = inner.next_id;
        inner
            .callbacks
            .entry(key.to_string())
            .or_default()
            .push((id, callback));
        Subscription {
            id,
            key: key.to_string(),
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Invokes every callback registered for `key`.
    ///
    /// Callbacks run after the registry lock is released, so they may
    /// subscribe or unsubscribe.
    pub fn notify(&self, key: &str, value: Option<&Value>) {
        let callbacks: Vec<ChangeCallback> = {
            let inner = lock(&self.inner);
            inner
                .callbacks
                .get(key)
                .map(|entries| entries.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                .unwrap_or_default()
        };
        for callback in callbacks {
            callback(key, value);
        }
    }

    pub fn subscriber_count(&self, key: &str) -> usize {
        lock(&self.inner)
            .callbacks
            .get(key)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

/// Active subscription; dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    key: String,
    registry: Weak<Mutex<RegistryInner>>,
}

impl Subscription {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            let mut inner = lock(&inner);
            if let Some(entries) = inner.callbacks.get_mut(&self.key) {
                entries.retain(|(id, _)| *id != self.id);
                if entries.is_empty() {
                    inner.callbacks.remove(&self.key);
                }
            }
        }
    }
}

fn lock(inner: &Mutex<RegistryInner>) -> MutexGuard<'_, RegistryInner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_notify_reaches_only_matching_key() {
        let registry = SubscriberRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _sub = registry.register(
            "vault/a",
            Arc::new(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        registry.notify("vault/a", Some(&Value::Bool(true)));
        registry.notify("vault/b", None);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let registry = SubscriberRegistry::new();
        let sub = registry.register("k", Arc::new(|_, _| {}));
        assert_eq!(registry.subscriber_count("k"), 1);
        drop(sub);
        assert_eq!(registry.subscriber_count("k"), 0);
    }
}
