//! Key-scoped client store and the redirect memory kept in it.
//!
//! [`KeyValueStore`] stands in for whatever persistent storage the client
//! has (browser local storage, an app-wide state container). The core only
//! needs get/set/remove; [`MemoryStore`] adds change subscriptions for
//! callers that observe the store.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use crate::defaults::{DEFAULT_REDIRECT, REDIRECT_MEMORY_KEY};

/// Capacity of the change notification channel.
const EVENT_CAPACITY: usize = 64;

/// A string store addressed by key.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Removes `key`.
    fn remove(&self, key: &str);
}

/// A change to one key. `value` is `None` on removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub key: String,
    pub value: Option<String>,
}

/// In-memory [`KeyValueStore`] with change notifications.
#[derive(Debug)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    events: broadcast::Sender<StoreEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Subscribes to every subsequent `set` and `remove`.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn notify(&self, key: &str, value: Option<&str>) {
        // No subscribers is not an error.
        let _ = self.events.send(StoreEvent {
            key: key.to_string(),
            value: value.map(str::to_string),
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            entries.insert(key.to_string(), value.to_string());
        }
        self.notify(key, Some(value));
    }

    fn remove(&self, key: &str) {
        let removed = {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            entries.remove(key).is_some()
        };
        if removed {
            self.notify(key, None);
        }
    }
}

/// The last authenticated location, remembered across a re-login.
///
/// Written on every auth-expired signal, consumed once by the login
/// success path.
#[derive(Clone)]
pub struct RedirectMemory {
    store: Arc<dyn KeyValueStore>,
}

impl RedirectMemory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Overwrites the remembered location.
    pub fn remember(&self, location: &str) {
        self.store.set(REDIRECT_MEMORY_KEY, location);
    }

    /// Returns the remembered location without consuming it.
    pub fn peek(&self) -> Option<String> {
        self.store.get(REDIRECT_MEMORY_KEY)
    }

    /// Reads and clears the remembered location.
    ///
    /// Only same-origin paths are returned; anything else (absolute URLs,
    /// protocol-relative `//host` paths, empty values) yields `/`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use sessiongate_core::store::{MemoryStore, RedirectMemory};
    ///
    /// let memory = RedirectMemory::new(Arc::new(MemoryStore::new()));
    /// memory.remember("/trade/positions?x=1");
    /// assert_eq!(memory.take(), "/trade/positions?x=1");
    /// assert_eq!(memory.take(), "/");
    /// ```
    pub fn take(&self) -> String {
        take_redirect(self.store.as_ref())
    }
}

/// Consumes the redirect memory held in `store`. See [`RedirectMemory::take`].
pub fn take_redirect(store: &dyn KeyValueStore) -> String {
    let remembered = store.get(REDIRECT_MEMORY_KEY);
    store.remove(REDIRECT_MEMORY_KEY);

    remembered
        .filter(|location| location.starts_with('/') && !location.starts_with("//"))
        .unwrap_or_else(|| DEFAULT_REDIRECT.to_string())
}

impl std::fmt::Debug for RedirectMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectMemory").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_set_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k"), None);

        store.set("k", "v1");
        assert_eq!(store.get("k").as_deref(), Some("v1"));

        store.set("k", "v2");
        assert_eq!(store.get("k").as_deref(), Some("v2"));

        store.remove("k");
        assert_eq!(store.get("k"), None);
    }

    #[tokio::test]
    async fn test_memory_store_notifies_subscribers() {
        let store = MemoryStore::new();
        let mut events = store.subscribe();

        store.set("theme", "dark");
        store.remove("theme");
        store.remove("theme");

        assert_eq!(
            events.recv().await.unwrap(),
            StoreEvent {
                key: "theme".into(),
                value: Some("dark".into())
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            StoreEvent {
                key: "theme".into(),
                value: None
            }
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_redirect_memory_overwrites() {
        let memory = RedirectMemory::new(Arc::new(MemoryStore::new()));
        memory.remember("/a");
        memory.remember("/b?x=1#top");
        assert_eq!(memory.peek().as_deref(), Some("/b?x=1#top"));
        assert_eq!(memory.take(), "/b?x=1#top");
        assert_eq!(memory.peek(), None);
    }

    #[test]
    fn test_redirect_memory_rejects_foreign_locations() {
        let store = Arc::new(MemoryStore::new());
        let memory = RedirectMemory::new(store.clone());

        for location in ["https://evil.test/", "//evil.test/x", "", "relative"] {
            store.set(REDIRECT_MEMORY_KEY, location);
            assert_eq!(memory.take(), "/", "{location:?} must not be followed");
        }
    }

    #[test]
    fn test_redirect_memory_default() {
        let memory = RedirectMemory::new(Arc::new(MemoryStore::new()));
        assert_eq!(memory.take(), DEFAULT_REDIRECT);
    }

    #[test]
    fn test_take_redirect_on_plain_store() {
        let store = MemoryStore::new();
        store.set(REDIRECT_MEMORY_KEY, "/portfolio");
        assert_eq!(take_redirect(&store), "/portfolio");
        assert_eq!(store.get(REDIRECT_MEMORY_KEY), None);
    }
}
