//! Process-wide index of live records.
//!
//! Guarantees at most one in-memory instance per `(collection, id)`: every
//! load goes through the cache first, and every save registers the handle it
//! saved. The cache itself never touches durable storage.

use holdfast_types::{EntityKey, InstanceId, Persistent, key_of};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::debug;

/// A shared, mutable handle to a live record.
pub type Shared<T> = Arc<RwLock<T>>;

/// Wraps a record in a fresh [`Shared`] handle.
pub fn share<T>(record: T) -> Shared<T> {
    Arc::new(RwLock::new(record))
}

type AnyHandle = Arc<dyn Any + Send + Sync>;

/// Maps `(collection, id)` to the single live handle for that identity.
#[derive(Default)]
pub struct IdentityCache {
    entries: Mutex<HashMap<EntityKey, AnyHandle>>,
}

impl IdentityCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live handle for `id`, if one is registered.
    pub fn get_instance<T: Persistent>(&self, id: &InstanceId) -> Option<Shared<T>> {
        let key = key_of::<T>(id.clone());
        let handle = self.entries.lock().unwrap().get(&key).cloned()?;
        handle.downcast::<RwLock<T>>().ok()
    }

    /// Registers `handle` under the identity it currently carries.
    ///
    /// Re-adding an identity replaces the previous mapping.
    pub fn add_reference<T: Persistent>(&self, handle: &Shared<T>) {
        let key = handle.read().unwrap().key();
        self.insert(key, handle);
    }

    /// Registers `handle` under an explicit key.
    pub fn insert<T: Persistent>(&self, key: EntityKey, handle: &Shared<T>) {
        let erased: AnyHandle = handle.clone();
        if self.entries.lock().unwrap().insert(key.clone(), erased).is_some() {
            debug!(%key, "replaced cached instance");
        }
    }

    /// Removes the mapping for the identity `handle` carries.
    pub fn remove_reference<T: Persistent>(&self, handle: &Shared<T>) {
        let key = handle.read().unwrap().key();
        self.remove(&key);
    }

    /// Removes the mapping for `key`, returning whether one existed.
    pub fn remove(&self, key: &EntityKey) -> bool {
        self.entries.lock().unwrap().remove(key).is_some()
    }

    /// Removes every mapping in `collection`.
    pub fn remove_collection_reference(&self, collection: &str) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|key, _| key.collection != collection);
        before - entries.len()
    }

    /// Returns true if `key` has a live handle.
    pub fn contains(&self, key: &EntityKey) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    /// Number of registered identities across all collections.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of registered identities in `collection`.
    pub fn collection_len(&self, collection: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .keys()
            .filter(|key| key.collection == collection)
            .count()
    }
}

impl std::fmt::Debug for IdentityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityCache")
            .field("len", &self.len())
            .finish()
    }
}
