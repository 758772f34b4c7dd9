//! In-memory remote store for testing.
//!
//! Records every batch it receives and can be switched offline or told to
//! fail the next few calls, so connectivity handling can be exercised without
//! a network.

use crate::error::{SyncError, SyncResult};
use crate::remote::{ObjectAck, RemoteObject, RemoteStore, Session, StorageDescriptor, WriteObject};
use async_trait::async_trait;
use holdfast_types::InstanceId;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

type ObjectId = (Option<String>, String, InstanceId);

#[derive(Debug, Clone)]
struct Stored {
    value: String,
    version: u64,
}

/// Counters describing the calls a [`MemoryRemoteStore`] has served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallStats {
    pub authentications: usize,
    pub read_batches: usize,
    pub list_calls: usize,
    pub write_batches: usize,
    pub delete_batches: usize,
}

/// A remote store that keeps everything in memory.
pub struct MemoryRemoteStore {
    user_id: String,
    objects: Mutex<BTreeMap<ObjectId, Stored>>,
    session: Mutex<Option<Session>>,
    offline: AtomicBool,
    fail_next: AtomicUsize,
    next_version: AtomicU64,
    stats: Mutex<CallStats>,
}

impl MemoryRemoteStore {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            objects: Mutex::new(BTreeMap::new()),
            session: Mutex::new(None),
            offline: AtomicBool::new(false),
            fail_next: AtomicUsize::new(0),
            next_version: AtomicU64::new(1),
            stats: Mutex::new(CallStats::default()),
        }
    }

    /// Simulates losing (or regaining) the network.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Makes the next `n` data calls fail with a server-side rejection while
    /// connectivity stays up.
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Drops the current session so the next owner-scoped call must
    /// re-authenticate.
    pub fn expire_session(&self) {
        *self.session.lock().unwrap() = None;
    }

    pub fn stats(&self) -> CallStats {
        *self.stats.lock().unwrap()
    }

    /// Returns the stored value for an object, if any.
    pub fn get(&self, collection: &str, key: &str, owner: Option<&str>) -> Option<String> {
        let id = (
            owner.map(str::to_string),
            collection.to_string(),
            InstanceId::new(key),
        );
        self.objects.lock().unwrap().get(&id).map(|s| s.value.clone())
    }

    /// Stores a value directly, bypassing the call accounting.
    pub fn put(&self, collection: &str, key: &str, owner: Option<&str>, value: impl Into<String>) {
        let id = (
            owner.map(str::to_string),
            collection.to_string(),
            InstanceId::new(key),
        );
        let version = self.next_version.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().insert(
            id,
            Stored {
                value: value.into(),
                version,
            },
        );
    }

    /// Number of stored objects across all owners and collections.
    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_call(&self) -> SyncResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SyncError::Network("connection refused".into()));
        }
        let injected = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(SyncError::Rejected("injected failure".into()));
        }
        Ok(())
    }

    fn to_remote(id: &ObjectId, stored: &Stored) -> RemoteObject {
        RemoteObject {
            collection: id.1.clone(),
            key: id.2.clone(),
            owner: id.0.clone(),
            value: stored.value.clone(),
            version: stored.version.to_string(),
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    fn provider_name(&self) -> &'static str {
        "Memory"
    }

    fn session(&self) -> Option<Session> {
        self.session.lock().unwrap().clone()
    }

    async fn authenticate(&self) -> SyncResult<Session> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SyncError::Network("connection refused".into()));
        }
        self.stats.lock().unwrap().authentications += 1;
        let session = Session::new(&self.user_id);
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(session)
    }

    async fn has_connectivity(&self) -> bool {
        !self.offline.load(Ordering::SeqCst)
    }

    async fn read_objects(&self, ids: &[StorageDescriptor]) -> SyncResult<Vec<RemoteObject>> {
        self.check_call()?;
        self.stats.lock().unwrap().read_batches += 1;
        let objects = self.objects.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|d| {
                let id = (d.owner.clone(), d.collection.clone(), d.key.clone());
                objects.get(&id).map(|s| Self::to_remote(&id, s))
            })
            .collect())
    }

    async fn list_objects(
        &self,
        collection: &str,
        owner: Option<&str>,
    ) -> SyncResult<Vec<RemoteObject>> {
        self.check_call()?;
        self.stats.lock().unwrap().list_calls += 1;
        let objects = self.objects.lock().unwrap();
        Ok(objects
            .iter()
            .filter(|(id, _)| id.0.as_deref() == owner && id.1 == collection)
            .map(|(id, s)| Self::to_remote(id, s))
            .collect())
    }

    async fn write_objects(
        &self,
        owner: &str,
        objects: &[WriteObject],
    ) -> SyncResult<Vec<ObjectAck>> {
        self.check_call()?;
        self.stats.lock().unwrap().write_batches += 1;
        let mut stored = self.objects.lock().unwrap();
        let mut acks = Vec::with_capacity(objects.len());
        for obj in objects {
            let version = self.next_version.fetch_add(1, Ordering::SeqCst);
            stored.insert(
                (Some(owner.to_string()), obj.collection.clone(), obj.key.clone()),
                Stored {
                    value: obj.value.clone(),
                    version,
                },
            );
            acks.push(ObjectAck {
                collection: obj.collection.clone(),
                key: obj.key.clone(),
                owner: Some(owner.to_string()),
                version: version.to_string(),
            });
        }
        Ok(acks)
    }

    async fn delete_objects(&self, ids: &[StorageDescriptor]) -> SyncResult<()> {
        self.check_call()?;
        self.stats.lock().unwrap().delete_batches += 1;
        let mut stored = self.objects.lock().unwrap();
        for d in ids {
            stored.remove(&(d.owner.clone(), d.collection.clone(), d.key.clone()));
        }
        Ok(())
    }
}
