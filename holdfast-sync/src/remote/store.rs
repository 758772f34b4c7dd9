//! Remote object store abstraction.
//!
//! Defines the contract the sync engine needs from a remote backend: batched
//! read, write and delete of text values keyed by collection, key and owner.

use crate::error::SyncResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use holdfast_types::{EntityKey, InstanceId};
use serde::{Deserialize, Serialize};

/// Configuration shared by remote store implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteStoreConfig {
    /// Namespace (folder, bucket prefix) all objects live under.
    pub namespace: String,
    /// Largest value accepted for a single object (in bytes).
    pub max_object_size: usize,
}

impl Default for RemoteStoreConfig {
    fn default() -> Self {
        Self {
            namespace: "holdfast".to_string(),
            max_object_size: 4 * 1024 * 1024, // 4 MB
        }
    }
}

/// Identifies where a remote copy of a record lives.
///
/// Owner-scoped descriptors address a user's private objects; descriptors
/// without an owner address shared system objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageDescriptor {
    pub collection: String,
    pub key: InstanceId,
    pub owner: Option<String>,
}

impl StorageDescriptor {
    pub fn new(key: &EntityKey, owner: Option<&str>) -> Self {
        Self {
            collection: key.collection.clone(),
            key: key.instance_id.clone(),
            owner: owner.map(str::to_string),
        }
    }

    /// Returns true if this descriptor addresses owner-private storage.
    pub fn is_owner_scoped(&self) -> bool {
        self.owner.is_some()
    }

    pub fn entity_key(&self) -> EntityKey {
        EntityKey::new(self.collection.clone(), self.key.clone())
    }
}

/// A value staged for a batched remote write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteObject {
    pub collection: String,
    pub key: InstanceId,
    pub value: String,
}

impl WriteObject {
    pub fn new(key: EntityKey, value: String) -> Self {
        Self {
            collection: key.collection,
            key: key.instance_id,
            value,
        }
    }

    /// Returns true if this object carries the record identified by `key`.
    pub fn is_for(&self, key: &EntityKey) -> bool {
        self.collection == key.collection && self.key == key.instance_id
    }
}

/// An object returned by a remote read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteObject {
    pub collection: String,
    pub key: InstanceId,
    pub owner: Option<String>,
    pub value: String,
    pub version: String,
}

/// Acknowledgement for one written object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectAck {
    pub collection: String,
    pub key: InstanceId,
    pub owner: Option<String>,
    pub version: String,
}

/// Which owner a remote read targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadScope {
    /// Objects owned by the current session's user.
    Session,
    /// Objects owned by a specific user.
    User(String),
    /// Shared system objects with no owner.
    System,
}

/// An authenticated session with a remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// A session for `user_id` that never expires.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}

/// Abstract remote object store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Returns the name of the backend.
    fn provider_name(&self) -> &'static str;

    /// Returns the current session, if one has been established.
    fn session(&self) -> Option<Session>;

    /// Establishes (or re-establishes) a session.
    async fn authenticate(&self) -> SyncResult<Session>;

    /// Probes whether the backend is reachable at all.
    async fn has_connectivity(&self) -> bool;

    /// Reads the objects identified by `ids`. Missing objects are omitted.
    async fn read_objects(&self, ids: &[StorageDescriptor]) -> SyncResult<Vec<RemoteObject>>;

    /// Lists every object in `collection` belonging to `owner` (or the
    /// system objects when `owner` is `None`).
    async fn list_objects(
        &self,
        collection: &str,
        owner: Option<&str>,
    ) -> SyncResult<Vec<RemoteObject>>;

    /// Writes a batch of objects owned by `owner`, returning one ack per object.
    async fn write_objects(&self, owner: &str, objects: &[WriteObject])
    -> SyncResult<Vec<ObjectAck>>;

    /// Deletes a batch of objects. Missing objects are not an error.
    async fn delete_objects(&self, ids: &[StorageDescriptor]) -> SyncResult<()>;
}
