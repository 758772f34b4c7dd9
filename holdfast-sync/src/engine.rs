//! Remote sync engine.
//!
//! Stages remote writes and deletes in FIFO queues and sends each queue to the
//! remote store as a single batch. Staging a write or delete cancels the
//! opposite operation still staged for the same record, so the remote always
//! ends up with the last one. Every remote call passes through the
//! connection monitor: a failure that looks like lost connectivity flips the
//! state to offline before the original error is returned.

use crate::connectivity::{ConnectionMonitor, Connectivity};
use crate::error::SyncResult;
use crate::pool::ObjectPool;
use crate::queue::StagingQueue;
use crate::remote::{ObjectAck, ReadScope, RemoteObject, RemoteStore, Session, StorageDescriptor, WriteObject};
use holdfast_types::{EntityKey, InstanceId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for the sync engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Put a batch back on its queue when the flush fails, so the next flush
    /// retries it.
    pub requeue_on_failure: bool,
    /// Idle descriptor batches kept for reuse.
    pub descriptor_pool_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            requeue_on_failure: true,
            descriptor_pool_capacity: 4,
        }
    }
}

/// Batches remote writes, deletes and reads against one [`RemoteStore`].
pub struct SyncEngine {
    remote: Arc<dyn RemoteStore>,
    config: SyncConfig,
    writes: StagingQueue<WriteObject>,
    deletes: StagingQueue<EntityKey>,
    descriptors: ObjectPool<Vec<StorageDescriptor>>,
    connection: ConnectionMonitor,
}

impl SyncEngine {
    pub fn new(remote: Arc<dyn RemoteStore>, config: SyncConfig) -> Self {
        Self {
            remote,
            descriptors: ObjectPool::new(config.descriptor_pool_capacity),
            config,
            writes: StagingQueue::new(),
            deletes: StagingQueue::new(),
            connection: ConnectionMonitor::new(),
        }
    }

    pub fn remote(&self) -> &Arc<dyn RemoteStore> {
        &self.remote
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Connection state as observed by remote calls.
    pub fn connection(&self) -> &ConnectionMonitor {
        &self.connection
    }

    /// Descriptor pool used for batched reads and deletes.
    pub fn descriptor_pool(&self) -> &ObjectPool<Vec<StorageDescriptor>> {
        &self.descriptors
    }

    // ── Staging ──────────────────────────────────────────────────

    /// Stages an encoded record for the next write flush.
    ///
    /// A delete of the same record still waiting in the delete queue is
    /// cancelled, so the write is the last word on the record.
    pub fn stage_write(&self, key: EntityKey, payload: String) {
        let cancelled = self.deletes.cancel(|staged| *staged == key);
        debug!(%key, cancelled, "staged remote write");
        self.writes.push(WriteObject::new(key, payload));
    }

    /// Stages an identity for the next delete flush.
    ///
    /// Writes of the same record still waiting in the write queue are
    /// dropped, so a later write flush cannot bring the record back.
    pub fn stage_delete(&self, key: EntityKey) {
        let cancelled = self.writes.cancel(|staged| staged.is_for(&key));
        debug!(%key, cancelled, "staged remote delete");
        self.deletes.push(key);
    }

    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    pub fn pending_deletes(&self) -> usize {
        self.deletes.len()
    }

    // ── Session ──────────────────────────────────────────────────

    /// Returns a live session, authenticating if none exists or the current
    /// one has expired.
    pub async fn session(&self) -> SyncResult<Session> {
        if let Some(session) = self.remote.session().filter(|s| !s.is_expired()) {
            return Ok(session);
        }
        debug!(provider = self.remote.provider_name(), "establishing session");
        let result = self.remote.authenticate().await;
        self.observe(result).await
    }

    async fn owner_for(&self, scope: &ReadScope) -> SyncResult<Option<String>> {
        Ok(match scope {
            ReadScope::Session => Some(self.session().await?.user_id),
            ReadScope::User(user_id) => Some(user_id.clone()),
            ReadScope::System => None,
        })
    }

    // ── Flush ────────────────────────────────────────────────────

    /// Sends every staged write in one batch.
    ///
    /// An empty queue makes no remote call. On failure the batch is requeued
    /// (see [`SyncConfig::requeue_on_failure`]) and the error returned.
    pub async fn process_write_queue(&self) -> SyncResult<Vec<ObjectAck>> {
        let batch = self.writes.take();
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let result = match self.session().await {
            Ok(session) => {
                let result = self.remote.write_objects(&session.user_id, &batch).await;
                self.observe(result).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(acks) => {
                info!(count = acks.len(), "flushed remote writes");
                Ok(acks)
            }
            Err(e) => {
                warn!(count = batch.len(), "remote write flush failed: {e}");
                if self.config.requeue_on_failure {
                    // Records deleted while the batch was in flight stay deleted.
                    let batch = batch
                        .into_iter()
                        .filter(|obj| !self.deletes.any(|key| obj.is_for(key)))
                        .collect();
                    self.writes.restore_front(batch);
                }
                Err(e)
            }
        }
    }

    /// Sends every staged delete in one batch, returning how many were sent.
    pub async fn process_delete_queue(&self) -> SyncResult<usize> {
        let keys = self.deletes.take();
        if keys.is_empty() {
            return Ok(0);
        }

        let result = match self.session().await {
            Ok(session) => {
                let mut descriptors = self.descriptors.checkout();
                descriptors.extend(
                    keys.iter()
                        .map(|key| StorageDescriptor::new(key, Some(&session.user_id))),
                );
                let result = self.remote.delete_objects(&descriptors).await;
                self.observe(result).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                info!(count = keys.len(), "flushed remote deletes");
                Ok(keys.len())
            }
            Err(e) => {
                warn!(count = keys.len(), "remote delete flush failed: {e}");
                if self.config.requeue_on_failure {
                    // Records written again while the batch was in flight keep
                    // the newer write.
                    let keys = keys
                        .into_iter()
                        .filter(|key| !self.writes.any(|obj| obj.is_for(key)))
                        .collect();
                    self.deletes.restore_front(keys);
                }
                Err(e)
            }
        }
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Reads several records of one collection in a single round trip.
    /// Records missing remotely are omitted.
    pub async fn read_objects(
        &self,
        collection: &str,
        ids: &[InstanceId],
        scope: &ReadScope,
    ) -> SyncResult<Vec<RemoteObject>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let owner = self.owner_for(scope).await?;

        let mut descriptors = self.descriptors.checkout();
        descriptors.extend(ids.iter().map(|id| StorageDescriptor {
            collection: collection.to_string(),
            key: id.clone(),
            owner: owner.clone(),
        }));
        let result = self.remote.read_objects(&descriptors).await;
        self.observe(result).await
    }

    /// Reads one record, or `None` if it is not stored remotely.
    pub async fn read_object(
        &self,
        key: &EntityKey,
        scope: &ReadScope,
    ) -> SyncResult<Option<RemoteObject>> {
        let objects = self
            .read_objects(&key.collection, std::slice::from_ref(&key.instance_id), scope)
            .await?;
        Ok(objects.into_iter().next())
    }

    /// Lists every remote record of `collection` in `scope`.
    pub async fn list_collection(
        &self,
        collection: &str,
        scope: &ReadScope,
    ) -> SyncResult<Vec<RemoteObject>> {
        let owner = self.owner_for(scope).await?;
        let result = self.remote.list_objects(collection, owner.as_deref()).await;
        self.observe(result).await
    }

    /// Updates the connection state from the outcome of a remote call and
    /// passes the outcome through unchanged.
    async fn observe<T>(&self, result: SyncResult<T>) -> SyncResult<T> {
        match &result {
            Ok(_) => self.connection.set(Connectivity::Online),
            Err(e) => {
                if e.is_connectivity_failure() || !self.remote.has_connectivity().await {
                    self.connection.set(Connectivity::Offline);
                }
            }
        }
        result
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("provider", &self.remote.provider_name())
            .field("pending_writes", &self.writes.len())
            .field("pending_deletes", &self.deletes.len())
            .field("connection", &self.connection.state())
            .finish()
    }
}
