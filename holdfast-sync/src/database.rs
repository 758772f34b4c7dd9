//! The persistence context.
//!
//! [`Database`] owns the local store (with its identity cache and pause gate)
//! and the sync engine, and exposes every per-record save, delete and load
//! entry point. All of them honour the pause gate.

use crate::connectivity::ConnectionMonitor;
use crate::engine::{SyncConfig, SyncEngine};
use crate::error::SyncResult;
use crate::remote::{ObjectAck, ReadScope, RemoteObject, RemoteStore};
use futures::stream::{self, Stream, StreamExt};
use holdfast_storage::{
    LoadAll, LocalStore, LocalStoreConfig, PendingCommand, Shared, StorageResult, decode,
};
use holdfast_types::{EntityKey, InstanceId, Persistent, key_of};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Configuration for a [`Database`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub local: LocalStoreConfig,
    pub sync: SyncConfig,
}

/// Outcome of [`Database::resume`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResumeReport {
    /// Deferred commands applied successfully.
    pub replayed: usize,
    /// Deferred commands whose local half failed.
    pub failed: usize,
    /// Remote writes staged by replayed commands.
    pub staged_writes: usize,
    /// Remote deletes staged by replayed commands.
    pub staged_deletes: usize,
}

/// Outcome of [`Database::flush`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub written: Vec<ObjectAck>,
    pub deleted: usize,
}

/// Local store, identity cache, pause gate and sync engine for one process.
pub struct Database {
    local: LocalStore,
    engine: Arc<SyncEngine>,
}

impl Database {
    /// Opens the local store described by `config` and syncs it with `remote`.
    pub fn open(config: DatabaseConfig, remote: Arc<dyn RemoteStore>) -> SyncResult<Self> {
        let local = LocalStore::open(config.local)?;
        let engine = Arc::new(SyncEngine::new(remote, config.sync));
        info!(root = ?local.root(), "database opened");
        Ok(Self::with_parts(local, engine))
    }

    pub fn with_parts(local: LocalStore, engine: Arc<SyncEngine>) -> Self {
        Self { local, engine }
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    pub fn connection(&self) -> &ConnectionMonitor {
        self.engine.connection()
    }

    // ── Pause gate ───────────────────────────────────────────────

    pub fn pause(&self) {
        self.local.gate().pause();
    }

    pub fn is_paused(&self) -> bool {
        self.local.gate().is_paused()
    }

    /// Defers `command` until the next [`resume`](Self::resume).
    pub fn enqueue_edit(&self, command: PendingCommand) {
        self.local.gate().enqueue_edit(command);
    }

    /// Unpauses and replays every deferred command in enqueue order.
    ///
    /// Each command is applied directly, so a replayed command never lands
    /// back in the queue even if the gate is paused again mid-drain. Remote
    /// commands apply their local half and then stage the remote half; call
    /// [`flush`](Self::flush) to send it.
    pub fn resume(&self) -> ResumeReport {
        let mut report = ResumeReport::default();
        for command in self.local.gate().resume() {
            if let Err(e) = self.local.apply(&command) {
                error!(key = %command.key(), "deferred command failed: {e}");
                report.failed += 1;
                continue;
            }
            report.replayed += 1;
            match command {
                PendingCommand::SaveRemote { key, payload } => {
                    self.engine.stage_write(key, payload);
                    report.staged_writes += 1;
                }
                PendingCommand::DeleteRemote { key } => {
                    self.engine.stage_delete(key);
                    report.staged_deletes += 1;
                }
                PendingCommand::SaveLocal { .. } | PendingCommand::DeleteLocal { .. } => {}
            }
        }
        debug!(?report, "resume finished");
        report
    }

    // ── Local ────────────────────────────────────────────────────

    /// Returns the live instance for `id` if one is cached.
    pub fn get_instance<T: Persistent>(&self, id: &InstanceId) -> Option<Shared<T>> {
        self.local.cache().get_instance::<T>(id)
    }

    pub fn exists<T: Persistent>(&self, id: &InstanceId) -> bool {
        self.local.exists::<T>(id)
    }

    pub fn load<T: Persistent>(&self, id: &InstanceId) -> StorageResult<Shared<T>> {
        self.local.load::<T>(id)
    }

    pub fn load_all<T: Persistent>(&self) -> LoadAll<'_, T> {
        self.local.load_all::<T>()
    }

    pub fn save_local<T: Persistent>(&self, handle: &Shared<T>) -> StorageResult<()> {
        self.local.save(handle)
    }

    pub fn delete<T: Persistent>(&self, handle: &Shared<T>) -> StorageResult<bool> {
        self.local.delete(handle)
    }

    pub fn delete_instance<T: Persistent>(&self, id: &InstanceId) -> StorageResult<bool> {
        self.local.delete_instance::<T>(id)
    }

    pub fn delete_all_instances<T: Persistent>(&self) -> StorageResult<()> {
        self.local.delete_all_instances::<T>()
    }

    // ── Remote saves ─────────────────────────────────────────────

    /// Saves locally and stages a remote write for the next flush.
    ///
    /// Records whose type opts out of remote sync are only saved locally.
    pub fn enqueue_save_remote<T: Persistent>(&self, handle: &Shared<T>) -> SyncResult<()> {
        if !handle.read().unwrap().should_sync_remote() {
            debug!(collection = T::COLLECTION, "remote sync vetoed, saving locally");
            self.local.save(handle)?;
            return Ok(());
        }

        let (key, payload) = self.local.prepare_record(handle)?;
        self.local.cache().insert(key.clone(), handle);

        if self.is_paused() {
            self.enqueue_edit(PendingCommand::SaveRemote { key, payload });
            return Ok(());
        }

        self.local.write_payload(&key, &payload)?;
        self.engine.stage_write(key, payload);
        Ok(())
    }

    /// Stages the record and starts a flush in the background.
    ///
    /// Returns the flush task, or `None` when paused or when called outside
    /// a tokio runtime (the write then waits for the next flush). Flush
    /// failures are logged.
    pub fn save_remote<T: Persistent>(
        &self,
        handle: &Shared<T>,
    ) -> SyncResult<Option<JoinHandle<()>>> {
        self.enqueue_save_remote(handle)?;
        Ok(self.spawn_flush(FlushKind::Writes))
    }

    /// Stages the record and flushes, returning the remote acknowledgements.
    pub async fn save_remote_async<T: Persistent>(
        &self,
        handle: &Shared<T>,
    ) -> SyncResult<Vec<ObjectAck>> {
        self.enqueue_save_remote(handle)?;
        self.flush_writes().await
    }

    /// Stages every record in `handles`. Returns how many were staged.
    pub fn enqueue_save_collection<T: Persistent>(&self, handles: &[Shared<T>]) -> SyncResult<usize> {
        for handle in handles {
            self.enqueue_save_remote(handle)?;
        }
        Ok(handles.len())
    }

    /// Stages every record in `handles` and sends them in one batch.
    pub async fn save_collection_remote_async<T: Persistent>(
        &self,
        handles: &[Shared<T>],
    ) -> SyncResult<Vec<ObjectAck>> {
        self.enqueue_save_collection(handles)?;
        self.flush_writes().await
    }

    // ── Remote deletes ───────────────────────────────────────────

    /// Deletes locally and stages a remote delete for the next flush.
    pub fn enqueue_delete_remote<T: Persistent>(&self, handle: &Shared<T>) -> SyncResult<()> {
        let (key, sync) = {
            let record = handle.read().unwrap();
            (record.key(), record.should_sync_remote())
        };
        if !sync {
            self.local.delete_key(&key)?;
            return Ok(());
        }
        self.enqueue_delete_key(key)
    }

    /// Deletes the record identified by `key` locally and stages its remote
    /// delete.
    pub fn enqueue_delete_key(&self, key: EntityKey) -> SyncResult<()> {
        if self.is_paused() {
            self.enqueue_edit(PendingCommand::DeleteRemote { key });
            return Ok(());
        }
        self.local.delete_key(&key)?;
        self.engine.stage_delete(key);
        Ok(())
    }

    /// Stages the delete and starts a flush in the background.
    pub fn delete_remote<T: Persistent>(
        &self,
        handle: &Shared<T>,
    ) -> SyncResult<Option<JoinHandle<()>>> {
        self.enqueue_delete_remote(handle)?;
        Ok(self.spawn_flush(FlushKind::Deletes))
    }

    /// Stages the delete and flushes, returning how many deletes were sent.
    pub async fn delete_remote_async<T: Persistent>(&self, handle: &Shared<T>) -> SyncResult<usize> {
        self.enqueue_delete_remote(handle)?;
        self.flush_deletes().await
    }

    pub fn enqueue_delete_remote_collection<T: Persistent>(
        &self,
        handles: &[Shared<T>],
    ) -> SyncResult<usize> {
        for handle in handles {
            self.enqueue_delete_remote(handle)?;
        }
        Ok(handles.len())
    }

    pub async fn delete_remote_collection_async<T: Persistent>(
        &self,
        handles: &[Shared<T>],
    ) -> SyncResult<usize> {
        self.enqueue_delete_remote_collection(handles)?;
        self.flush_deletes().await
    }

    // ── Flush ────────────────────────────────────────────────────

    /// Sends staged writes. A no-op while paused.
    pub async fn flush_writes(&self) -> SyncResult<Vec<ObjectAck>> {
        if self.is_paused() {
            debug!("paused, write flush skipped");
            return Ok(Vec::new());
        }
        self.engine.process_write_queue().await
    }

    /// Sends staged deletes. A no-op while paused.
    pub async fn flush_deletes(&self) -> SyncResult<usize> {
        if self.is_paused() {
            debug!("paused, delete flush skipped");
            return Ok(0);
        }
        self.engine.process_delete_queue().await
    }

    /// Sends staged writes, then staged deletes.
    pub async fn flush(&self) -> SyncResult<FlushReport> {
        let written = self.flush_writes().await?;
        let deleted = self.flush_deletes().await?;
        Ok(FlushReport { written, deleted })
    }

    fn spawn_flush(&self, kind: FlushKind) -> Option<JoinHandle<()>> {
        if self.is_paused() {
            return None;
        }
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!(?kind, "no async runtime, staged entries wait for the next flush");
                return None;
            }
        };
        let engine = Arc::clone(&self.engine);
        Some(runtime.spawn(async move {
            let result = match kind {
                FlushKind::Writes => engine.process_write_queue().await.map(|acks| acks.len()),
                FlushKind::Deletes => engine.process_delete_queue().await,
            };
            if let Err(e) = result {
                error!(?kind, "background flush failed: {e}");
            }
        }))
    }

    // ── Remote reads ─────────────────────────────────────────────

    /// Fetches the remote copy of the record with `id`.
    ///
    /// An empty id reads the singleton record. The result is a detached
    /// value: it is neither cached nor saved locally.
    pub async fn load_remote_async<T: Persistent>(
        &self,
        id: &InstanceId,
        scope: ReadScope,
    ) -> SyncResult<Option<T>> {
        let id = InstanceId::or_singleton(Some(id.as_str()));
        let object = self.engine.read_object(&key_of::<T>(id), &scope).await?;
        object.map(|o| self.decode_remote(&o)).transpose()
    }

    /// Fetches the current user's remote copy of a live record.
    pub async fn reload_remote_async<T: Persistent>(
        &self,
        handle: &Shared<T>,
    ) -> SyncResult<Option<T>> {
        let id = handle.read().unwrap().instance_id().clone();
        self.load_remote_async::<T>(&id, ReadScope::Session).await
    }

    /// Fetches a shared system record.
    pub async fn load_remote_system<T: Persistent>(&self, id: &InstanceId) -> SyncResult<Option<T>> {
        self.load_remote_async::<T>(id, ReadScope::System).await
    }

    /// Fetches several shared system records in one round trip. Records that
    /// do not exist remotely are omitted.
    pub async fn load_remote_system_many<T: Persistent>(
        &self,
        ids: &[InstanceId],
    ) -> SyncResult<Vec<T>> {
        let objects = self
            .engine
            .read_objects(T::COLLECTION, ids, &ReadScope::System)
            .await?;
        objects.iter().map(|o| self.decode_remote(o)).collect()
    }

    /// Lists the current user's remote records of type `T`.
    ///
    /// The collection is fetched in one call; records are decoded as the
    /// stream is polled.
    pub async fn load_all_remote_async<T: Persistent>(
        &self,
    ) -> SyncResult<impl Stream<Item = SyncResult<T>> + '_> {
        let objects = self
            .engine
            .list_collection(T::COLLECTION, &ReadScope::Session)
            .await?;
        Ok(stream::iter(objects).map(move |object| self.decode_remote::<T>(&object)))
    }

    pub(crate) fn decode_remote<T: Persistent>(&self, object: &RemoteObject) -> SyncResult<T> {
        Ok(decode::<T>(self.local.codec(), &object.value)?)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("local", &self.local)
            .field("engine", &self.engine)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
enum FlushKind {
    Writes,
    Deletes,
}
