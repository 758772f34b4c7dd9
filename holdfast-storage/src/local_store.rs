//! File-backed local store.
//!
//! Each record lives at `<root>/<collection>/<id>.<ext>`, derived purely from
//! its identity. All operations are synchronous; local disk is assumed fast.

use crate::codec::{self, EntityCodec, JsonCodec};
use crate::defaults::DefaultData;
use crate::error::{StorageError, StorageResult};
use crate::gate::{PauseGate, PendingCommand};
use crate::identity_cache::{IdentityCache, Shared, share};
use holdfast_types::{EntityKey, InstanceId, Persistent, key_of, validate_instance_id};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Configuration for the local store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStoreConfig {
    /// Directory holding one sub-directory per collection.
    pub root: PathBuf,
    /// Write indented JSON.
    #[serde(default)]
    pub pretty: bool,
}

impl Default for LocalStoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("holdfast-data"),
            pretty: false,
        }
    }
}

/// Durable per-record storage keyed by `(collection, id)`.
pub struct LocalStore {
    root: PathBuf,
    codec: Arc<dyn EntityCodec>,
    cache: Arc<IdentityCache>,
    gate: Arc<PauseGate>,
    defaults: DefaultData,
}

impl LocalStore {
    /// Opens a store with its own cache and gate, creating the root directory.
    pub fn open(config: LocalStoreConfig) -> StorageResult<Self> {
        let codec = if config.pretty {
            JsonCodec::pretty()
        } else {
            JsonCodec::compact()
        };
        Self::with_parts(
            config.root,
            Arc::new(codec),
            Arc::new(IdentityCache::new()),
            Arc::new(PauseGate::new()),
        )
    }

    /// Opens a store sharing an existing cache and gate.
    pub fn with_parts(
        root: impl Into<PathBuf>,
        codec: Arc<dyn EntityCodec>,
        cache: Arc<IdentityCache>,
        gate: Arc<PauseGate>,
    ) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            codec,
            cache,
            gate,
            defaults: DefaultData::empty(),
        })
    }

    /// Sets the built-in defaults consulted on a load miss.
    pub fn with_defaults(mut self, defaults: DefaultData) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache(&self) -> &Arc<IdentityCache> {
        &self.cache
    }

    pub fn gate(&self) -> &Arc<PauseGate> {
        &self.gate
    }

    pub fn codec(&self) -> &dyn EntityCodec {
        self.codec.as_ref()
    }

    // ── Paths ────────────────────────────────────────────────────

    /// Directory holding every record of `collection`.
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    /// File holding the record identified by `key`.
    pub fn file_path(&self, key: &EntityKey) -> PathBuf {
        self.collection_path(&key.collection)
            .join(format!("{}.{}", key.instance_id, self.codec.extension()))
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Returns true if a record of type `T` with `id` is stored locally.
    /// Ids that cannot name a record are never stored.
    pub fn exists<T: Persistent>(&self, id: &InstanceId) -> bool {
        validate_instance_id(id).is_ok() && self.file_path(&key_of::<T>(id.clone())).is_file()
    }

    /// Reads and decodes the stored record, bypassing the identity cache.
    ///
    /// Returns `Ok(None)` when nothing is stored. Decode failures surface as
    /// errors.
    pub fn read<T: Persistent>(&self, id: &InstanceId) -> StorageResult<Option<T>> {
        let key = key_of::<T>(id.clone());
        validate_instance_id(&key.instance_id)?;
        let path = self.file_path(&key);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        codec::decode(self.codec(), &text).map(Some)
    }

    /// Returns the live record for `id`, loading or creating it on a miss.
    ///
    /// Resolution order: identity cache, stored data, built-in default, then
    /// `T::default()` carrying `id`. Whatever is created on a miss is saved
    /// back immediately and registered, so the same miss never recurs.
    pub fn load<T: Persistent>(&self, id: &InstanceId) -> StorageResult<Shared<T>> {
        validate_instance_id(id)?;

        if let Some(handle) = self.cache.get_instance::<T>(id) {
            return Ok(handle);
        }

        let key = key_of::<T>(id.clone());
        let stored = match self.read::<T>(id) {
            Ok(stored) => stored,
            Err(e) => {
                error!(%key, "stored record unreadable, falling back to default: {e}");
                None
            }
        };

        let handle = match stored {
            Some(mut record) => {
                if record.instance_id() != id {
                    warn!(%key, stored = %record.instance_id(), "stored id does not match file name");
                    record.set_instance_id(id.clone());
                }
                share(record)
            }
            None => {
                let handle = share(self.fallback::<T>(&key));
                if let Err(e) = self.save(&handle) {
                    warn!(%key, "failed to persist fallback record: {e}");
                }
                handle
            }
        };

        self.cache.insert(key, &handle);
        Ok(handle)
    }

    /// Lazily loads every stored record of type `T`.
    ///
    /// Each call rescans the collection directory.
    pub fn load_all<T: Persistent>(&self) -> LoadAll<'_, T> {
        let entries = match fs::read_dir(self.collection_path(T::COLLECTION)) {
            Ok(entries) => Some(entries),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(collection = T::COLLECTION, "failed to scan collection: {e}");
                None
            }
        };
        LoadAll {
            store: self,
            entries,
            _marker: PhantomData,
        }
    }

    /// Lists the ids stored in `collection`, sorted.
    pub fn instance_ids(&self, collection: &str) -> StorageResult<Vec<InstanceId>> {
        let dir = self.collection_path(collection);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            if let Some(id) = self.record_id(&entry?.path()) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn record_id(&self, path: &Path) -> Option<InstanceId> {
        if !path.is_file() {
            return None;
        }
        let ext = path.extension()?.to_str()?;
        if ext != self.codec.extension() {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        Some(InstanceId::new(stem))
    }

    fn fallback<T: Persistent>(&self, key: &EntityKey) -> T {
        let mut record = match self.defaults.lookup(key, self.codec.extension()) {
            Some(text) => match codec::decode::<T>(self.codec(), &text) {
                Ok(record) => {
                    debug!(%key, "using built-in default");
                    record
                }
                Err(e) => {
                    warn!(%key, "built-in default unreadable: {e}");
                    T::default()
                }
            },
            None => {
                debug!(%key, "creating new record");
                T::default()
            }
        };
        record.set_instance_id(key.instance_id.clone());
        record
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Runs the record's save hook and encodes it.
    pub fn prepare_record<T: Persistent>(
        &self,
        handle: &Shared<T>,
    ) -> StorageResult<(EntityKey, String)> {
        let mut record = handle.write().unwrap();
        record.prepare_for_save();
        let key = record.key();
        validate_instance_id(&key.instance_id)?;
        let payload = codec::encode(self.codec(), &*record)?;
        Ok((key, payload))
    }

    /// Saves the record and registers it in the identity cache.
    ///
    /// While the gate is paused the encoded record is queued instead of
    /// written.
    pub fn save<T: Persistent>(&self, handle: &Shared<T>) -> StorageResult<()> {
        let (key, payload) = self.prepare_record(handle)?;
        self.cache.insert(key.clone(), handle);

        if self.gate.is_paused() {
            self.gate.enqueue_edit(PendingCommand::SaveLocal { key, payload });
            return Ok(());
        }

        self.write_payload(&key, &payload)
    }

    /// Writes an encoded record, creating the collection directory as needed.
    ///
    /// The payload goes to a temporary sibling first and is renamed into
    /// place, so readers never see a half-written record.
    pub fn write_payload(&self, key: &EntityKey, payload: &str) -> StorageResult<()> {
        let path = self.file_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension(format!("{}.tmp", self.codec.extension()));
        fs::write(&tmp_path, payload)?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        debug!(%key, bytes = payload.len(), "saved locally");
        Ok(())
    }

    // ── Deletes ──────────────────────────────────────────────────

    /// Deletes the record from disk and the identity cache.
    ///
    /// Returns true if a stored record was removed. Deleting a record that
    /// was never saved is a no-op.
    pub fn delete<T: Persistent>(&self, handle: &Shared<T>) -> StorageResult<bool> {
        let key = handle.read().unwrap().key();
        self.delete_key(&key)
    }

    /// Deletes the record of type `T` with `id`.
    pub fn delete_instance<T: Persistent>(&self, id: &InstanceId) -> StorageResult<bool> {
        self.delete_key(&key_of::<T>(id.clone()))
    }

    /// Deletes the record identified by `key`, deferring while paused.
    pub fn delete_key(&self, key: &EntityKey) -> StorageResult<bool> {
        validate_instance_id(&key.instance_id)?;
        if self.gate.is_paused() {
            self.gate
                .enqueue_edit(PendingCommand::DeleteLocal { key: key.clone() });
            return Ok(false);
        }
        self.remove_key(key)
    }

    /// Deletes every stored record of type `T`.
    pub fn delete_all_instances<T: Persistent>(&self) -> StorageResult<()> {
        self.delete_collection(T::COLLECTION)
    }

    /// Deletes every stored record in `collection`.
    ///
    /// While paused this degrades to one deferred delete per stored id so the
    /// queue keeps its ordering.
    pub fn delete_collection(&self, collection: &str) -> StorageResult<()> {
        if self.gate.is_paused() {
            for id in self.instance_ids(collection)? {
                self.gate.enqueue_edit(PendingCommand::DeleteLocal {
                    key: EntityKey::new(collection, id),
                });
            }
            return Ok(());
        }

        let evicted = self.cache.remove_collection_reference(collection);
        let dir = self.collection_path(collection);
        match fs::remove_dir_all(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        info!(collection, evicted, "deleted all local instances");
        Ok(())
    }

    fn remove_key(&self, key: &EntityKey) -> StorageResult<bool> {
        validate_instance_id(&key.instance_id)?;
        self.cache.remove(key);
        match fs::remove_file(self.file_path(key)) {
            Ok(()) => {
                debug!(%key, "deleted locally");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    // ── Replay ───────────────────────────────────────────────────

    /// Applies the local part of a deferred command without consulting the
    /// gate.
    pub fn apply(&self, command: &PendingCommand) -> StorageResult<()> {
        match command {
            PendingCommand::SaveLocal { key, payload }
            | PendingCommand::SaveRemote { key, payload } => self.write_payload(key, payload),
            PendingCommand::DeleteLocal { key } | PendingCommand::DeleteRemote { key } => {
                self.remove_key(key).map(|_| ())
            }
        }
    }

    /// Resumes the gate and replays deferred local commands in order.
    ///
    /// Remote commands only get their local half applied here; use the sync
    /// layer's resume to also stage them. Returns the number of commands that
    /// failed.
    pub fn resume(&self) -> usize {
        let mut failed = 0;
        for command in self.gate.resume() {
            if let Err(e) = self.apply(&command) {
                error!(key = %command.key(), "deferred command failed: {e}");
                failed += 1;
            }
        }
        failed
    }
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("root", &self.root)
            .field("cache", &self.cache)
            .field("paused", &self.gate.is_paused())
            .finish()
    }
}

/// Iterator returned by [`LocalStore::load_all`].
pub struct LoadAll<'a, T> {
    store: &'a LocalStore,
    entries: Option<fs::ReadDir>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Persistent> Iterator for LoadAll<'_, T> {
    type Item = StorageResult<Shared<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        let entries = self.entries.as_mut()?;
        loop {
            let entry = match entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(StorageError::Io(e))),
            };
            if let Some(id) = self.store.record_id(&entry.path()) {
                return Some(self.store.load::<T>(&id));
            }
        }
    }
}
