//! Remote store backed by a mounted folder.
//!
//! Works with any synced or network-mounted directory (a cloud drive folder,
//! an NFS share) and doubles as a realistic backend for tests. Objects live at
//! `<root>/<namespace>/<owner>/<collection>/<key>.json`; system objects use
//! the owner folder `_system`.

use super::store::{
    ObjectAck, RemoteObject, RemoteStore, RemoteStoreConfig, Session, StorageDescriptor,
    WriteObject,
};
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use holdfast_types::{InstanceId, validate_instance_id};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tracing::{debug, info, warn};

const SYSTEM_OWNER: &str = "_system";
const EXTENSION: &str = "json";

/// Directory store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryRemoteConfig {
    /// The mounted folder. Must exist for the store to be reachable.
    pub root: PathBuf,
    /// User id the session is established for.
    pub user_id: String,
    /// Base remote store config.
    #[serde(flatten)]
    pub base: RemoteStoreConfig,
}

impl Default for DirectoryRemoteConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("holdfast-remote"),
            user_id: "local-user".to_string(),
            base: RemoteStoreConfig::default(),
        }
    }
}

/// Folder-backed remote store.
pub struct DirectoryRemoteStore {
    config: DirectoryRemoteConfig,
    session: Mutex<Option<Session>>,
}

impl DirectoryRemoteStore {
    pub fn new(config: DirectoryRemoteConfig) -> Self {
        Self {
            config,
            session: Mutex::new(None),
        }
    }

    fn namespace_path(&self) -> PathBuf {
        self.config.root.join(&self.config.base.namespace)
    }

    fn collection_path(&self, collection: &str, owner: Option<&str>) -> PathBuf {
        self.namespace_path()
            .join(owner.unwrap_or(SYSTEM_OWNER))
            .join(collection)
    }

    /// File holding one object. Keys that would resolve outside the
    /// collection folder are rejected.
    fn object_path(
        &self,
        collection: &str,
        key: &InstanceId,
        owner: Option<&str>,
    ) -> SyncResult<PathBuf> {
        validate_instance_id(key).map_err(|e| SyncError::Rejected(e.to_string()))?;
        Ok(self
            .collection_path(collection, owner)
            .join(format!("{key}.{EXTENSION}")))
    }

    /// Deterministic version tag derived from content.
    fn version_of(value: &str) -> String {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }

    fn ensure_reachable(&self) -> SyncResult<()> {
        if self.config.root.exists() {
            Ok(())
        } else {
            Err(SyncError::Network(format!(
                "remote folder not reachable: {}",
                self.config.root.display()
            )))
        }
    }

    async fn read_path(
        &self,
        path: &Path,
        collection: &str,
        key: InstanceId,
        owner: Option<&str>,
    ) -> SyncResult<Option<RemoteObject>> {
        let value = match fs::read_to_string(path).await {
            Ok(value) => value,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SyncError::Remote(format!("failed to read object: {e}"))),
        };
        Ok(Some(RemoteObject {
            collection: collection.to_string(),
            key,
            owner: owner.map(str::to_string),
            version: Self::version_of(&value),
            value,
        }))
    }
}

#[async_trait]
impl RemoteStore for DirectoryRemoteStore {
    fn provider_name(&self) -> &'static str {
        "Directory"
    }

    fn session(&self) -> Option<Session> {
        self.session.lock().unwrap().clone()
    }

    async fn authenticate(&self) -> SyncResult<Session> {
        if !self.config.root.exists() {
            return Err(SyncError::Auth(format!(
                "remote folder not found at {:?}; is it mounted?",
                self.config.root
            )));
        }

        fs::create_dir_all(self.namespace_path())
            .await
            .map_err(|e| SyncError::Remote(format!("failed to create namespace: {e}")))?;

        let session = Session::new(&self.config.user_id);
        *self.session.lock().unwrap() = Some(session.clone());
        info!(user_id = %session.user_id, root = ?self.config.root, "directory remote authenticated");
        Ok(session)
    }

    async fn has_connectivity(&self) -> bool {
        fs::metadata(&self.config.root).await.is_ok()
    }

    async fn read_objects(&self, ids: &[StorageDescriptor]) -> SyncResult<Vec<RemoteObject>> {
        self.ensure_reachable()?;
        let mut objects = Vec::with_capacity(ids.len());
        for id in ids {
            let owner = id.owner.as_deref();
            let path = self.object_path(&id.collection, &id.key, owner)?;
            if let Some(obj) = self
                .read_path(&path, &id.collection, id.key.clone(), owner)
                .await?
            {
                objects.push(obj);
            }
        }
        debug!(requested = ids.len(), found = objects.len(), "read objects");
        Ok(objects)
    }

    async fn list_objects(
        &self,
        collection: &str,
        owner: Option<&str>,
    ) -> SyncResult<Vec<RemoteObject>> {
        self.ensure_reachable()?;
        let dir = self.collection_path(collection, owner);
        let mut read_dir = match fs::read_dir(&dir).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SyncError::Remote(format!("failed to list collection: {e}"))),
        };

        let mut objects = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| SyncError::Remote(format!("failed to read directory entry: {e}")))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self
                .read_path(&path, collection, InstanceId::new(stem), owner)
                .await
            {
                Ok(Some(obj)) => objects.push(obj),
                Ok(None) => {}
                Err(e) => warn!("Skipping object due to error: {e}"),
            }
        }
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    async fn write_objects(
        &self,
        owner: &str,
        objects: &[WriteObject],
    ) -> SyncResult<Vec<ObjectAck>> {
        self.ensure_reachable()?;
        if let Some(too_big) = objects
            .iter()
            .find(|o| o.value.len() > self.config.base.max_object_size)
        {
            return Err(SyncError::Rejected(format!(
                "{}/{} exceeds {} bytes",
                too_big.collection, too_big.key, self.config.base.max_object_size
            )));
        }

        let mut acks = Vec::with_capacity(objects.len());
        for obj in objects {
            let path = self.object_path(&obj.collection, &obj.key, Some(owner))?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| SyncError::Remote(format!("failed to create folder: {e}")))?;
            }
            let tmp = path.with_extension(format!("{EXTENSION}.tmp"));
            fs::write(&tmp, &obj.value)
                .await
                .map_err(|e| SyncError::Remote(format!("failed to write object: {e}")))?;
            fs::rename(&tmp, &path)
                .await
                .map_err(|e| SyncError::Remote(format!("failed to commit object: {e}")))?;

            acks.push(ObjectAck {
                collection: obj.collection.clone(),
                key: obj.key.clone(),
                owner: Some(owner.to_string()),
                version: Self::version_of(&obj.value),
            });
        }
        debug!(count = acks.len(), "wrote objects");
        Ok(acks)
    }

    async fn delete_objects(&self, ids: &[StorageDescriptor]) -> SyncResult<()> {
        self.ensure_reachable()?;
        for id in ids {
            let path = self.object_path(&id.collection, &id.key, id.owner.as_deref())?;
            match fs::remove_file(&path).await {
                Ok(()) => debug!(path = ?path, "deleted object"),
                // Object doesn't exist - that's fine for delete
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(SyncError::Remote(format!("failed to delete object: {e}")));
                }
            }
        }
        Ok(())
    }
}
