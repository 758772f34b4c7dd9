//! Built-in default payloads.
//!
//! When a record has never been stored locally, the store looks here before
//! falling back to the type's zero value. Defaults can be registered in code
//! or shipped as a directory laid out like the local store
//! (`<dir>/<collection>/<id>.<ext>`).

use holdfast_types::{EntityKey, InstanceId};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Source of default payloads keyed by entity identity.
#[derive(Debug, Clone, Default)]
pub struct DefaultData {
    payloads: HashMap<EntityKey, String>,
    dir: Option<PathBuf>,
}

impl DefaultData {
    /// No defaults; every miss falls through to the zero value.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reads defaults from files under `dir`.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            payloads: HashMap::new(),
            dir: Some(dir.into()),
        }
    }

    /// Registers an in-memory default. Takes precedence over files.
    pub fn insert(
        &mut self,
        collection: impl Into<String>,
        id: impl Into<InstanceId>,
        payload: impl Into<String>,
    ) -> &mut Self {
        self.payloads
            .insert(EntityKey::new(collection, id), payload.into());
        self
    }

    /// Looks up the default payload for `key`.
    pub fn lookup(&self, key: &EntityKey, extension: &str) -> Option<String> {
        if let Some(payload) = self.payloads.get(key) {
            return Some(payload.clone());
        }
        let dir = self.dir.as_deref()?;
        read_default(dir, key, extension)
    }
}

fn read_default(dir: &Path, key: &EntityKey, extension: &str) -> Option<String> {
    let path = dir
        .join(&key.collection)
        .join(format!("{}.{extension}", key.instance_id));
    if !path.exists() {
        return None;
    }
    match fs::read_to_string(&path) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(%key, path = %path.display(), "failed to read default data: {e}");
            None
        }
    }
}
