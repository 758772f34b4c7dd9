#![allow(dead_code)]

use holdfast_storage::{LocalStore, LocalStoreConfig};
use holdfast_types::{Comparison, InstanceId, Persistent, StructuralEq, compare_identity};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tile {
    pub instance_id: InstanceId,
    pub position: (i32, i32),
    pub kind: String,
    #[serde(default)]
    pub saves: u32,
}

impl Tile {
    pub fn new(id: &str, x: i32, y: i32, kind: &str) -> Self {
        Self {
            instance_id: InstanceId::new(id),
            position: (x, y),
            kind: kind.into(),
            saves: 0,
        }
    }
}

impl StructuralEq for Tile {
    fn compare_fields(&self, other: &Self, cmp: &mut Comparison) {
        compare_identity(self, other, cmp);
        cmp.field("position", &self.position, &other.position)
            .field("kind", &self.kind, &other.kind);
    }
}

impl Persistent for Tile {
    const COLLECTION: &'static str = "Tile";

    fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    fn set_instance_id(&mut self, id: InstanceId) {
        self.instance_id = id;
    }

    fn prepare_for_save(&mut self) {
        self.saves += 1;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub instance_id: InstanceId,
    pub volume: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            instance_id: InstanceId::singleton(),
            volume: 50,
        }
    }
}

impl StructuralEq for Settings {
    fn compare_fields(&self, other: &Self, cmp: &mut Comparison) {
        compare_identity(self, other, cmp);
        cmp.field("volume", &self.volume, &other.volume);
    }
}

impl Persistent for Settings {
    const COLLECTION: &'static str = "Settings";

    fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    fn set_instance_id(&mut self, id: InstanceId) {
        self.instance_id = id;
    }
}

pub fn open_store() -> (TempDir, LocalStore) {
    let dir = TempDir::new().unwrap();
    let store = LocalStore::open(LocalStoreConfig {
        root: dir.path().join("data"),
        pretty: false,
    })
    .unwrap();
    (dir, store)
}
