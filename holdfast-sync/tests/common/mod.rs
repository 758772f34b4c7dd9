#![allow(dead_code)]

use holdfast_storage::{Shared, share};
use holdfast_sync::mock::MemoryRemoteStore;
use holdfast_sync::{Database, DatabaseConfig, RemoteStore};
use holdfast_world::{Tile, ToolType};
use std::sync::Arc;
use tempfile::TempDir;

pub const USER: &str = "player-1";

/// A database over a temp dir and an in-memory remote.
pub fn open_db() -> (TempDir, Arc<MemoryRemoteStore>, Database) {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(MemoryRemoteStore::new(USER));
    let mut config = DatabaseConfig::default();
    config.local.root = dir.path().join("data");
    let db = Database::open(config, remote.clone() as Arc<dyn RemoteStore>).unwrap();
    (dir, remote, db)
}

/// A tile on island 0, so it is eligible for remote sync.
pub fn placed_tile(x: i32, y: i32, tool_type: ToolType) -> Shared<Tile> {
    let mut tile = Tile::new(x, y, tool_type);
    tile.placement.island_index = 0;
    share(tile)
}
