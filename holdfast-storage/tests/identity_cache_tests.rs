mod common;

use common::{Settings, Tile};
use holdfast_storage::{IdentityCache, share};
use holdfast_types::{EntityKey, InstanceId};
use std::sync::Arc;

#[test]
fn miss_returns_none() {
    let cache = IdentityCache::new();
    assert!(cache.get_instance::<Tile>(&InstanceId::new("t1")).is_none());
    assert!(cache.is_empty());
}

#[test]
fn add_then_get_returns_same_instance() {
    let cache = IdentityCache::new();
    let tile = share(Tile::new("t1", 0, 0, "grass"));
    cache.add_reference(&tile);

    let found = cache.get_instance::<Tile>(&InstanceId::new("t1")).unwrap();
    assert!(Arc::ptr_eq(&tile, &found));
}

#[test]
fn add_is_idempotent() {
    let cache = IdentityCache::new();
    let tile = share(Tile::new("t1", 0, 0, "grass"));
    cache.add_reference(&tile);
    cache.add_reference(&tile);
    assert_eq!(cache.len(), 1);
}

#[test]
fn re_adding_identity_replaces_mapping() {
    let cache = IdentityCache::new();
    let first = share(Tile::new("t1", 0, 0, "grass"));
    let second = share(Tile::new("t1", 4, 4, "sand"));
    cache.add_reference(&first);
    cache.add_reference(&second);

    assert_eq!(cache.len(), 1);
    let found = cache.get_instance::<Tile>(&InstanceId::new("t1")).unwrap();
    assert!(Arc::ptr_eq(&second, &found));
}

#[test]
fn remove_after_add_leaves_no_trace() {
    let cache = IdentityCache::new();
    let tile = share(Tile::new("t1", 0, 0, "grass"));
    cache.add_reference(&tile);
    cache.remove_reference(&tile);

    assert!(cache.is_empty());
    assert!(cache.get_instance::<Tile>(&InstanceId::new("t1")).is_none());
}

#[test]
fn same_id_in_different_collections() {
    let cache = IdentityCache::new();
    let tile = share(Tile::new("Singleton", 0, 0, "grass"));
    let settings = share(Settings::default());
    cache.add_reference(&tile);
    cache.add_reference(&settings);

    assert_eq!(cache.len(), 2);
    let id = InstanceId::singleton();
    assert!(cache.get_instance::<Tile>(&id).is_some());
    assert_eq!(cache.get_instance::<Settings>(&id).unwrap().read().unwrap().volume, 50);
}

#[test]
fn remove_collection_only_touches_that_collection() {
    let cache = IdentityCache::new();
    cache.add_reference(&share(Tile::new("a", 0, 0, "grass")));
    cache.add_reference(&share(Tile::new("b", 1, 0, "grass")));
    cache.add_reference(&share(Settings::default()));

    assert_eq!(cache.collection_len("Tile"), 2);
    assert_eq!(cache.remove_collection_reference("Tile"), 2);
    assert_eq!(cache.collection_len("Tile"), 0);
    assert!(cache.contains(&EntityKey::new("Settings", "Singleton")));
}
