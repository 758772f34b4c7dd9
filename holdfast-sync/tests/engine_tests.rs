use holdfast_sync::mock::MemoryRemoteStore;
use holdfast_sync::{Connectivity, ReadScope, RemoteStore, SyncConfig, SyncEngine, SyncError};
use holdfast_types::{EntityKey, InstanceId};
use std::sync::Arc;

fn engine_with(config: SyncConfig) -> (Arc<MemoryRemoteStore>, SyncEngine) {
    let remote = Arc::new(MemoryRemoteStore::new("player-1"));
    let engine = SyncEngine::new(remote.clone() as Arc<dyn RemoteStore>, config);
    (remote, engine)
}

fn engine() -> (Arc<MemoryRemoteStore>, SyncEngine) {
    engine_with(SyncConfig::default())
}

// ── Config ──────────────────────────────────────────────────────

#[test]
fn sync_config_default() {
    let cfg = SyncConfig::default();
    assert!(cfg.requeue_on_failure);
    assert_eq!(cfg.descriptor_pool_capacity, 4);
}

#[test]
fn sync_config_fills_missing_fields() {
    let cfg: SyncConfig = serde_json::from_str(r#"{"requeue_on_failure":false}"#).unwrap();
    assert!(!cfg.requeue_on_failure);
    assert_eq!(cfg.descriptor_pool_capacity, 4);
}

// ── Write flush ─────────────────────────────────────────────────

#[tokio::test]
async fn empty_queue_makes_no_remote_call() {
    let (remote, engine) = engine();
    assert!(engine.process_write_queue().await.unwrap().is_empty());
    assert_eq!(engine.process_delete_queue().await.unwrap(), 0);
    assert_eq!(remote.stats().write_batches, 0);
    assert_eq!(remote.stats().delete_batches, 0);
    assert_eq!(remote.stats().authentications, 0);
}

#[tokio::test]
async fn staged_writes_flush_in_one_batch() {
    let (remote, engine) = engine();
    for i in 0..5 {
        engine.stage_write(EntityKey::new("Tile", format!("t{i}")), format!("{{\"n\":{i}}}"));
    }
    assert_eq!(engine.pending_writes(), 5);

    let acks = engine.process_write_queue().await.unwrap();
    assert_eq!(acks.len(), 5);
    assert_eq!(engine.pending_writes(), 0);
    assert_eq!(remote.stats().write_batches, 1);
    assert_eq!(remote.get("Tile", "t3", Some("player-1")).as_deref(), Some("{\"n\":3}"));
    assert_eq!(engine.connection().state(), Connectivity::Online);
}

#[tokio::test]
async fn later_write_of_same_key_wins() {
    let (remote, engine) = engine();
    engine.stage_write(EntityKey::new("Tile", "a"), "first".into());
    engine.stage_write(EntityKey::new("Tile", "a"), "second".into());
    engine.process_write_queue().await.unwrap();
    assert_eq!(remote.get("Tile", "a", Some("player-1")).as_deref(), Some("second"));
}

#[tokio::test]
async fn offline_write_flips_connectivity_and_requeues() {
    let (remote, engine) = engine();
    engine.process_write_queue().await.unwrap();
    engine.stage_write(EntityKey::new("Tile", "a"), "1".into());
    remote.set_offline(true);

    let err = engine.process_write_queue().await.unwrap_err();
    assert!(matches!(err, SyncError::Network(_)));
    assert_eq!(engine.connection().state(), Connectivity::Offline);
    assert_eq!(engine.pending_writes(), 1);

    remote.set_offline(false);
    let acks = engine.process_write_queue().await.unwrap();
    assert_eq!(acks.len(), 1);
    assert_eq!(engine.connection().state(), Connectivity::Online);
}

#[tokio::test]
async fn rejection_keeps_connectivity_online() {
    let (remote, engine) = engine();
    engine.session().await.unwrap();
    engine.stage_write(EntityKey::new("Tile", "a"), "1".into());
    remote.fail_next(1);

    let err = engine.process_write_queue().await.unwrap_err();
    assert!(matches!(err, SyncError::Rejected(_)));
    assert_eq!(engine.connection().state(), Connectivity::Online);
}

#[tokio::test]
async fn failed_batch_dropped_when_requeue_disabled() {
    let (remote, engine) = engine_with(SyncConfig {
        requeue_on_failure: false,
        ..Default::default()
    });
    engine.stage_write(EntityKey::new("Tile", "a"), "1".into());
    remote.set_offline(true);

    assert!(engine.process_write_queue().await.is_err());
    assert_eq!(engine.pending_writes(), 0);
}

#[tokio::test]
async fn failed_batch_stays_ahead_of_newer_writes() {
    let (remote, engine) = engine();
    engine.stage_write(EntityKey::new("Tile", "a"), "old".into());
    remote.set_offline(true);
    assert!(engine.process_write_queue().await.is_err());

    engine.stage_write(EntityKey::new("Tile", "a"), "new".into());
    remote.set_offline(false);
    engine.process_write_queue().await.unwrap();
    assert_eq!(remote.get("Tile", "a", Some("player-1")).as_deref(), Some("new"));
}

// ── Delete flush ────────────────────────────────────────────────

#[tokio::test]
async fn staged_deletes_use_session_owner() {
    let (remote, engine) = engine();
    remote.put("Tile", "a", Some("player-1"), "1");
    remote.put("Tile", "b", Some("player-1"), "2");
    remote.put("Tile", "a", None, "system copy");

    engine.stage_delete(EntityKey::new("Tile", "a"));
    engine.stage_delete(EntityKey::new("Tile", "b"));
    assert_eq!(engine.process_delete_queue().await.unwrap(), 2);

    assert_eq!(remote.stats().delete_batches, 1);
    assert!(remote.get("Tile", "a", Some("player-1")).is_none());
    assert_eq!(remote.get("Tile", "a", None).as_deref(), Some("system copy"));
}

#[tokio::test]
async fn descriptors_return_to_pool_on_failure() {
    let (remote, engine) = engine();
    engine.session().await.unwrap();
    engine.stage_delete(EntityKey::new("Tile", "a"));
    remote.fail_next(1);

    assert!(engine.process_delete_queue().await.is_err());
    assert_eq!(engine.descriptor_pool().outstanding(), 0);
    assert_eq!(engine.descriptor_pool().available(), 1);
    assert_eq!(engine.pending_deletes(), 1);
}

// ── Same-record ordering ────────────────────────────────────────

#[test]
fn staged_delete_cancels_pending_write() {
    let (_remote, engine) = engine();
    engine.stage_write(EntityKey::new("Tile", "a"), "1".into());
    engine.stage_write(EntityKey::new("Tile", "b"), "2".into());
    engine.stage_delete(EntityKey::new("Tile", "a"));

    assert_eq!(engine.pending_writes(), 1);
    assert_eq!(engine.pending_deletes(), 1);
}

#[test]
fn staged_write_cancels_pending_delete() {
    let (_remote, engine) = engine();
    engine.stage_delete(EntityKey::new("Tile", "a"));
    engine.stage_delete(EntityKey::new("House", "a"));
    engine.stage_write(EntityKey::new("Tile", "a"), "1".into());

    assert_eq!(engine.pending_writes(), 1);
    assert_eq!(engine.pending_deletes(), 1);
}

// ── Session ─────────────────────────────────────────────────────

#[tokio::test]
async fn session_is_reused_until_dropped() {
    let (remote, engine) = engine();
    engine.session().await.unwrap();
    engine.session().await.unwrap();
    assert_eq!(remote.stats().authentications, 1);

    remote.expire_session();
    let session = engine.session().await.unwrap();
    assert_eq!(session.user_id, "player-1");
    assert_eq!(remote.stats().authentications, 2);
}

#[tokio::test]
async fn offline_authentication_marks_offline() {
    let (remote, engine) = engine();
    remote.set_offline(true);
    assert!(engine.session().await.is_err());
    assert!(engine.connection().is_offline());
}

// ── Reads ───────────────────────────────────────────────────────

#[tokio::test]
async fn read_scopes_select_owner() {
    let (remote, engine) = engine();
    remote.put("Player", "Singleton", Some("player-1"), "mine");
    remote.put("Player", "Singleton", Some("player-2"), "theirs");
    remote.put("Player", "Singleton", None, "system");
    let key = EntityKey::new("Player", InstanceId::singleton());

    let mine = engine.read_object(&key, &ReadScope::Session).await.unwrap();
    assert_eq!(mine.unwrap().value, "mine");
    let theirs = engine
        .read_object(&key, &ReadScope::User("player-2".into()))
        .await
        .unwrap();
    assert_eq!(theirs.unwrap().value, "theirs");
    let system = engine.read_object(&key, &ReadScope::System).await.unwrap();
    assert_eq!(system.unwrap().value, "system");
}

#[tokio::test]
async fn system_reads_need_no_session() {
    let (remote, engine) = engine();
    remote.put("Config", "Singleton", None, "{}");
    let key = EntityKey::new("Config", InstanceId::singleton());
    assert!(engine.read_object(&key, &ReadScope::System).await.unwrap().is_some());
    assert_eq!(remote.stats().authentications, 0);
}

#[tokio::test]
async fn batched_read_is_one_round_trip() {
    let (remote, engine) = engine();
    for id in ["a", "b", "c"] {
        remote.put("Item", id, None, id);
    }
    let ids: Vec<InstanceId> = ["a", "c", "zzz"].into_iter().map(InstanceId::from).collect();
    let objects = engine
        .read_objects("Item", &ids, &ReadScope::System)
        .await
        .unwrap();
    assert_eq!(objects.len(), 2);
    assert_eq!(remote.stats().read_batches, 1);
    assert_eq!(engine.descriptor_pool().outstanding(), 0);
}

#[tokio::test]
async fn list_collection_failure_marks_offline() {
    let (remote, engine) = engine();
    remote.set_offline(true);
    let err = engine
        .list_collection("Tile", &ReadScope::System)
        .await
        .unwrap_err();
    assert!(err.is_connectivity_failure());
    assert_eq!(engine.connection().state(), Connectivity::Offline);
}
