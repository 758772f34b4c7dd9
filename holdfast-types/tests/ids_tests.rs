use holdfast_types::{EntityKey, InstanceId, SINGLETON_ID, validate_instance_id};
use proptest::prelude::*;
use std::collections::HashSet;
use std::str::FromStr;

// ── InstanceId ────────────────────────────────────────────────────

#[test]
fn default_is_singleton() {
    let id = InstanceId::default();
    assert!(id.is_singleton());
    assert_eq!(id.as_str(), SINGLETON_ID);
}

#[test]
fn generated_ids_are_unique() {
    let a = InstanceId::generate();
    let b = InstanceId::generate();
    assert_ne!(a, b);
    assert!(!a.is_singleton());
}

#[test]
fn generated_ids_parse_as_uuid() {
    let id = InstanceId::generate();
    assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
}

#[test]
fn or_singleton_normalises_empty() {
    assert!(InstanceId::or_singleton(None).is_singleton());
    assert!(InstanceId::or_singleton(Some("")).is_singleton());
    assert_eq!(InstanceId::or_singleton(Some("abc")).as_str(), "abc");
}

#[test]
fn display_and_from_str() {
    let id = InstanceId::new("tile-7");
    assert_eq!(id.to_string(), "tile-7");
    assert_eq!(InstanceId::from_str("tile-7").unwrap(), id);
}

#[test]
fn hash_and_eq() {
    let mut set = HashSet::new();
    set.insert(InstanceId::new("a"));
    set.insert(InstanceId::from("a"));
    set.insert(InstanceId::from("b".to_string()));
    assert_eq!(set.len(), 2);
}

#[test]
fn serializes_transparently() {
    let id = InstanceId::new("Tutorial_intro");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, r#""Tutorial_intro""#);
}

// ── EntityKey ─────────────────────────────────────────────────────

#[test]
fn entity_key_display() {
    let key = EntityKey::new("Tile", "t1");
    assert_eq!(key.to_string(), "Tile/t1");
}

#[test]
fn entity_keys_differ_by_collection() {
    let a = EntityKey::new("Tile", "x");
    let b = EntityKey::new("House", "x");
    assert_ne!(a, b);
}

// ── Validation ────────────────────────────────────────────────────

#[test]
fn rejects_path_like_ids() {
    for bad in ["", ".", "..", "a/b", "a\\b"] {
        assert!(validate_instance_id(&InstanceId::new(bad)).is_err(), "{bad:?}");
    }
}

#[test]
fn accepts_ordinary_ids() {
    validate_instance_id(&InstanceId::singleton()).unwrap();
    validate_instance_id(&InstanceId::generate()).unwrap();
    validate_instance_id(&InstanceId::new("PurchasedInventoryItem_Shovel")).unwrap();
}

proptest! {
    #[test]
    fn json_roundtrip(s in "[A-Za-z0-9_-]{1,40}") {
        let id = InstanceId::new(s);
        let json = serde_json::to_string(&id).unwrap();
        let back: InstanceId = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, id);
    }
}
