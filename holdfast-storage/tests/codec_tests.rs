use holdfast_storage::{EntityCodec, JsonCodec, StorageError, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Crate {
    id: String,
    slots: Vec<u8>,
}

#[test]
fn json_extension() {
    assert_eq!(JsonCodec::compact().extension(), "json");
}

#[test]
fn compact_is_single_line() {
    let text = encode(&JsonCodec::compact(), &Crate { id: "c".into(), slots: vec![1, 2] }).unwrap();
    assert!(!text.contains('\n'));
}

#[test]
fn pretty_is_indented() {
    let text = encode(&JsonCodec::pretty(), &Crate { id: "c".into(), slots: vec![1] }).unwrap();
    assert!(text.contains('\n'));
}

#[test]
fn decode_restores_value() {
    let codec = JsonCodec::compact();
    let original = Crate { id: "c".into(), slots: vec![3, 4] };
    let text = encode(&codec, &original).unwrap();
    let back: Crate = decode(&codec, &text).unwrap();
    assert_eq!(back, original);
}

#[test]
fn decode_rejects_wrong_shape() {
    let result: Result<Crate, _> = decode(&JsonCodec::compact(), r#"{"id":5}"#);
    assert!(matches!(result, Err(StorageError::Serialization(_))));
}

#[test]
fn decode_rejects_blank() {
    let result: Result<Crate, _> = decode(&JsonCodec::compact(), "   ");
    assert!(matches!(result, Err(StorageError::InvalidData(_))));
}
