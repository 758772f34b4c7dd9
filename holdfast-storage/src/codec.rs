//! Pluggable encoding of records to and from text.

use crate::error::{StorageError, StorageResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Converts records to and from their stored text form.
///
/// Works on `serde_json::Value` so the trait stays object safe; the typed
/// helpers [`encode`] and [`decode`] do the serde step on either side.
pub trait EntityCodec: Send + Sync {
    /// File extension (without the dot) used for locally stored records.
    fn extension(&self) -> &str;

    /// Renders a value as text.
    fn encode_value(&self, value: &Value) -> StorageResult<String>;

    /// Parses text produced by [`EntityCodec::encode_value`].
    fn decode_value(&self, text: &str) -> StorageResult<Value>;
}

/// Encodes a record with the given codec.
pub fn encode<T: Serialize>(codec: &dyn EntityCodec, record: &T) -> StorageResult<String> {
    let value = serde_json::to_value(record)?;
    codec.encode_value(&value)
}

/// Decodes a record with the given codec.
pub fn decode<T: DeserializeOwned>(codec: &dyn EntityCodec, text: &str) -> StorageResult<T> {
    let value = codec.decode_value(text)?;
    Ok(serde_json::from_value(value)?)
}

/// JSON text codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Compact single-line output.
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    /// Indented output, easier to inspect on disk.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl EntityCodec for JsonCodec {
    fn extension(&self) -> &str {
        "json"
    }

    fn encode_value(&self, value: &Value) -> StorageResult<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }

    fn decode_value(&self, text: &str) -> StorageResult<Value> {
        if text.trim().is_empty() {
            return Err(StorageError::InvalidData("empty payload".into()));
        }
        Ok(serde_json::from_str(text)?)
    }
}
