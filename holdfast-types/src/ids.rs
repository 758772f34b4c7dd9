//! Identifier types used throughout the holdfast core.
//!
//! Entities are addressed by a `(collection, instance id)` pair. Instance ids
//! are free-form strings; generated ids use UUID v7 so they sort by creation
//! time.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The id given to the only record of a single-record collection.
pub const SINGLETON_ID: &str = "Singleton";

/// Identifies one entity within its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// Wraps an existing id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The well-known id for single-record collections.
    #[must_use]
    pub fn singleton() -> Self {
        Self(SINGLETON_ID.to_string())
    }

    /// Generates a fresh, time-ordered unique id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Normalises an optional or empty id to the singleton id.
    pub fn or_singleton(id: Option<&str>) -> Self {
        match id {
            Some(s) if !s.is_empty() => Self::new(s),
            _ => Self::singleton(),
        }
    }

    /// Returns true if this is the singleton id.
    pub fn is_singleton(&self) -> bool {
        self.0 == SINGLETON_ID
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::singleton()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for InstanceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for InstanceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for InstanceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for InstanceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The full identity of an entity: collection name plus instance id.
///
/// Local store paths and remote storage keys are both derived from this pair
/// and never stored on the entity itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    pub collection: String,
    pub instance_id: InstanceId,
}

impl EntityKey {
    pub fn new(collection: impl Into<String>, instance_id: impl Into<InstanceId>) -> Self {
        Self {
            collection: collection.into(),
            instance_id: instance_id.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.instance_id)
    }
}
