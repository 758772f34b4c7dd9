//! Core type definitions for holdfast.
//!
//! This crate defines the fundamental, schema-agnostic pieces shared by the
//! storage and sync layers:
//! - Instance ids and `(collection, id)` entity keys
//! - The [`Persistent`] capability trait every stored record implements
//! - Structural equality ([`StructuralEq`], [`Comparison`], [`check_equality`])
//!
//! Concrete record layouts belong to the application, not here.

mod entity;
mod equality;
mod ids;

pub use entity::{Persistent, compare_identity, key_of};
pub use equality::{Comparison, FieldDiff, StructuralEq, check_equality, first_mismatch};
pub use ids::{EntityKey, InstanceId, SINGLETON_ID};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid instance id: {0}")]
    InvalidInstanceId(String),
}

/// Validates an instance id for use as a storage key.
///
/// Ids end up as file names and remote keys, so path separators and the
/// relative components `.`/`..` are rejected.
pub fn validate_instance_id(id: &InstanceId) -> Result<()> {
    let s = id.as_str();
    if s.is_empty() || s == "." || s == ".." || s.contains(['/', '\\', '\0']) {
        return Err(Error::InvalidInstanceId(s.to_string()));
    }
    Ok(())
}
