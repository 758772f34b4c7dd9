use crate::equality::{Comparison, StructuralEq};
use crate::ids::{EntityKey, InstanceId};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A record type that can be loaded, saved and deleted independently.
///
/// Implementors provide the capability set the persistence layer needs:
/// a unique identity within a named collection, serde encoding, and
/// structural equality. `Default` supplies the zero-value used when neither
/// stored data nor a built-in default exists.
///
/// Implementations of [`StructuralEq::compare_fields`] should include the
/// identity via [`compare_identity`] so that records with different ids never
/// compare equal.
pub trait Persistent:
    StructuralEq + Serialize + DeserializeOwned + Default + Send + Sync + 'static
{
    /// Name of the collection holding every record of this type.
    const COLLECTION: &'static str;

    /// Returns this record's instance id.
    fn instance_id(&self) -> &InstanceId;

    /// Replaces this record's instance id.
    fn set_instance_id(&mut self, id: InstanceId);

    /// Returns the full identity of this record.
    fn key(&self) -> EntityKey {
        EntityKey::new(Self::COLLECTION, self.instance_id().clone())
    }

    /// Returns false to keep this record out of remote synchronization.
    /// Local saves are unaffected.
    fn should_sync_remote(&self) -> bool {
        true
    }

    /// Called immediately before every local save.
    fn prepare_for_save(&mut self) {}
}

/// Compares the identity of two records. Intended as the first line of every
/// `compare_fields` implementation on a [`Persistent`] type.
pub fn compare_identity<T: Persistent>(left: &T, right: &T, cmp: &mut Comparison) {
    cmp.field("instance_id", left.instance_id(), right.instance_id());
}

/// Returns the key a record of type `T` with the given id lives under.
pub fn key_of<T: Persistent>(id: impl Into<InstanceId>) -> EntityKey {
    EntityKey::new(T::COLLECTION, id)
}
