//! Remote object stores for sync.
//!
//! The engine only talks to the [`RemoteStore`] trait; the directory backend
//! here and the in-memory [`crate::mock`] store are the bundled
//! implementations.

pub mod directory;
pub mod store;

pub use directory::{DirectoryRemoteConfig, DirectoryRemoteStore};
pub use store::{
    ObjectAck, ReadScope, RemoteObject, RemoteStore, RemoteStoreConfig, Session,
    StorageDescriptor, WriteObject,
};
