//! Remote sync for holdfast.
//!
//! Layers a remote object store on top of the local store so records stay
//! usable offline and reach the remote in batches once connectivity allows.
//!
//! ## Components
//!
//! - **Remote**: the [`RemoteStore`] contract plus a mounted-folder backend
//! - **Engine**: staging queues flushed as one batch per round trip, with
//!   connectivity tracking on every remote call
//! - **Database**: the context object tying local store, identity cache,
//!   pause gate and engine together
//! - **Verify**: on-demand comparison of a live record with its local and
//!   remote copies
//!
//! # Example
//!
//! ```
//! use holdfast_sync::mock::MemoryRemoteStore;
//! use holdfast_sync::{Database, DatabaseConfig};
//! use std::sync::Arc;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut config = DatabaseConfig::default();
//! config.local.root = dir.path().join("data");
//!
//! let db = Database::open(config, Arc::new(MemoryRemoteStore::new("player-1"))).unwrap();
//! assert!(!db.is_paused());
//! ```

mod connectivity;
mod database;
mod engine;
mod error;
pub mod mock;
mod pool;
mod queue;
pub mod remote;
mod verify;

pub use connectivity::{ConnectionMonitor, Connectivity};
pub use database::{Database, DatabaseConfig, FlushReport, ResumeReport};
pub use engine::{SyncConfig, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use pool::{ObjectPool, Pooled, Recycle};
pub use queue::StagingQueue;
pub use remote::{
    DirectoryRemoteConfig, DirectoryRemoteStore, ObjectAck, ReadScope, RemoteObject, RemoteStore,
    RemoteStoreConfig, Session, StorageDescriptor, WriteObject,
};
pub use verify::VerifyReport;
