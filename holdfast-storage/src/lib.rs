//! Local storage layer for holdfast.
//!
//! Provides durable per-record storage plus the in-process state that guards
//! it:
//!
//! - [`LocalStore`]: one file per record under `<root>/<collection>/`
//! - [`IdentityCache`]: at most one live instance per `(collection, id)`
//! - [`PauseGate`]: defers every write and delete while paused
//! - [`EntityCodec`]: injectable text encoding, [`JsonCodec`] by default
//! - [`DefaultData`]: built-in payloads used when nothing is stored yet

mod codec;
mod defaults;
mod error;
mod gate;
mod identity_cache;
mod local_store;

pub use codec::{EntityCodec, JsonCodec, decode, encode};
pub use defaults::DefaultData;
pub use error::{StorageError, StorageResult};
pub use gate::{PauseGate, PendingCommand};
pub use identity_cache::{IdentityCache, Shared, share};
pub use local_store::{LoadAll, LocalStore, LocalStoreConfig};
