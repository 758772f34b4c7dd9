//! Pause gate and deferred command queue.
//!
//! While the gate is paused every save and delete entry point records a
//! [`PendingCommand`] instead of touching storage. Resuming hands the queued
//! commands back in enqueue order for the owner to replay.

use holdfast_types::EntityKey;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// A write or delete deferred while the gate was paused.
///
/// Save payloads are encoded when the command is enqueued, so replay writes
/// the state the record had at that moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PendingCommand {
    /// Write `payload` to the local store.
    SaveLocal { key: EntityKey, payload: String },
    /// Remove the record from the local store and the identity cache.
    DeleteLocal { key: EntityKey },
    /// Local save, then stage a remote write of `payload`.
    SaveRemote { key: EntityKey, payload: String },
    /// Local delete, then stage a remote delete.
    DeleteRemote { key: EntityKey },
}

impl PendingCommand {
    /// The identity this command acts on.
    pub fn key(&self) -> &EntityKey {
        match self {
            Self::SaveLocal { key, .. }
            | Self::DeleteLocal { key }
            | Self::SaveRemote { key, .. }
            | Self::DeleteRemote { key } => key,
        }
    }

    /// Returns true for commands that also stage remote work.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::SaveRemote { .. } | Self::DeleteRemote { .. })
    }
}

/// Administrative switch that defers writes into an ordered queue.
#[derive(Debug, Default)]
pub struct PauseGate {
    paused: AtomicBool,
    pending: Mutex<VecDeque<PendingCommand>>,
}

impl PauseGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts deferring writes.
    pub fn pause(&self) {
        if !self.paused.swap(true, Ordering::SeqCst) {
            info!("persistence paused");
        }
    }

    /// Returns true while writes are being deferred.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Queues a command for replay on resume.
    pub fn enqueue_edit(&self, command: PendingCommand) {
        debug!(key = %command.key(), ?command, "deferred while paused");
        self.pending.lock().unwrap().push_back(command);
    }

    /// Unpauses and takes every queued command, oldest first.
    ///
    /// Commands enqueued after this returns (for example because a replayed
    /// action paused the gate again) belong to the next resume.
    pub fn resume(&self) -> Vec<PendingCommand> {
        self.paused.store(false, Ordering::SeqCst);
        let drained: Vec<PendingCommand> = self.pending.lock().unwrap().drain(..).collect();
        info!(queued = drained.len(), "persistence resumed");
        drained
    }

    /// Number of commands waiting for resume.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}
