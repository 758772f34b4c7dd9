//! Local/remote drift detection.
//!
//! Compares a live record against its stored local copy and its remote copy,
//! field by field. Findings are reported and logged; nothing is corrected.

use crate::database::Database;
use crate::error::SyncResult;
use crate::remote::ReadScope;
use holdfast_storage::Shared;
use holdfast_types::{EntityKey, FieldDiff, Persistent, StructuralEq};
use tracing::{debug, error, warn};

/// What [`Database::verify`] found for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub key: EntityKey,
    /// Fields where the stored local copy differs from the live record.
    pub local: Vec<FieldDiff>,
    /// No readable local copy exists.
    pub local_missing: bool,
    /// Fields where the remote copy differs from the live record.
    pub remote: Vec<FieldDiff>,
    /// No remote copy exists for the current user.
    pub remote_missing: bool,
}

impl VerifyReport {
    /// True when both copies exist and match the live record.
    pub fn is_consistent(&self) -> bool {
        !self.local_missing && !self.remote_missing && self.local.is_empty() && self.remote.is_empty()
    }
}

impl Database {
    /// Checks the live record against the local and remote copies.
    ///
    /// The local copy is read straight from disk, bypassing the identity
    /// cache. Remote read failures are returned; divergences are not errors.
    pub async fn verify<T: Persistent>(&self, handle: &Shared<T>) -> SyncResult<VerifyReport> {
        let key = handle.read().unwrap().key();

        let stored = match self.local().read::<T>(&key.instance_id) {
            Ok(stored) => stored,
            Err(e) => {
                error!(%key, "local copy unreadable: {e}");
                None
            }
        };
        let local_missing = stored.is_none();
        let local = stored
            .map(|stored| handle.read().unwrap().diff(&stored))
            .unwrap_or_default();

        let object = self
            .engine()
            .read_object(&key, &ReadScope::Session)
            .await?;
        let remote_missing = object.is_none();
        let remote = match object {
            Some(object) => {
                let copy: T = self.decode_remote(&object)?;
                handle.read().unwrap().diff(&copy)
            }
            None => Vec::new(),
        };

        let report = VerifyReport {
            key,
            local,
            local_missing,
            remote,
            remote_missing,
        };
        log_report(&report);
        Ok(report)
    }
}

fn log_report(report: &VerifyReport) {
    let key = &report.key;
    if report.local_missing {
        warn!(%key, "no local copy");
    }
    if report.remote_missing {
        warn!(%key, "no remote copy");
    }
    for diff in &report.local {
        error!(%key, field = %diff.field, memory = %diff.left, local = %diff.right, "local copy diverged");
    }
    for diff in &report.remote {
        error!(%key, field = %diff.field, memory = %diff.left, remote = %diff.right, "remote copy diverged");
    }
    if report.is_consistent() {
        debug!(%key, "local and remote copies match");
    }
}
