//! Commands behind the `holdfast` admin binary.
//!
//! Each command works on one record kind of the reference world schema and
//! runs against a [`Database`] backed by a mounted-folder remote.

use anyhow::{Context, Result};
use clap::ValueEnum;
use futures::TryStreamExt;
use holdfast_storage::{Shared, share};
use holdfast_sync::{
    Database, DatabaseConfig, DirectoryRemoteConfig, DirectoryRemoteStore, VerifyReport,
};
use holdfast_types::{InstanceId, Persistent};
use holdfast_world::{Craft, Harvester, House, Misc, Planter, Player, Tile, TutorialData};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Settings read from `--config` and overridden by flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub database: DatabaseConfig,
    pub remote: DirectoryRemoteConfig,
}

impl CliConfig {
    /// Reads a JSON config file, or returns the defaults when `path` is None.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Opens the database and its folder remote.
    pub fn open(self) -> Result<Database> {
        let remote = Arc::new(DirectoryRemoteStore::new(self.remote));
        Database::open(self.database, remote).context("Failed to open database")
    }
}

/// Record kinds the CLI knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    Tile,
    Planter,
    House,
    Harvester,
    Misc,
    Player,
    Craft,
    Tutorial,
}

impl Kind {
    pub fn collection(self) -> &'static str {
        match self {
            Kind::Tile => Tile::COLLECTION,
            Kind::Planter => Planter::COLLECTION,
            Kind::House => House::COLLECTION,
            Kind::Harvester => Harvester::COLLECTION,
            Kind::Misc => Misc::COLLECTION,
            Kind::Player => Player::COLLECTION,
            Kind::Craft => Craft::COLLECTION,
            Kind::Tutorial => TutorialData::COLLECTION,
        }
    }
}

/// Calls `$f::<T>($args..)` with `T` the record type for `$kind`.
macro_rules! dispatch {
    ($kind:expr, $f:ident($($arg:expr),*)) => {
        match $kind {
            Kind::Tile => $f::<Tile>($($arg),*).await,
            Kind::Planter => $f::<Planter>($($arg),*).await,
            Kind::House => $f::<House>($($arg),*).await,
            Kind::Harvester => $f::<Harvester>($($arg),*).await,
            Kind::Misc => $f::<Misc>($($arg),*).await,
            Kind::Player => $f::<Player>($($arg),*).await,
            Kind::Craft => $f::<Craft>($($arg),*).await,
            Kind::Tutorial => $f::<TutorialData>($($arg),*).await,
        }
    };
}

/// Ids stored locally for `kind`, sorted.
pub fn list(db: &Database, kind: Kind) -> Result<Vec<InstanceId>> {
    db.local()
        .instance_ids(kind.collection())
        .with_context(|| format!("Failed to list {}", kind.collection()))
}

/// Sends every local record of `kind` to the remote in one batch. Returns the
/// number of acknowledged writes.
pub async fn push(db: &Database, kind: Kind) -> Result<usize> {
    dispatch!(kind, push_all(db))
}

/// Copies every remote record of `kind` into the local store. Returns the
/// number of records written.
pub async fn pull(db: &Database, kind: Kind) -> Result<usize> {
    dispatch!(kind, pull_all(db))
}

/// Verifies every local record of `kind` against its stored and remote
/// copies.
pub async fn verify(db: &Database, kind: Kind) -> Result<Vec<VerifyReport>> {
    dispatch!(kind, verify_all(db))
}

/// Deletes every local record of `kind`, and the remote copies too when
/// `remote` is set. Returns the number of remote deletes sent.
pub async fn wipe(db: &Database, kind: Kind, remote: bool) -> Result<usize> {
    dispatch!(kind, wipe_all(db, remote))
}

fn local_records<T: Persistent>(db: &Database) -> Result<Vec<Shared<T>>> {
    db.load_all::<T>()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to load {}", T::COLLECTION))
}

async fn push_all<T: Persistent>(db: &Database) -> Result<usize> {
    let records = local_records::<T>(db)?;
    let acks = db
        .save_collection_remote_async(&records)
        .await
        .with_context(|| format!("Failed to push {}", T::COLLECTION))?;
    if acks.len() < records.len() {
        warn!(
            collection = T::COLLECTION,
            skipped = records.len() - acks.len(),
            "some records are not eligible for remote sync"
        );
    }
    info!(collection = T::COLLECTION, count = acks.len(), "pushed");
    Ok(acks.len())
}

async fn pull_all<T: Persistent>(db: &Database) -> Result<usize> {
    let records: Vec<T> = db
        .load_all_remote_async::<T>()
        .await
        .with_context(|| format!("Failed to fetch {}", T::COLLECTION))?
        .try_collect()
        .await
        .with_context(|| format!("Failed to decode {}", T::COLLECTION))?;

    let count = records.len();
    for record in records {
        let handle = match db.get_instance::<T>(record.instance_id()) {
            Some(live) => {
                *live.write().unwrap() = record;
                live
            }
            None => share(record),
        };
        db.save_local(&handle)
            .with_context(|| format!("Failed to store {}", T::COLLECTION))?;
    }
    info!(collection = T::COLLECTION, count, "pulled");
    Ok(count)
}

async fn verify_all<T: Persistent>(db: &Database) -> Result<Vec<VerifyReport>> {
    let mut reports = Vec::new();
    for handle in local_records::<T>(db)? {
        let report = db
            .verify(&handle)
            .await
            .with_context(|| format!("Failed to verify {}", T::COLLECTION))?;
        reports.push(report);
    }
    Ok(reports)
}

async fn wipe_all<T: Persistent>(db: &Database, remote: bool) -> Result<usize> {
    if !remote {
        db.delete_all_instances::<T>()
            .with_context(|| format!("Failed to wipe {}", T::COLLECTION))?;
        return Ok(0);
    }
    let records = local_records::<T>(db)?;
    let deleted = db
        .delete_remote_collection_async(&records)
        .await
        .with_context(|| format!("Failed to wipe remote {}", T::COLLECTION))?;
    db.delete_all_instances::<T>()
        .with_context(|| format!("Failed to wipe {}", T::COLLECTION))?;
    Ok(deleted)
}
