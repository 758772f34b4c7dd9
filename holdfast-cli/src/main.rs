//! holdfast admin tool
//!
//! Inspects a local holdfast data directory and syncs it with a folder
//! remote (a mounted share or synced drive).
//!
//! Usage:
//!   holdfast --data-dir ./data --remote-dir /mnt/share list tile
//!   holdfast --config holdfast.json push house

use anyhow::Result;
use clap::{Parser, Subcommand};
use holdfast_cli::{CliConfig, Kind};
use std::path::PathBuf;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "holdfast")]
#[command(about = "Inspect and sync holdfast data")]
struct Args {
    /// JSON config file (flags override its values)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Local data directory
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Folder acting as the remote store
    #[arg(short, long)]
    remote_dir: Option<PathBuf>,

    /// User id that owns remote records
    #[arg(short, long)]
    user: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List locally stored ids
    List { kind: Kind },
    /// Send every local record to the remote
    Push { kind: Kind },
    /// Copy every remote record into the local store
    Pull { kind: Kind },
    /// Compare live, local and remote copies
    Verify { kind: Kind },
    /// Delete every local record
    Wipe {
        kind: Kind,
        /// Delete the remote copies too
        #[arg(long)]
        remote: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let mut config = CliConfig::load(args.config.as_deref())?;
    if let Some(dir) = args.data_dir {
        config.database.local.root = dir;
    }
    if let Some(dir) = args.remote_dir {
        config.remote.root = dir;
    }
    if let Some(user) = args.user {
        config.remote.user_id = user;
    }
    let db = config.open()?;

    match args.command {
        Command::List { kind } => {
            for id in holdfast_cli::list(&db, kind)? {
                println!("{id}");
            }
        }
        Command::Push { kind } => {
            let count = holdfast_cli::push(&db, kind).await?;
            info!("Pushed {count} {}", kind.collection());
        }
        Command::Pull { kind } => {
            let count = holdfast_cli::pull(&db, kind).await?;
            info!("Pulled {count} {}", kind.collection());
        }
        Command::Verify { kind } => {
            let reports = holdfast_cli::verify(&db, kind).await?;
            let drifted = reports.iter().filter(|r| !r.is_consistent()).count();
            for report in reports.iter().filter(|r| !r.is_consistent()) {
                println!("{}", report.key);
                if report.local_missing {
                    println!("  local:  missing");
                }
                if report.remote_missing {
                    println!("  remote: missing");
                }
                for diff in &report.local {
                    println!("  local:  {diff}");
                }
                for diff in &report.remote {
                    println!("  remote: {diff}");
                }
            }
            if drifted > 0 {
                warn!("{drifted} of {} records drifted", reports.len());
            } else {
                info!("All {} records consistent", reports.len());
            }
        }
        Command::Wipe { kind, remote } => {
            let deleted = holdfast_cli::wipe(&db, kind, remote).await?;
            info!("Wiped {} ({deleted} remote deletes)", kind.collection());
        }
    }

    Ok(())
}
