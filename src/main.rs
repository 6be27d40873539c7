//! Command-line interface for hdfs-sync
//!
//! # Usage Examples
//!
//! ```bash
//! # Follow a Cloudant changes feed into HDFS, resuming from the checkpoint
//! # file if present
//! hdfs-sync \
//!   --source-url https://account.cloudant.com --database database1 \
//!   --hdfs-host namenode --hdfs-path /user/test/fromcouch
//!
//! # Start from an explicit sequence, overriding the checkpoint file
//! hdfs-sync --since 1234-g1AAAA... \
//!   --source-url http://localhost:5984 --database database1 \
//!   --hdfs-path /user/test/fromcouch
//!
//! # Bounded replay of the current feed window
//! hdfs-sync --feed normal \
//!   --source-url http://localhost:5984 --database database1 \
//!   --hdfs-path /user/test/fromcouch
//! ```
//!
//! Credentials for both services are read from a TOML file, by default
//! `$HOME/.hdfs-sync.toml` (see `hdfs_sync::config`).
//!
//! The process exits 0 on a clean drain of the feed and non-zero on any
//! unrecoverable error, after the last confirmed checkpoint has been
//! flushed. Recovery is operational: restart, and the run resumes from the
//! checkpoint file.

use anyhow::Context;
use checkpoint::{CheckpointStore, FileStore, Sequence};
use clap::Parser;
use hdfs_sync::config;
use hdfs_sync::couchdb::{CouchdbOpts, CouchdbSource};
use hdfs_sync::sync::{ReplicationConfig, ReplicationLoop, DEFAULT_BATCH_SIZE};
use hdfs_sync::webhdfs::{SinkWriter, WebHdfsClient};
use hdfs_sync::{HdfsOpts, SourceOpts};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hdfs-sync")]
#[command(about = "Replicate a CouchDB/Cloudant changes feed into HDFS")]
#[command(long_about = None)]
struct Cli {
    #[command(flatten)]
    source: SourceOpts,

    #[command(flatten)]
    hdfs: HdfsOpts,

    /// Sequence token to resume from, overriding the checkpoint file
    #[arg(long)]
    since: Option<String>,

    /// Local file holding the last safely processed sequence
    #[arg(long, default_value = ".checkpoint")]
    checkpoint_file: PathBuf,

    /// Number of written documents between checkpoint saves
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Credentials file (default: $HOME/.hdfs-sync.toml)
    #[arg(long)]
    credentials_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let credentials_path = match &cli.credentials_file {
        Some(path) => path.clone(),
        None => config::default_credentials_path()?,
    };
    let credentials = config::load_credentials(&credentials_path)?;

    // Resolve the starting position: explicit flag, then checkpoint file,
    // then the beginning of the feed.
    let store = FileStore::new(&cli.checkpoint_file);
    let start = match cli.since {
        Some(seq) => {
            tracing::info!("starting from --since {seq}");
            Sequence::new(seq)
        }
        None => match store.load().await? {
            Some(seq) => {
                tracing::info!(
                    "resuming from checkpoint {} in {}",
                    seq,
                    cli.checkpoint_file.display()
                );
                seq
            }
            None => {
                tracing::info!("no checkpoint found, starting from the beginning of the feed");
                Sequence::new("0")
            }
        },
    };

    let source = CouchdbSource::new(CouchdbOpts {
        url: cli.source.source_url.clone(),
        database: cli.source.database.clone(),
        username: credentials.couchdb.as_ref().map(|c| c.username.clone()),
        password: credentials.couchdb.as_ref().map(|c| c.password.clone()),
        heartbeat_ms: cli.source.heartbeat_ms,
    })?;

    let sink = WebHdfsClient::new(
        &cli.hdfs.hdfs_host,
        cli.hdfs.hdfs_port,
        credentials.webhdfs.user.clone(),
    )?;
    sink.ensure_dir(&cli.hdfs.hdfs_path)
        .await
        .with_context(|| format!("failed to create HDFS directory {}", cli.hdfs.hdfs_path))?;

    let stream = source.changes(&start, cli.source.feed).await?;

    let replication = ReplicationLoop::new(
        &sink,
        &store,
        ReplicationConfig {
            target_dir: cli.hdfs.hdfs_path.clone(),
            batch_size: cli.batch_size,
        },
        start,
    );

    let outcome = replication.run(stream).await?;
    tracing::info!(
        "done: {} written, {} skipped, checkpoint {}",
        outcome.written,
        outcome.skipped,
        outcome.checkpoint
    );
    Ok(())
}
