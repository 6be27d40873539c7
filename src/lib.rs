//! hdfs-sync Library
//!
//! A library for replicating documents from a CouchDB/Cloudant `_changes`
//! feed into HDFS, one file per document, with crash-resilient resumption.
//!
//! # Features
//!
//! - Checkpointed feed consumption: the last safely processed sequence is
//!   persisted to a local file and used to resume after restarts
//! - At-least-once delivery: sink writes are idempotent full-file overwrites,
//!   so re-processing after a crash converges to the same state
//! - Continuous and bounded feed modes with heartbeat keep-alives
//! - WebHDFS REST sink with idempotent directory creation
//!
//! # CLI Usage
//!
//! ```bash
//! # Follow a Cloudant changes feed into HDFS, resuming from .checkpoint
//! hdfs-sync \
//!   --source-url https://account.cloudant.com --database database1 \
//!   --hdfs-host namenode --hdfs-port 50070 \
//!   --hdfs-path /user/test/fromcouch
//!
//! # Bounded replay from an explicit sequence
//! hdfs-sync --feed normal --since 1234-g1AAAA... \
//!   --source-url http://localhost:5984 --database database1 \
//!   --hdfs-path /user/test/fromcouch
//! ```

use clap::Parser;

pub mod config;
pub mod sync;

// Re-export source and sink crates for convenience
pub use hdfs_sync_couchdb_source as couchdb;
pub use hdfs_sync_webhdfs_sink as webhdfs;

use hdfs_sync_couchdb_source::FeedMode;

#[derive(Parser, Clone)]
pub struct SourceOpts {
    /// CouchDB/Cloudant base URL
    #[arg(long, env = "COUCHDB_URL")]
    pub source_url: String,

    /// Name of the source database
    #[arg(long)]
    pub database: String,

    /// Changes feed mode
    #[arg(long, value_enum, default_value = "continuous")]
    pub feed: FeedMode,

    /// Heartbeat interval for the continuous feed, in milliseconds
    #[arg(long, default_value = "10000")]
    pub heartbeat_ms: u64,
}

#[derive(Parser, Clone)]
pub struct HdfsOpts {
    /// HDFS namenode host
    #[arg(long, default_value = "localhost", env = "HDFS_HOST")]
    pub hdfs_host: String,

    /// WebHDFS port on the namenode
    #[arg(long, default_value = "50070", env = "HDFS_PORT")]
    pub hdfs_port: u16,

    /// Target HDFS directory, e.g. `/user/test/fromcouch`
    #[arg(long)]
    pub hdfs_path: String,
}
