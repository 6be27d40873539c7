//! WebHDFS sink for hdfs-sync
//!
//! Writes replicated documents into HDFS through the WebHDFS REST gateway.
//! The sink surface is deliberately small: create a directory if absent, and
//! replace a file's contents wholesale. Both operations are idempotent, which
//! is what makes at-least-once redelivery from the replication loop safe.
//!
//! The core never reads from the sink.

mod client;

pub use client::WebHdfsClient;

use async_trait::async_trait;

/// Trait for the distributed-filesystem write boundary.
#[async_trait]
pub trait SinkWriter: Send + Sync {
    /// Create `path` (and missing parents) if it does not already exist.
    async fn ensure_dir(&self, path: &str) -> anyhow::Result<()>;

    /// Replace the full contents of the file at `path`.
    ///
    /// Writing the same path twice must converge to the same final state.
    async fn write_file(&self, path: &str, content: &[u8]) -> anyhow::Result<()>;
}
