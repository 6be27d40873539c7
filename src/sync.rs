//! Checkpointed replication loop.
//!
//! This module is the core of hdfs-sync: it pulls change records off a feed
//! in arrival order, writes each surviving document into the sink as one
//! file, and tracks "how far replication has gotten" through a
//! [`CheckpointStore`].
//!
//! # Delivery contract
//!
//! Checkpointing is a point-in-time snapshot taken every `batch_size`
//! written records, not after every record. On a crash the run resumes from
//! the last saved position, so up to `batch_size - 1` already-written
//! documents may be re-delivered. Sink writes are full-file overwrites at a
//! path derived purely from the document id, so redelivery converges to the
//! same sink state: at-least-once delivery with idempotent writes.
//!
//! The invariant the loop maintains on every exit path is that the persisted
//! checkpoint never runs ahead of confirmed work: it is at most the sequence
//! of the last record whose sink write returned success.
//!
//! # Skip rule
//!
//! Deletions and records without a document body are skipped without
//! advancing the position. A long tail of deletions therefore leaves the
//! checkpoint behind the true feed position, and the feed must tolerate
//! being asked to resume from there; the re-offered records are deletions
//! and are skipped again on replay.

use checkpoint::{CheckpointStore, Sequence};
use hdfs_sync_couchdb_source::ChangeStream;
use hdfs_sync_webhdfs_sink::SinkWriter;

/// Default checkpoint cadence, in written records.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Errors terminating a replication run.
///
/// All three are fatal; the loop never retries. The last confirmed position
/// is flushed before any of these surface, except when flushing is itself
/// what failed.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The feed was unreachable or produced a malformed record.
    #[error("change source failed: {0}")]
    Source(anyhow::Error),
    /// A sink write failed; the in-flight record is not confirmed.
    #[error("sink write failed for {path}: {cause}")]
    Sink { path: String, cause: anyhow::Error },
    /// The checkpoint itself could not be persisted. Never masked by the
    /// error that triggered the flush, since losing the checkpoint defeats
    /// the resumption contract.
    #[error("checkpoint persistence failed: {0}")]
    Checkpoint(anyhow::Error),
}

/// Settings for a replication run.
#[derive(Debug, Clone)]
pub struct ReplicationConfig {
    /// Sink directory receiving one file per document.
    pub target_dir: String,
    /// Checkpoint cadence, in written records.
    pub batch_size: usize,
}

/// Summary of a run that drained its source cleanly.
#[derive(Debug)]
pub struct SyncOutcome {
    /// Documents written to the sink.
    pub written: u64,
    /// Records skipped (deleted or without a document body).
    pub skipped: u64,
    /// Final persisted position.
    pub checkpoint: Sequence,
}

/// Derive the sink path for a document id.
///
/// CouchDB allows `:` in document ids but HDFS does not, so every `:` is
/// swapped for `_`. The mapping is a pure function of the id, which is what
/// makes overwrites idempotent across replays.
pub fn artifact_path(target_dir: &str, document_id: &str) -> String {
    format!(
        "{}/{}.json",
        target_dir.trim_end_matches('/'),
        document_id.replace(':', "_")
    )
}

/// The checkpointed consume loop.
///
/// Owns the single in-memory position variable; the [`CheckpointStore`] is a
/// pure persistence mechanism and never interprets the value.
pub struct ReplicationLoop<'a> {
    sink: &'a dyn SinkWriter,
    store: &'a dyn CheckpointStore,
    config: ReplicationConfig,
    position: Sequence,
    written: u64,
    skipped: u64,
}

impl<'a> ReplicationLoop<'a> {
    /// Create a loop resuming from `start`.
    ///
    /// `start` is supplied by the caller (CLI flag or loaded checkpoint),
    /// never auto-discovered here.
    pub fn new(
        sink: &'a dyn SinkWriter,
        store: &'a dyn CheckpointStore,
        config: ReplicationConfig,
        start: Sequence,
    ) -> Self {
        let mut config = config;
        config.batch_size = config.batch_size.max(1);
        Self {
            sink,
            store,
            config,
            position: start,
            written: 0,
            skipped: 0,
        }
    }

    /// Consume `stream` to exhaustion or first error.
    ///
    /// Records are processed strictly sequentially: one record is fully
    /// handled (skipped or written, then possibly checkpointed) before the
    /// next is pulled. Returns the outcome of a clean drain, or the error
    /// that terminated the run after the last confirmed position was
    /// flushed.
    pub async fn run(mut self, mut stream: Box<dyn ChangeStream>) -> Result<SyncOutcome, SyncError> {
        while let Some(next) = stream.next().await {
            let record = match next {
                Ok(record) => record,
                Err(e) => return Err(self.fail(SyncError::Source(e)).await),
            };

            // Cadence snapshot: persist the position that was current before
            // this batch, including the starting position on the first
            // record.
            if self.written % self.config.batch_size as u64 == 0 {
                self.save_position().await?;
            }

            let doc = match &record.doc {
                Some(doc) if !record.deleted => doc,
                _ => {
                    tracing::debug!(
                        "skipping {} at {} (deleted or no document)",
                        record.id,
                        record.seq
                    );
                    self.skipped += 1;
                    continue;
                }
            };

            if let Err(e) = self.write_record(&record.id, &record.seq, doc).await {
                return Err(self.fail(e).await);
            }

            self.position = record.seq;
            self.written += 1;
        }

        // Clean drain: persist the final position once more.
        self.save_position().await?;
        tracing::info!(
            "replication drained: {} written, {} skipped, checkpoint {}",
            self.written,
            self.skipped,
            self.position
        );
        Ok(SyncOutcome {
            written: self.written,
            skipped: self.skipped,
            checkpoint: self.position,
        })
    }

    async fn write_record(
        &self,
        id: &str,
        seq: &Sequence,
        doc: &serde_json::Value,
    ) -> Result<(), SyncError> {
        let path = artifact_path(&self.config.target_dir, id);
        let content = serde_json::to_vec(doc)
            .map_err(|e| SyncError::Source(anyhow::Error::new(e).context("unserializable document")))?;

        tracing::info!("writing {} at {} as {}", id, seq, path);
        self.sink
            .write_file(&path, &content)
            .await
            .map_err(|cause| SyncError::Sink { path, cause })
    }

    async fn save_position(&self) -> Result<(), SyncError> {
        tracing::info!("recording checkpoint {}", self.position);
        self.store
            .save(&self.position)
            .await
            .map_err(SyncError::Checkpoint)
    }

    /// Flush the last confirmed position, then hand back `error`.
    ///
    /// If the flush itself fails, the checkpoint error takes precedence and
    /// the triggering error is logged instead of returned.
    async fn fail(&self, error: SyncError) -> SyncError {
        tracing::error!("replication failed, flushing checkpoint {}: {error}", self.position);
        match self.store.save(&self.position).await {
            Ok(()) => error,
            Err(checkpoint_error) => {
                tracing::error!("checkpoint flush failed while handling: {error}");
                SyncError::Checkpoint(checkpoint_error)
            }
        }
    }
}
