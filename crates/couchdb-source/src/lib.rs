//! CouchDB/Cloudant changes feed source for hdfs-sync
//!
//! Consumes the `_changes` endpoint of a CouchDB or Cloudant database as an
//! ordered, resumable stream of [`ChangeRecord`]s. Two feed modes are
//! supported:
//!
//! - **continuous**: follows the feed indefinitely, one JSON object per
//!   line, with server-side heartbeats so network idle time is never
//!   mistaken for stream termination.
//! - **normal**: a bounded replay of the current feed window that ends once
//!   the server reports `last_seq`.
//!
//! Records are validated once at this boundary; everything downstream sees a
//! single record shape carrying a sequence token, a document id, a deletion
//! flag, and an optional document body.

mod feed;
mod record;
mod stream;

pub use feed::{CouchdbOpts, CouchdbSource, FeedMode};
pub use record::ChangeRecord;
pub use stream::{BoundedStream, ContinuousStream};

use async_trait::async_trait;

/// Trait for an ordered stream of changes from the source database.
#[async_trait]
pub trait ChangeStream: Send {
    /// Get the next change record from the feed.
    ///
    /// Returns `None` when the feed is exhausted. Heartbeats are consumed
    /// internally and never surface here.
    async fn next(&mut self) -> Option<anyhow::Result<ChangeRecord>>;
}
