//! Checkpoint management for hdfs-sync
//!
//! Provides durable tracking of "the last safely processed position" in a
//! changes feed, so a replication run can resume after a crash or restart.
//!
//! # Architecture
//!
//! - [`Sequence`] is the opaque feed position token. It is ordered by the
//!   feed, never interpreted here.
//! - [`CheckpointStore`] is the persistence trait: save fully overwrites the
//!   previous value, load returns `None` when no checkpoint exists yet.
//! - [`FileStore`] keeps the checkpoint in a single raw-text file and
//!   replaces it atomically (write-to-temp-then-rename), so a crash mid-save
//!   never leaves a torn checkpoint behind.
//! - [`MemoryStore`] is an in-process store for tests and dry runs.
//!
//! There is exactly one writer (the replication loop) and no transaction
//! spans multiple positions; only the latest value is ever kept.

mod file;
mod memory;
mod sequence;

#[cfg(test)]
mod tests;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sequence::Sequence;

use anyhow::Result;
use async_trait::async_trait;

/// Trait for checkpoint persistence backends.
///
/// A store holds at most one position. `save` must fully overwrite any prior
/// value, and a value returned by `load` must always be one that some earlier
/// `save` call completed with -- partially written state must never surface.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Durably persist `position`, replacing any previously saved value.
    async fn save(&self, position: &Sequence) -> Result<()>;

    /// Return the last saved position.
    ///
    /// Returns `None` if nothing has been saved yet.
    async fn load(&self) -> Result<Option<Sequence>>;
}
