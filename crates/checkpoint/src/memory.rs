//! In-memory checkpoint storage for tests and dry runs.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;

use crate::{CheckpointStore, Sequence};

/// In-process implementation of the [`CheckpointStore`] trait.
///
/// Keeps every saved position so tests can assert on checkpoint cadence,
/// not just the final value.
#[derive(Default)]
pub struct MemoryStore {
    saves: Mutex<Vec<Sequence>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All positions saved so far, in save order.
    pub fn history(&self) -> Vec<Sequence> {
        self.saves.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckpointStore for MemoryStore {
    async fn save(&self, position: &Sequence) -> Result<()> {
        self.saves.lock().unwrap().push(position.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Sequence>> {
        Ok(self.saves.lock().unwrap().last().cloned())
    }
}
