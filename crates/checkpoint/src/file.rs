//! Filesystem-based checkpoint storage implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{CheckpointStore, Sequence};

/// Filesystem implementation of the [`CheckpointStore`] trait.
///
/// The checkpoint lives in a single well-known file whose entire contents are
/// the raw sequence token. Saves go through a temp file in the same directory
/// followed by a rename, so readers only ever observe a complete token.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a new FileStore persisting to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the checkpoint file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CheckpointStore for FileStore {
    async fn save(&self, position: &Sequence) -> Result<()> {
        // The temp file must live in the target directory so the rename
        // stays on one filesystem.
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temp checkpoint file in {}", dir.display()))?;
        tmp.write_all(position.as_str().as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error).with_context(|| {
            format!("failed to replace checkpoint file {}", self.path.display())
        })?;
        tracing::debug!("recorded checkpoint {} to {}", position, self.path.display());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Sequence>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(Sequence::new(token)))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| {
                format!("failed to read checkpoint file {}", self.path.display())
            }),
        }
    }
}
