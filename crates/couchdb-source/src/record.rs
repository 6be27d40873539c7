//! Change record type validated at the feed boundary.

use checkpoint::Sequence;
use serde::{Deserialize, Serialize};

/// One entry from the `_changes` feed.
///
/// Deletions and records without a body (feeds requested without
/// `include_docs`, or design documents filtered server-side) still carry a
/// valid sequence; the replication loop decides what to do with them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Position of this record in the feed.
    pub seq: Sequence,
    /// Identifier of the affected document.
    pub id: String,
    /// Whether this change records a deletion.
    #[serde(default)]
    pub deleted: bool,
    /// Full document body, present when the feed was requested with
    /// `include_docs=true` and the change is not a deletion.
    #[serde(default)]
    pub doc: Option<serde_json::Value>,
}
