//! Opaque changes-feed position token.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A position in the changes feed.
///
/// CouchDB 1.x reports sequences as integers while Cloudant and CouchDB 2.x+
/// report long opaque strings, so the token is kept as raw text and never
/// parsed numerically. Ordering is the feed's business; this type only
/// carries the value between the feed, the loop, and the checkpoint store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sequence(String);

impl Sequence {
    pub fn new(token: impl Into<String>) -> Self {
        Sequence(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Sequence {
    fn from(token: &str) -> Self {
        Sequence(token.to_string())
    }
}

impl Serialize for Sequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Sequence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Accept both the integer form (CouchDB 1.x) and the string form
        // (Cloudant, CouchDB 2.x+).
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::String(s) => Ok(Sequence(s)),
            serde_json::Value::Number(n) => Ok(Sequence(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "sequence must be a string or number, got: {other}"
            ))),
        }
    }
}
