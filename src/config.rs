//! Credential file loading.
//!
//! Credentials for both remote services live in a single TOML file, by
//! default `$HOME/.hdfs-sync.toml`:
//!
//! ```toml
//! [couchdb]
//! username = "account"
//! password = "secret"
//!
//! [webhdfs]
//! user = "hadoop"          # user with rwx rights in HDFS
//! ```
//!
//! The `[couchdb]` section is optional for servers in admin-party mode.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub couchdb: Option<CouchdbCredentials>,
    pub webhdfs: WebhdfsCredentials,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CouchdbCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhdfsCredentials {
    /// HDFS user name passed as `user.name` on every WebHDFS request.
    pub user: String,
}

/// Default credentials location: `$HOME/.hdfs-sync.toml`.
pub fn default_credentials_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set; pass --credentials-file")?;
    Ok(PathBuf::from(home).join(".hdfs-sync.toml"))
}

/// Load and parse the credentials file at `path`.
pub fn load_credentials(path: &Path) -> Result<Credentials> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read credentials file {}", path.display()))?;
    let credentials: Credentials = toml::from_str(&contents)
        .with_context(|| format!("failed to parse credentials file {}", path.display()))?;
    Ok(credentials)
}
