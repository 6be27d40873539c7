//! WebHDFS REST client.

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::SinkWriter;

/// Client for the WebHDFS REST API of a Hadoop namenode.
///
/// File creation follows the two-step WebHDFS protocol: the namenode answers
/// the initial `CREATE` with a 307 redirect naming the datanode that will
/// accept the bytes, and the payload goes to that location in a second
/// request. Redirect following is disabled on the HTTP client so the
/// redirect can be handled explicitly.
pub struct WebHdfsClient {
    client: reqwest::Client,
    base_url: String,
    user: String,
}

impl WebHdfsClient {
    pub fn new(host: &str, port: u16, user: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("failed to build WebHDFS HTTP client")?;
        Ok(Self {
            client,
            base_url: format!("http://{host}:{port}/webhdfs/v1"),
            user: user.into(),
        })
    }

    /// Build the operation URL for an HDFS path.
    fn op_url(&self, path: &str, op: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        format!(
            "{}/{}?op={}&user.name={}",
            self.base_url, path, op, self.user
        )
    }
}

#[async_trait]
impl SinkWriter for WebHdfsClient {
    async fn ensure_dir(&self, path: &str) -> Result<()> {
        let url = self.op_url(path, "MKDIRS");
        let response = self
            .client
            .put(&url)
            .send()
            .await
            .with_context(|| format!("MKDIRS request failed for {path}"))?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("MKDIRS failed with status {status} for {path}");
        }
        tracing::debug!("ensured HDFS directory {}", path);
        Ok(())
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<()> {
        let url = format!("{}&overwrite=true", self.op_url(path, "CREATE"));
        let initial = self
            .client
            .put(&url)
            .send()
            .await
            .with_context(|| format!("CREATE request failed for {path}"))?;

        let status = initial.status();
        if !status.is_redirection() {
            anyhow::bail!("CREATE for {path} expected a redirect, got status {status}");
        }
        let location = initial
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .with_context(|| format!("CREATE redirect for {path} carried no location"))?;

        let upload = self
            .client
            .put(&location)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(content.to_vec())
            .send()
            .await
            .with_context(|| format!("datanode write failed for {path}"))?;
        let status = upload.status();
        if !status.is_success() {
            anyhow::bail!("datanode write failed with status {status} for {path}");
        }
        tracing::debug!("wrote {} bytes to {}", content.len(), path);
        Ok(())
    }
}
