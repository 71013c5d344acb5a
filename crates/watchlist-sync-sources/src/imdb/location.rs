use crate::http::{build_client, send_checked, DEFAULT_CONNECT_TIMEOUT};
use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::header::HeaderMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Where a downloadable input lives: a local file or an HTTP(S) URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Local(PathBuf),
    Remote(String),
}

impl SourceLocation {
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            SourceLocation::Remote(value.to_string())
        } else {
            SourceLocation::Local(PathBuf::from(value))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, SourceLocation::Remote(_))
    }

    /// Read the whole content. Remote fetches fail on unreachable hosts,
    /// on exceeding `timeout`, or on a non-2xx status.
    pub async fn fetch(&self, timeout: Duration) -> Result<Bytes> {
        match self {
            SourceLocation::Local(path) => {
                debug!("Reading local file '{}'", path.display());
                let content = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Ok(Bytes::from(content))
            }
            SourceLocation::Remote(url) => {
                debug!("Fetching remote '{}'", url);
                let client = build_client(timeout, DEFAULT_CONNECT_TIMEOUT, HeaderMap::new())?;
                let response = send_checked(client.get(url.as_str()), url).await?;
                let content = response
                    .bytes()
                    .await
                    .with_context(|| format!("Failed to download body of {}", url))?;
                debug!("Fetched {} bytes from '{}'", content.len(), url);
                Ok(content)
            }
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Local(path) => write!(f, "{}", path.display()),
            SourceLocation::Remote(url) => f.write_str(url),
        }
    }
}
