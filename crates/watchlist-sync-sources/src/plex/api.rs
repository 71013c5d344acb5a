use crate::error::SourceError;
use crate::http::{build_client, send_checked, DEFAULT_CONNECT_TIMEOUT};
use crate::traits::{WatchlistAction, WatchlistPage, WatchlistTransport};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const DISCOVER_BASE_URL: &str = "https://discover.provider.plex.tv";
pub const PLEX_PROVIDER_VERSION: &str = "7.2.0";
pub const PLEX_CLIENT_IDENTIFIER: &str = "imdb-plex-sync";
pub const PLEX_PRODUCT: &str = "imdb-plex-sync";
pub const PLEX_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct PlexResponse {
    #[serde(rename = "MediaContainer")]
    media_container: MediaContainer,
}

#[derive(Debug, Deserialize)]
struct MediaContainer {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<MetadataEntry>,
}

#[derive(Debug, Deserialize)]
struct MetadataEntry {
    #[serde(rename = "ratingKey")]
    rating_key: Option<Value>,
    title: Option<String>,
}

/// Headers every Plex request carries
pub(crate) fn plex_headers(token: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        let mut value = HeaderValue::from_str(token).context("Invalid token format")?;
        value.set_sensitive(true);
        headers.insert(HeaderName::from_static("x-plex-token"), value);
    }
    headers.insert(
        HeaderName::from_static("x-plex-provider-version"),
        HeaderValue::from_static(PLEX_PROVIDER_VERSION),
    );
    headers.insert(
        HeaderName::from_static("x-plex-client-identifier"),
        HeaderValue::from_static(PLEX_CLIENT_IDENTIFIER),
    );
    headers.insert(
        HeaderName::from_static("x-plex-product"),
        HeaderValue::from_static(PLEX_PRODUCT),
    );
    Ok(headers)
}

/// HTTP transport for the Plex Discover watchlist endpoints
pub struct PlexDiscoverApi {
    client: Client,
    base_url: String,
}

impl PlexDiscoverApi {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, DISCOVER_BASE_URL)
    }

    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        let client = build_client(
            PLEX_REQUEST_TIMEOUT,
            DEFAULT_CONNECT_TIMEOUT,
            plex_headers(Some(token))?,
        )?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

fn rating_key_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl WatchlistTransport for PlexDiscoverApi {
    async fn fetch_page(&self, start: usize, size: usize) -> Result<WatchlistPage> {
        let url = format!("{}/library/sections/watchlist/all", self.base_url);
        let request = self
            .client
            .get(&url)
            .header("X-Plex-Container-Start", start.to_string())
            .header("X-Plex-Container-Size", size.to_string());

        let body = send_checked(request, &url)
            .await?
            .text()
            .await
            .context("Failed to read watchlist response")?;

        let parsed: PlexResponse = serde_json::from_str(&body)
            .map_err(|e| SourceError::malformed(&url, e.to_string()))?;

        let metadata = parsed.media_container.metadata;
        let item_count = metadata.len();
        let mut rating_keys = Vec::with_capacity(item_count);
        for (idx, entry) in metadata.into_iter().enumerate() {
            match entry.rating_key.as_ref().and_then(rating_key_string) {
                Some(key) => rating_keys.push(key),
                None => debug!(
                    "Plex watchlist item[{}] ({:?}) has no ratingKey, skipping",
                    start + idx,
                    entry.title
                ),
            }
        }

        debug!(start, size, item_count, "Fetched Plex watchlist page");
        Ok(WatchlistPage {
            item_count,
            rating_keys,
        })
    }

    async fn put_action(&self, action: WatchlistAction, rating_key: &str) -> Result<Value> {
        let url = format!(
            "{}/actions/{}?ratingKey={}",
            self.base_url,
            action.endpoint(),
            urlencoding::encode(rating_key)
        );

        let body = send_checked(self.client.put(&url), &url)
            .await?
            .text()
            .await
            .with_context(|| format!("Failed to read {} response", action.endpoint()))?;

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        let value = serde_json::from_str(&body)
            .map_err(|e| SourceError::malformed(&url, e.to_string()))?;
        Ok(value)
    }
}
