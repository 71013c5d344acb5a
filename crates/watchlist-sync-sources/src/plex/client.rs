use crate::error::SourceError;
use crate::traits::{WatchlistAction, WatchlistService, WatchlistTransport};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info};
use watchlist_sync_models::{KeyEncoding, RatingKey};

/// Upper bound the Discover API honours for `X-Plex-Container-Size`
pub const MAX_PAGE_SIZE: usize = 100;

/// Plex Discover watchlist: paginated read plus add/remove by rating key
pub struct PlexWatchlistClient<T> {
    transport: T,
    page_size: usize,
}

impl<T: WatchlistTransport> PlexWatchlistClient<T> {
    /// `page_size` is clamped to `1..=MAX_PAGE_SIZE`
    pub fn new(transport: T, page_size: usize) -> Self {
        Self {
            transport,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn mutate(&self, action: WatchlistAction, key: &RatingKey) -> Result<()> {
        if key.encoding() != self.key_encoding() {
            anyhow::bail!(
                "Refusing to {} {} key {}: watchlist expects {} keys",
                action.endpoint(),
                key.encoding(),
                key,
                self.key_encoding()
            );
        }

        let body = self
            .transport
            .put_action(action, key.as_str())
            .await
            .with_context(|| format!("{} failed for {}", action.endpoint(), key))?;

        if !is_truthy(&body) {
            return Err(SourceError::NotAcknowledged {
                action: action.endpoint(),
                key: key.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// A response body counts as an acknowledgement when it carries any content
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[async_trait]
impl<T: WatchlistTransport> WatchlistService for PlexWatchlistClient<T> {
    fn key_encoding(&self) -> KeyEncoding {
        KeyEncoding::Hex
    }

    async fn read(&self) -> Result<HashSet<RatingKey>> {
        let mut keys = HashSet::new();
        let mut start = 0;
        let mut pages = 0;

        loop {
            let page = self
                .transport
                .fetch_page(start, self.page_size)
                .await
                .with_context(|| format!("Failed to fetch Plex watchlist page at offset {}", start))?;
            pages += 1;

            for raw in &page.rating_keys {
                let key = RatingKey::parse(self.key_encoding(), raw)
                    .context("Plex watchlist returned an unexpected rating key")?;
                keys.insert(key);
            }

            if page.item_count < self.page_size {
                break;
            }
            start += page.item_count;
        }

        debug!(pages, page_size = self.page_size, "Plex watchlist pagination complete");
        info!("Plex watchlist has {} items", keys.len());
        Ok(keys)
    }

    async fn add(&self, key: &RatingKey) -> Result<()> {
        self.mutate(WatchlistAction::Add, key).await
    }

    async fn remove(&self, key: &RatingKey) -> Result<()> {
        self.mutate(WatchlistAction::Remove, key).await
    }
}
