use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use watchlist_sync_models::{KeyEncoding, RatingKey};

/// One page of the remote watchlist as returned by the transport
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchlistPage {
    /// Number of entries the server returned, including ones without a key
    pub item_count: usize,
    pub rating_keys: Vec<String>,
}

/// Mutations understood by the watchlist API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchlistAction {
    Add,
    Remove,
}

impl WatchlistAction {
    pub fn endpoint(self) -> &'static str {
        match self {
            WatchlistAction::Add => "addToWatchlist",
            WatchlistAction::Remove => "removeFromWatchlist",
        }
    }
}

/// Raw request layer beneath a watchlist client
#[async_trait]
pub trait WatchlistTransport: Send + Sync {
    async fn fetch_page(&self, start: usize, size: usize) -> Result<WatchlistPage>;

    /// Issue a mutation and return the decoded response body
    async fn put_action(&self, action: WatchlistAction, rating_key: &str) -> Result<Value>;
}

/// The remote watchlist as a set of rating keys
#[async_trait]
pub trait WatchlistService: Send + Sync {
    /// Encoding of the rating keys this service reads and accepts
    fn key_encoding(&self) -> KeyEncoding;

    async fn read(&self) -> Result<HashSet<RatingKey>>;
    async fn add(&self, key: &RatingKey) -> Result<()>;
    async fn remove(&self, key: &RatingKey) -> Result<()>;
}
