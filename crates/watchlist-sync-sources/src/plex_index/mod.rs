pub mod table;

pub use table::{decode_index, IndexRow, IMDB_NUMERIC_ID_COLUMN, KEY_COLUMN};

use crate::imdb::SourceLocation;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

/// The index is a bulk download, allow it far more time than API calls
pub const INDEX_FETCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Download (or read) the precomputed IMDb -> Plex index and decode its rows
pub async fn load_index(location: &SourceLocation) -> Result<Vec<IndexRow>> {
    let content = location
        .fetch(INDEX_FETCH_TIMEOUT)
        .await
        .with_context(|| format!("Failed to fetch Plex index from {}", location))?;

    let rows = decode_index(content)
        .with_context(|| format!("Failed to decode Plex index from {}", location))?;
    info!("Loaded {} rows from Plex index", rows.len());
    Ok(rows)
}
