pub mod location;
pub mod parser;

pub use location::SourceLocation;
pub use parser::parse_watchlist_ids;

use anyhow::{Context, Result};
use std::io::Cursor;
use std::time::Duration;
use tracing::info;
use watchlist_sync_models::ImdbId;

/// Total budget for fetching a remote watchlist export
pub const WATCHLIST_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetch an IMDb watchlist export and return its title IDs in file order
pub async fn read_watchlist_ids(location: &SourceLocation) -> Result<Vec<ImdbId>> {
    let content = location
        .fetch(WATCHLIST_FETCH_TIMEOUT)
        .await
        .with_context(|| format!("Failed to read IMDb watchlist from {}", location))?;

    let ids = parse_watchlist_ids(Cursor::new(content))
        .with_context(|| format!("Failed to parse IMDb watchlist from {}", location))?;

    info!("Read {} IMDb IDs from watchlist", ids.len());
    Ok(ids)
}
