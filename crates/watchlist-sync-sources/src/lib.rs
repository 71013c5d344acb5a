pub mod error;
pub mod http;
pub mod imdb;
pub mod plex;
pub mod plex_index;
pub mod traits;
pub mod wikidata;

pub use error::SourceError;
pub use imdb::{read_watchlist_ids, SourceLocation};
pub use plex::{PlexDiscoverApi, PlexWatchlistClient};
pub use traits::{WatchlistPage, WatchlistService, WatchlistTransport};
