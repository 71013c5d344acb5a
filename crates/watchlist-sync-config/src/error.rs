use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("No IMDb watchlist source configured (set --imdb-watchlist-url or IMDB_WATCHLIST_URL)")]
    MissingWatchlistSource,

    #[error("No Plex credentials configured (set PLEX_TOKEN, or PLEX_USERNAME with PLEX_PASSWORD)")]
    MissingCredentials,

    #[error("The index resolver needs an index location (set --plex-index-url or PLEX_INDEX_URL)")]
    MissingIndexLocation,

    #[error("Page size must be between 1 and {max}, got {value}")]
    InvalidPageSize { value: usize, max: usize },

    #[error("Unknown resolver '{0}', expected 'sparql' or 'index'")]
    UnknownResolver(String),
}
