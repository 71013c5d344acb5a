use crate::error::ConfigError;
use crate::paths::PathManager;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub const MAX_PAGE_SIZE: usize = 100;
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// On-disk TOML layout. Every key is optional; flags and env vars win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub imdb: ImdbSection,
    #[serde(default)]
    pub plex: PlexSection,
    #[serde(default)]
    pub resolver: ResolverSection,
    #[serde(default)]
    pub sync: SyncSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImdbSection {
    pub watchlist_url: Option<String>,
}

/// No password key: the account password is only accepted from a
/// flag, the environment or an interactive prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlexSection {
    pub token: Option<String>,
    pub username: Option<String>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolverSection {
    pub strategy: Option<ResolverKind>,
    pub index_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncSection {
    pub dry_run: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    /// Batched Wikidata SPARQL query
    #[default]
    Sparql,
    /// Bulk-downloaded Parquet index
    Index,
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverKind::Sparql => f.write_str("sparql"),
            ResolverKind::Index => f.write_str("index"),
        }
    }
}

impl FromStr for ResolverKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sparql" | "wikidata" => Ok(ResolverKind::Sparql),
            "index" | "parquet" => Ok(ResolverKind::Index),
            _ => Err(ConfigError::UnknownResolver(s.to_string())),
        }
    }
}

impl FileConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load an explicitly requested file (must exist) or the default one
    /// (silently skipped when absent).
    pub fn locate(explicit: Option<&Path>, paths: Option<&PathManager>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            debug!("Loading config from {}", path.display());
            return Self::load_from_file(path);
        }

        match paths.map(PathManager::config_file) {
            Some(path) if path.exists() => {
                debug!("Loading config from {}", path.display());
                Self::load_from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// Values coming from CLI flags, with clap having already folded in the
/// environment. `None` falls through to the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub watchlist_url: Option<String>,
    pub plex_token: Option<String>,
    pub plex_username: Option<String>,
    pub plex_password: Option<String>,
    pub resolver: Option<ResolverKind>,
    pub index_url: Option<String>,
    pub page_size: Option<usize>,
    pub dry_run: bool,
}

/// How to authenticate against Plex
#[derive(Clone, PartialEq, Eq)]
pub enum PlexAuth {
    Token(String),
    /// `password` is `None` when it still has to be asked for
    Account { username: String, password: Option<String> },
}

impl fmt::Debug for PlexAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlexAuth::Token(_) => f.write_str("Token(***)"),
            PlexAuth::Account { username, password } => f
                .debug_struct("Account")
                .field("username", username)
                .field("password", &password.as_ref().map(|_| "***"))
                .finish(),
        }
    }
}

/// Fully merged and validated settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub watchlist_url: String,
    pub auth: PlexAuth,
    pub resolver: ResolverKind,
    pub index_url: Option<String>,
    pub page_size: usize,
    pub dry_run: bool,
}

impl Settings {
    /// Merge flags/env over the file config and validate the result
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<Self, ConfigError> {
        let watchlist_url = first_present(overrides.watchlist_url, file.imdb.watchlist_url)
            .ok_or(ConfigError::MissingWatchlistSource)?;

        let token = first_present(overrides.plex_token, file.plex.token);
        let username = first_present(overrides.plex_username, file.plex.username);
        let auth = match (token, username) {
            (Some(token), _) => PlexAuth::Token(token),
            (None, Some(username)) => PlexAuth::Account {
                username,
                password: non_empty(overrides.plex_password),
            },
            (None, None) => return Err(ConfigError::MissingCredentials),
        };

        let resolver = overrides.resolver.or(file.resolver.strategy).unwrap_or_default();
        let index_url = first_present(overrides.index_url, file.resolver.index_url);
        if resolver == ResolverKind::Index && index_url.is_none() {
            return Err(ConfigError::MissingIndexLocation);
        }

        let page_size = overrides.page_size.or(file.plex.page_size).unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ConfigError::InvalidPageSize {
                value: page_size,
                max: MAX_PAGE_SIZE,
            });
        }

        let dry_run = overrides.dry_run || file.sync.dry_run.unwrap_or(false);

        Ok(Self {
            watchlist_url,
            auth,
            resolver,
            index_url,
            page_size,
            dry_run,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Empty strings (an exported but blank env var) count as unset
fn first_present(preferred: Option<String>, fallback: Option<String>) -> Option<String> {
    non_empty(preferred).or_else(|| non_empty(fallback))
}
