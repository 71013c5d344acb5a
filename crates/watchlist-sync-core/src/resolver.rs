use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};
use watchlist_sync_models::{ImdbId, KeyEncoding, RatingKey, ResolutionMapping};
use watchlist_sync_sources::plex_index::{load_index, IndexRow};
use watchlist_sync_sources::wikidata::{SparqlBinding, WikidataClient};
use watchlist_sync_sources::SourceLocation;

/// A way of turning IMDb IDs into Plex rating keys.
///
/// Implementations receive a de-duplicated, non-empty batch and must only
/// return mappings for IDs in that batch. Failing to reach the backing data
/// is an error, never an empty result.
#[async_trait]
pub trait ResolutionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Encoding of the rating keys this strategy produces
    fn key_encoding(&self) -> KeyEncoding;

    async fn resolve(&self, ids: &[ImdbId]) -> Result<ResolutionMapping>;
}

/// First occurrence of each ID, in input order
pub fn dedupe_ids(ids: &[ImdbId]) -> Vec<ImdbId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().filter(|id| seen.insert(*id)).cloned().collect()
}

/// Resolve a batch through `strategy` and report coverage.
///
/// The returned mapping is ordered like the first occurrences in `ids`, holds
/// only requested IDs, and never more entries than distinct requested IDs.
/// Partial coverage is a warning; a failing lookup is an error.
pub async fn resolve_ids(strategy: &dyn ResolutionStrategy, ids: &[ImdbId]) -> Result<ResolutionMapping> {
    let requested = dedupe_ids(ids);
    if requested.is_empty() {
        debug!("No IMDb IDs to resolve");
        return Ok(ResolutionMapping::new());
    }
    if requested.len() < ids.len() {
        debug!("Ignoring {} duplicate IMDb IDs in watchlist", ids.len() - requested.len());
    }

    let found = strategy
        .resolve(&requested)
        .await
        .with_context(|| format!("IMDb ID lookup via {} failed", strategy.name()))?;

    let mut resolved = ResolutionMapping::new();
    for id in &requested {
        if let Some(key) = found.get(id) {
            resolved.insert_first(id.clone(), key.clone());
        }
    }

    report_coverage(resolved.len(), requested.len());
    Ok(resolved)
}

fn report_coverage(resolved: usize, total: usize) {
    if resolved < total {
        warn!("Found {}/{} IMDb IDs", resolved, total);
    } else {
        info!("Found all {} IMDb IDs", total);
    }
}

/// Resolves a whole batch with one SPARQL query against Wikidata
pub struct FederatedQueryStrategy {
    client: WikidataClient,
}

impl FederatedQueryStrategy {
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(WikidataClient::new()?))
    }

    pub fn with_client(client: WikidataClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResolutionStrategy for FederatedQueryStrategy {
    fn name(&self) -> &'static str {
        "sparql"
    }

    fn key_encoding(&self) -> KeyEncoding {
        KeyEncoding::Hex
    }

    async fn resolve(&self, ids: &[ImdbId]) -> Result<ResolutionMapping> {
        let bindings = self.client.lookup_plex_ids(ids).await?;
        Ok(collect_bindings(ids, &bindings))
    }
}

/// Keep valid, requested bindings; first binding per IMDb ID wins.
///
/// The knowledge graph carries malformed Plex cross-references, so any
/// `plex_id` that is not a 24-char lowercase hex key is dropped.
pub fn collect_bindings(requested: &[ImdbId], bindings: &[SparqlBinding]) -> ResolutionMapping {
    let wanted: HashSet<&str> = requested.iter().map(ImdbId::as_str).collect();
    let mut mapping = ResolutionMapping::new();
    let mut malformed = 0usize;

    for binding in bindings {
        if !wanted.contains(binding.imdb_id.as_str()) {
            debug!("Ignoring binding for unrequested IMDb ID {}", binding.imdb_id);
            continue;
        }
        let Ok(imdb_id) = ImdbId::parse(&binding.imdb_id) else {
            continue;
        };
        let key = match RatingKey::hex(&binding.plex_id) {
            Ok(key) => key,
            Err(_) => {
                malformed += 1;
                debug!("Dropping malformed Plex ID '{}' for {}", binding.plex_id, imdb_id);
                continue;
            }
        };
        if !mapping.insert_first(imdb_id, key) {
            warn!("Duplicate IMDb ID {}", binding.imdb_id);
        }
    }

    if malformed > 0 {
        debug!("Dropped {} malformed Plex IDs", malformed);
    }
    mapping
}

/// Left join against a downloaded Parquet index of IMDb IDs and Plex keys
pub struct IndexLookupStrategy {
    location: SourceLocation,
}

impl IndexLookupStrategy {
    pub fn new(location: SourceLocation) -> Self {
        Self { location }
    }
}

#[async_trait]
impl ResolutionStrategy for IndexLookupStrategy {
    fn name(&self) -> &'static str {
        "index"
    }

    fn key_encoding(&self) -> KeyEncoding {
        KeyEncoding::Hex
    }

    async fn resolve(&self, ids: &[ImdbId]) -> Result<ResolutionMapping> {
        let rows = load_index(&self.location).await?;
        Ok(join_index(ids, &rows))
    }
}

/// Left join `requested` against index rows on the numeric IMDb suffix,
/// keeping matched rows only. The first index row for a suffix wins.
pub fn join_index(requested: &[ImdbId], rows: &[IndexRow]) -> ResolutionMapping {
    let wanted: HashSet<u64> = requested.iter().filter_map(ImdbId::numeric).collect();

    let mut by_numeric: HashMap<u64, &str> = HashMap::with_capacity(wanted.len());
    let mut duplicates = HashSet::new();
    for row in rows.iter().filter(|row| wanted.contains(&row.imdb_numeric_id)) {
        match by_numeric.entry(row.imdb_numeric_id) {
            Entry::Vacant(entry) => {
                entry.insert(row.key.as_str());
            }
            Entry::Occupied(_) => {
                if duplicates.insert(row.imdb_numeric_id) {
                    warn!("Duplicate IMDb ID tt{:07} in Plex index", row.imdb_numeric_id);
                }
            }
        }
    }

    let mut mapping = ResolutionMapping::new();
    for id in requested {
        let Some(raw_key) = id.numeric().and_then(|n| by_numeric.get(&n)) else {
            continue;
        };
        match RatingKey::hex(raw_key) {
            Ok(key) => {
                mapping.insert_first(id.clone(), key);
            }
            Err(_) => debug!("Dropping malformed Plex index key '{}' for {}", raw_key, id),
        }
    }
    mapping
}
