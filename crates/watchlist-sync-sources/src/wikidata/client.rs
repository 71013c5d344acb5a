use crate::error::SourceError;
use crate::http::{build_client, send_checked, DEFAULT_CONNECT_TIMEOUT};
use crate::wikidata::query::build_plex_lookup_query;
use anyhow::{Context, Result};
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use watchlist_sync_models::ImdbId;

pub const WIKIDATA_SPARQL_URL: &str = "https://query.wikidata.org/sparql";

/// The public endpoint can take a long time to answer under load
pub const SPARQL_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    bindings: Vec<RawBinding>,
}

#[derive(Debug, Deserialize)]
struct RawBinding {
    imdb_id: BindingValue,
    plex_id: BindingValue,
}

#[derive(Debug, Deserialize)]
struct BindingValue {
    value: String,
}

/// One `(imdb_id, plex_id)` row as returned by the endpoint, unvalidated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparqlBinding {
    pub imdb_id: String,
    pub plex_id: String,
}

/// Wikidata Query Service client for the IMDb -> Plex cross-reference
pub struct WikidataClient {
    client: Client,
    endpoint: String,
}

impl WikidataClient {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(WIKIDATA_SPARQL_URL)
    }

    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        let client = build_client(SPARQL_TIMEOUT, DEFAULT_CONNECT_TIMEOUT, HeaderMap::new())?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    /// Run a single batched lookup for `ids`
    pub async fn lookup_plex_ids(&self, ids: &[ImdbId]) -> Result<Vec<SparqlBinding>> {
        let query = build_plex_lookup_query(ids);
        debug!("Querying Wikidata for {} IMDb IDs", ids.len());

        let request = self.client.post(&self.endpoint).form(&[("query", query.as_str())]);
        let body = send_checked(request, &self.endpoint)
            .await?
            .text()
            .await
            .context("Failed to read SPARQL response")?;

        let bindings = parse_sparql_response(&body)
            .map_err(|e| SourceError::malformed(&self.endpoint, e.to_string()))?;
        debug!("Wikidata returned {} bindings", bindings.len());
        Ok(bindings)
    }
}

fn parse_sparql_response(body: &str) -> Result<Vec<SparqlBinding>, serde_json::Error> {
    let response: SparqlResponse = serde_json::from_str(body)?;
    Ok(response
        .results
        .bindings
        .into_iter()
        .map(|b| SparqlBinding {
            imdb_id: b.imdb_id.value,
            plex_id: b.plex_id.value,
        })
        .collect())
}
