pub mod client;
pub mod query;

pub use client::{SparqlBinding, WikidataClient, WIKIDATA_SPARQL_URL};
pub use query::{build_plex_lookup_query, sparql_string_literal};
