use watchlist_sync_models::ImdbId;

// P345 = IMDb ID, P11460 = Plex media key
const PLEX_LOOKUP_TEMPLATE: &str = "
SELECT DISTINCT ?imdb_id ?plex_id WHERE {
  VALUES ?imdb_id { ?imdb_ids }
  ?item wdt:P345 ?imdb_id; wdt:P11460 ?plex_id.
}
";

/// Quote `value` as a SPARQL string literal
pub fn sparql_string_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('"');
    for c in value.chars() {
        match c {
            '\\' => literal.push_str("\\\\"),
            '"' => literal.push_str("\\\""),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            _ => literal.push(c),
        }
    }
    literal.push('"');
    literal
}

/// One query for the whole batch: every IMDb ID becomes a `VALUES` literal
pub fn build_plex_lookup_query(ids: &[ImdbId]) -> String {
    let values = ids
        .iter()
        .map(|id| sparql_string_literal(id.as_str()))
        .collect::<Vec<_>>()
        .join(" ");
    PLEX_LOOKUP_TEMPLATE.replace("?imdb_ids", &values)
}
