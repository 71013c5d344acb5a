use anyhow::{anyhow, Context, Result};
use csv::Reader;
use std::io::Read;
use watchlist_sync_models::ImdbId;

/// Column of the IMDb list export holding the `tt` title ID
pub const IMDB_ID_COLUMN: &str = "Const";

/// Parse an IMDb list export (CSV with header row) into its title IDs.
///
/// Order and duplicates are kept as they appear in the file. Rows with an
/// empty `Const` are skipped; a non-empty value that is not an IMDb ID fails
/// the parse.
pub fn parse_watchlist_ids<R: Read>(reader: R) -> Result<Vec<ImdbId>> {
    let mut reader = Reader::from_reader(reader);

    let headers = reader.headers()?.clone();
    let available_columns: Vec<&str> = headers.iter().collect();
    tracing::debug!("Available CSV columns: {:?}", available_columns);

    let const_index = headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}') == IMDB_ID_COLUMN)
        .ok_or_else(|| {
            anyhow!(
                "Missing required column: {}. Available columns: {:?}",
                IMDB_ID_COLUMN,
                available_columns
            )
        })?;

    let mut ids = Vec::new();
    let mut row_count = 0;
    for result in reader.records() {
        let record = result?;
        row_count += 1;

        let value = record.get(const_index).unwrap_or("").trim();
        if value.is_empty() {
            tracing::debug!(row = row_count, "Skipping row with empty IMDB ID");
            continue;
        }

        let id = ImdbId::parse(value).with_context(|| format!("Invalid IMDb ID in row {}", row_count))?;
        if ids.len() < 3 {
            tracing::debug!(row = row_count, imdb_id = %id, "Parsed watchlist CSV row");
        }
        ids.push(id);
    }

    tracing::debug!("Parsed {} total rows, {} IMDb IDs", row_count, ids.len());
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT_HEADER: &str = "Position,Const,Created,Modified,Description,Title,URL,Title Type,IMDb Rating,Runtime (mins),Year,Genres,Num Votes,Release Date,Directors";

    fn ids(input: &str) -> Vec<String> {
        parse_watchlist_ids(input.as_bytes())
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_watchlist_export() {
        let csv = format!(
            "{EXPORT_HEADER}\n\
             1,tt0111161,2020-01-01,2020-01-01,,The Shawshank Redemption,https://www.imdb.com/title/tt0111161/,Movie,9.3,142,1994,Drama,2500000,1994-09-23,Frank Darabont\n\
             2,tt0944947,2020-01-02,2020-01-02,,Game of Thrones,https://www.imdb.com/title/tt0944947/,TV Series,9.2,57,2011,\"Action, Drama, Fantasy\",2000000,2011-04-17,\n"
        );

        assert_eq!(ids(&csv), vec!["tt0111161", "tt0944947"]);
    }

    #[test]
    fn test_parse_keeps_order_and_duplicates() {
        let csv = "Const,Title\ntt3,C\ntt1,A\ntt3,C again\n";
        assert_eq!(ids(csv), vec!["tt3", "tt1", "tt3"]);
    }

    #[test]
    fn test_parse_header_only() {
        assert!(ids("Const,Title\n").is_empty());
    }

    #[test]
    fn test_parse_skips_empty_const() {
        let csv = "Const,Title\n,No id\ntt42,Answer\n";
        assert_eq!(ids(csv), vec!["tt42"]);
    }

    #[test]
    fn test_parse_handles_byte_order_mark() {
        let csv = "\u{feff}Const,Title\ntt42,Answer\n";
        assert_eq!(ids(csv), vec!["tt42"]);
    }

    #[test]
    fn test_parse_missing_const_column() {
        let result = parse_watchlist_ids("Title,Year\nTest,2020\n".as_bytes());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Missing required column: Const"));
    }

    #[test]
    fn test_parse_rejects_malformed_id() {
        let result = parse_watchlist_ids("Const\ntt1\nnm0000151\n".as_bytes());
        let err = format!("{:#}", result.unwrap_err());
        assert!(err.contains("row 2"), "{err}");
        assert!(err.contains("nm0000151"), "{err}");
    }
}
