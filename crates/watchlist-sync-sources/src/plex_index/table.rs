use anyhow::{Context, Result};
use bytes::Bytes;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use tracing::debug;

pub const IMDB_NUMERIC_ID_COLUMN: &str = "imdb_numeric_id";
pub const KEY_COLUMN: &str = "key";

/// One row of the index: numeric IMDb suffix and the Plex key as lowercase hex
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    pub imdb_numeric_id: u64,
    pub key: String,
}

fn field_as_u64(field: &Field) -> Option<u64> {
    match field {
        Field::Byte(v) => u64::try_from(*v).ok(),
        Field::Short(v) => u64::try_from(*v).ok(),
        Field::Int(v) => u64::try_from(*v).ok(),
        Field::Long(v) => u64::try_from(*v).ok(),
        Field::UByte(v) => Some(u64::from(*v)),
        Field::UShort(v) => Some(u64::from(*v)),
        Field::UInt(v) => Some(u64::from(*v)),
        Field::ULong(v) => Some(*v),
        Field::Str(s) => s.trim_start_matches("tt").parse().ok(),
        _ => None,
    }
}

fn field_as_hex_key(field: &Field) -> Option<String> {
    match field {
        Field::Bytes(bytes) => Some(hex::encode(bytes.data())),
        Field::Str(s) => Some(s.to_ascii_lowercase()),
        _ => None,
    }
}

/// Decode a Parquet index file into rows.
///
/// Rows lacking either column, or holding values of an unusable type, are
/// skipped and counted.
pub fn decode_index(content: Bytes) -> Result<Vec<IndexRow>> {
    let reader = SerializedFileReader::new(content).context("Not a readable Parquet file")?;
    let total = reader.metadata().file_metadata().num_rows();
    debug!("Plex index has {} rows", total);

    let mut rows = Vec::with_capacity(usize::try_from(total).unwrap_or(0));
    let mut skipped = 0usize;
    for record in reader.get_row_iter(None)? {
        let record = record?;

        let mut imdb_numeric_id = None;
        let mut key = None;
        for (name, field) in record.get_column_iter() {
            match name.as_str() {
                IMDB_NUMERIC_ID_COLUMN => imdb_numeric_id = field_as_u64(field),
                KEY_COLUMN => key = field_as_hex_key(field),
                _ => {}
            }
        }

        match (imdb_numeric_id, key) {
            (Some(imdb_numeric_id), Some(key)) => rows.push(IndexRow { imdb_numeric_id, key }),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("Skipped {} Plex index rows without an IMDb ID or key", skipped);
    }
    Ok(rows)
}
