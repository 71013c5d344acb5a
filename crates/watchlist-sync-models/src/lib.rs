pub mod imdb_id;
pub mod mapping;
pub mod rating_key;

pub use imdb_id::ImdbId;
pub use mapping::ResolutionMapping;
pub use rating_key::{KeyEncoding, RatingKey};

use thiserror::Error;

/// Identifier validation failures shared by all model newtypes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("invalid IMDb ID '{0}' (expected tt followed by digits)")]
    InvalidImdbId(String),

    #[error("invalid {encoding} Plex rating key '{value}'")]
    InvalidRatingKey { value: String, encoding: KeyEncoding },
}
