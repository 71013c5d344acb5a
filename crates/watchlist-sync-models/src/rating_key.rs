use crate::IdError;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

static HEX_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9]{24}$").expect("valid hex key pattern"));

static NUMERIC_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid numeric key pattern"));

/// Wire encoding of a Plex rating key.
///
/// Discover (metadata.provider / discover.provider) keys are 24-char lowercase
/// hex; local Plex Media Server libraries use decimal keys. The two are not
/// interchangeable and are never converted into each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEncoding {
    Hex,
    Numeric,
}

impl KeyEncoding {
    pub fn matches(self, value: &str) -> bool {
        match self {
            KeyEncoding::Hex => HEX_KEY_PATTERN.is_match(value),
            KeyEncoding::Numeric => NUMERIC_KEY_PATTERN.is_match(value),
        }
    }
}

impl fmt::Display for KeyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEncoding::Hex => f.write_str("hex"),
            KeyEncoding::Numeric => f.write_str("numeric"),
        }
    }
}

/// Plex rating key, validated against the encoding it was produced in
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RatingKey {
    value: String,
    encoding: KeyEncoding,
}

impl RatingKey {
    pub fn parse(encoding: KeyEncoding, value: &str) -> Result<Self, IdError> {
        if encoding.matches(value) {
            Ok(Self {
                value: value.to_string(),
                encoding,
            })
        } else {
            Err(IdError::InvalidRatingKey {
                value: value.to_string(),
                encoding,
            })
        }
    }

    pub fn hex(value: &str) -> Result<Self, IdError> {
        Self::parse(KeyEncoding::Hex, value)
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn encoding(&self) -> KeyEncoding {
        self.encoding
    }
}

impl fmt::Display for RatingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl Serialize for RatingKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}
