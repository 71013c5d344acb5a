use reqwest::StatusCode;
use thiserror::Error;

/// Failures raised while talking to a remote collaborator.
///
/// Transport and status errors abort the run; malformed responses are fatal
/// for the call that received them.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned {status}")]
    HttpStatus { url: String, status: StatusCode },

    #[error("malformed response from {url}: {detail}")]
    MalformedResponse { url: String, detail: String },

    #[error("{action} was not acknowledged for ratingKey {key}")]
    NotAcknowledged { action: &'static str, key: String },
}

impl SourceError {
    pub fn malformed(url: &str, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            url: url.to_string(),
            detail: detail.into(),
        }
    }
}
