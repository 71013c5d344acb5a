use crate::error::SourceError;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT as USER_AGENT_HEADER};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::trace;

/// Identifies this tool to public endpoints (Wikidata asks bots to set one)
pub const USER_AGENT: &str = concat!(
    "IMDbPlexSync/",
    env!("CARGO_PKG_VERSION"),
    " (watchlist reconciliation bot)"
);

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a one-purpose HTTP client with JSON accept, our user agent and the
/// given timeouts plus any extra default headers.
pub fn build_client(
    timeout: Duration,
    connect_timeout: Duration,
    extra_headers: HeaderMap,
) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT_HEADER, HeaderValue::from_static(USER_AGENT));
    headers.extend(extra_headers);

    Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(connect_timeout.min(timeout))
        .build()
        .context("Failed to create HTTP client")
}

/// Send a request and turn transport failures and non-2xx statuses into
/// [`SourceError`]s.
pub async fn send_checked(request: RequestBuilder, url: &str) -> Result<Response, SourceError> {
    let response = request.send().await.map_err(|source| SourceError::Network {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    trace!(%url, %status, "HTTP response");
    if !status.is_success() {
        return Err(SourceError::HttpStatus {
            url: url.to_string(),
            status,
        });
    }
    Ok(response)
}
