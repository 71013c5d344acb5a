use crate::error::SourceError;
use crate::http::{build_client, send_checked, DEFAULT_CONNECT_TIMEOUT};
use crate::plex::api::{plex_headers, PLEX_REQUEST_TIMEOUT};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

const PLEX_TV_BASE_URL: &str = "https://plex.tv";

/// How the user proves who they are to Plex
#[derive(Clone)]
pub enum PlexCredentials {
    Token(String),
    Account { username: String, password: String },
}

impl std::fmt::Debug for PlexCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlexCredentials::Token(_) => f.write_str("Token(***)"),
            PlexCredentials::Account { username, .. } => f
                .debug_struct("Account")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SignInResponse {
    #[serde(rename = "authToken")]
    auth_token: Option<String>,
}

/// plex.tv account session: trades a username/password for an auth token
pub struct AccountSession {
    client: Client,
    base_url: String,
}

impl AccountSession {
    pub fn new() -> Result<Self> {
        let client = build_client(PLEX_REQUEST_TIMEOUT, DEFAULT_CONNECT_TIMEOUT, plex_headers(None)?)?;
        Ok(Self {
            client,
            base_url: PLEX_TV_BASE_URL.to_string(),
        })
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> Result<String> {
        let url = format!("{}/api/v2/users/signin", self.base_url);
        let request = self.client.post(&url).form(&[
            ("login", username),
            ("password", password),
            ("rememberMe", "false"),
        ]);

        let response: SignInResponse = send_checked(request, &url)
            .await
            .context("Plex sign-in failed")?
            .json()
            .await
            .map_err(|e| SourceError::malformed(&url, e.to_string()))?;

        response
            .auth_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| SourceError::malformed(&url, "no authToken in sign-in response").into())
    }
}

/// Resolve credentials into the bearer token the watchlist client consumes
pub async fn obtain_token(credentials: PlexCredentials) -> Result<String> {
    match credentials {
        PlexCredentials::Token(token) => {
            info!("Plex token provided for authentication");
            Ok(token)
        }
        PlexCredentials::Account { username, password } => {
            info!("Signing in to Plex as {}", username);
            AccountSession::new()?.sign_in(&username, &password).await
        }
    }
}
