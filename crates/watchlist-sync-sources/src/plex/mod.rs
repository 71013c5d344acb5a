pub mod api;
pub mod auth;
pub mod client;

pub use api::PlexDiscoverApi;
pub use auth::{obtain_token, AccountSession, PlexCredentials};
pub use client::{PlexWatchlistClient, MAX_PAGE_SIZE};
