use thiserror::Error;
use watchlist_sync_models::KeyEncoding;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The resolver and the watchlist speak different rating key encodings.
    /// Keys are never converted between encodings.
    #[error("resolver '{strategy}' produces {resolver} rating keys but the watchlist expects {watchlist} keys")]
    KeyEncodingMismatch {
        strategy: String,
        resolver: KeyEncoding,
        watchlist: KeyEncoding,
    },
}
