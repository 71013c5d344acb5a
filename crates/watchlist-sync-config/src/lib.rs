pub mod config;
pub mod error;
pub mod paths;

pub use config::{
    FileConfig, ImdbSection, Overrides, PlexAuth, PlexSection, ResolverKind, ResolverSection, Settings, SyncSection,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use error::ConfigError;
pub use paths::PathManager;
