use super::prompts::complete_credentials;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing::info;
use watchlist_sync_config::{ResolverKind, Settings};
use watchlist_sync_core::{
    FederatedQueryStrategy, IndexLookupStrategy, ResolutionStrategy, SyncOptions, SyncOrchestrator,
};
use watchlist_sync_sources::plex::obtain_token;
use watchlist_sync_sources::{PlexDiscoverApi, PlexWatchlistClient, SourceLocation};

fn build_strategy(settings: &Settings) -> Result<Box<dyn ResolutionStrategy>> {
    match settings.resolver {
        ResolverKind::Sparql => {
            let strategy = FederatedQueryStrategy::new()
                .map_err(|e| eyre!("Failed to create Wikidata client: {:#}", e))?;
            Ok(Box::new(strategy))
        }
        ResolverKind::Index => {
            let location = settings
                .index_url
                .as_deref()
                .map(SourceLocation::parse)
                .ok_or_else(|| eyre!("The index resolver needs PLEX_INDEX_URL"))?;
            Ok(Box::new(IndexLookupStrategy::new(location)))
        }
    }
}

pub async fn run_sync(settings: Settings, output: &Output) -> Result<()> {
    tracing::debug!(?settings, "Sync command started");

    let credentials = complete_credentials(settings.auth.clone())?;
    let token = obtain_token(credentials)
        .await
        .map_err(|e| eyre!("Plex authentication failed: {:#}", e))?;

    let strategy = build_strategy(&settings)?;
    let api = PlexDiscoverApi::new(&token).map_err(|e| eyre!("Failed to create Plex client: {:#}", e))?;
    let watchlist = PlexWatchlistClient::new(api, settings.page_size);

    let orchestrator = SyncOrchestrator::new(strategy, Box::new(watchlist))?.with_options(SyncOptions {
        dry_run: settings.dry_run,
    });

    let source = SourceLocation::parse(&settings.watchlist_url);
    info!(
        "Syncing IMDb watchlist from {} via {} resolver{}",
        source,
        orchestrator.strategy_name(),
        if settings.dry_run { " (dry run)" } else { "" }
    );

    let result = orchestrator.sync(&source).await.map_err(|e| eyre!("Sync failed: {:#}", e))?;

    output.summary(&result);
    Ok(())
}
