use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use color_eyre::eyre::Context;
use std::path::PathBuf;
use watchlist_sync_config::{FileConfig, Overrides, PathManager, ResolverKind, Settings};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "imdb-plex-sync")]
#[command(about = "Make a Plex Discover watchlist mirror an IMDb watchlist")]
#[command(version)]
struct Cli {
    /// Enable verbose output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,

    /// Output format
    #[arg(long, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Also write logs to this file, rotated daily
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Config file (defaults to <config dir>/imdb-plex-sync/config.toml)
    #[arg(long, env = "IMDB_PLEX_SYNC_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// IMDb watchlist CSV export, as a URL or local path
    #[arg(long, env = "IMDB_WATCHLIST_URL", value_name = "URL_OR_PATH")]
    imdb_watchlist_url: Option<String>,

    /// Plex account token
    #[arg(long, env = "PLEX_TOKEN", hide_env_values = true)]
    plex_token: Option<String>,

    /// Plex account username, used when no token is given
    #[arg(long, env = "PLEX_USERNAME")]
    plex_username: Option<String>,

    /// Plex account password (prompted for when missing and interactive)
    #[arg(long, env = "PLEX_PASSWORD", hide_env_values = true)]
    plex_password: Option<String>,

    /// How IMDb IDs are mapped to Plex: sparql (Wikidata) or index (Parquet file)
    #[arg(long, env = "IMDB_PLEX_RESOLVER", value_name = "sparql|index")]
    resolver: Option<ResolverKind>,

    /// Location of the Parquet index for the index resolver, as a URL or local path
    #[arg(long, env = "PLEX_INDEX_URL", value_name = "URL_OR_PATH")]
    plex_index_url: Option<String>,

    /// Items requested per Plex watchlist page (1-100)
    #[arg(long, env = "PLEX_PAGE_SIZE")]
    page_size: Option<usize>,

    /// Log the planned changes without touching the Plex watchlist
    #[arg(long, env = "DRY_RUN", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    dry_run: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            watchlist_url: self.imdb_watchlist_url.clone(),
            plex_token: self.plex_token.clone(),
            plex_username: self.plex_username.clone(),
            plex_password: self.plex_password.clone(),
            resolver: self.resolver,
            index_url: self.plex_index_url.clone(),
            page_size: self.page_size,
            dry_run: self.dry_run,
        }
    }

    fn settings(&self) -> color_eyre::Result<Settings> {
        let paths = PathManager::new().ok();
        let file = FileConfig::locate(self.config.as_deref(), paths.as_ref())?;
        Ok(Settings::resolve(self.overrides(), file)?)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let actions_debug = std::env::var("ACTIONS_RUNNER_DEBUG").ok();
    let verbose = logging::effective_verbosity(cli.verbose, actions_debug.as_deref());
    logging::init_logging_with_file(verbose, cli.quiet, cli.log_file.clone())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    let settings = cli.settings().wrap_err("Invalid configuration")?;
    commands::sync::run_sync(settings, &output).await
}
