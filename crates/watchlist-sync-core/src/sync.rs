use crate::error::SyncError;
use crate::reconcile::{apply_plan, ReconcilePlan};
use crate::resolver::{resolve_ids, ResolutionStrategy};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::time::{Duration, Instant};
use tracing::{info, instrument};
use watchlist_sync_models::ImdbId;
use watchlist_sync_sources::{read_watchlist_ids, SourceLocation, WatchlistService};

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SyncOptions {
    pub dry_run: bool,
}

/// Outcome of one reconciliation run
#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
    /// Distinct IMDb IDs in the source watchlist
    pub requested: usize,
    pub resolved: usize,
    /// Items on the Plex watchlist before any change
    pub plex_items: usize,
    pub added: usize,
    pub removed: usize,
    pub dry_run: bool,
    pub strategy: String,
    pub started_at: DateTime<Utc>,
    #[serde(rename = "duration_seconds", serialize_with = "serialize_seconds")]
    pub duration: Duration,
}

fn serialize_seconds<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Drives one run: Source Reader -> Resolver -> watchlist read -> Reconciler.
pub struct SyncOrchestrator {
    strategy: Box<dyn ResolutionStrategy>,
    watchlist: Box<dyn WatchlistService>,
    options: SyncOptions,
}

impl SyncOrchestrator {
    /// Fails when the strategy and the watchlist disagree on key encoding.
    pub fn new(strategy: Box<dyn ResolutionStrategy>, watchlist: Box<dyn WatchlistService>) -> Result<Self, SyncError> {
        if strategy.key_encoding() != watchlist.key_encoding() {
            return Err(SyncError::KeyEncodingMismatch {
                strategy: strategy.name().to_string(),
                resolver: strategy.key_encoding(),
                watchlist: watchlist.key_encoding(),
            });
        }
        Ok(Self {
            strategy,
            watchlist,
            options: SyncOptions::default(),
        })
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Read the IMDb watchlist at `source` and reconcile Plex against it
    #[instrument(skip_all, fields(strategy = self.strategy.name(), dry_run = self.options.dry_run))]
    pub async fn sync(&self, source: &SourceLocation) -> Result<SyncResult> {
        let started_at = Utc::now();
        let timer = Instant::now();

        let ids = read_watchlist_ids(source).await?;

        self.run(ids, started_at, timer).await
    }

    /// Reconcile Plex against an already-loaded list of IMDb IDs
    pub async fn sync_ids(&self, ids: Vec<ImdbId>) -> Result<SyncResult> {
        self.run(ids, Utc::now(), Instant::now()).await
    }

    async fn run(&self, ids: Vec<ImdbId>, started_at: DateTime<Utc>, timer: Instant) -> Result<SyncResult> {
        let mapping = resolve_ids(self.strategy.as_ref(), &ids).await?;
        let requested = crate::resolver::dedupe_ids(&ids).len();

        let current = self
            .watchlist
            .read()
            .await
            .context("Failed to read Plex watchlist")?;

        let plan = ReconcilePlan::compute(&mapping.rating_keys(), &current);
        let report = apply_plan(&plan, self.watchlist.as_ref(), self.options.dry_run).await?;

        let result = SyncResult {
            requested,
            resolved: mapping.len(),
            plex_items: current.len(),
            added: report.added,
            removed: report.removed,
            dry_run: report.dry_run,
            strategy: self.strategy.name().to_string(),
            started_at,
            duration: timer.elapsed(),
        };

        info!(
            added = result.added,
            removed = result.removed,
            dry_run = result.dry_run,
            "Sync finished in {:.1}s",
            result.duration.as_secs_f64()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{hex, imdb, Call, FakeStrategy, FakeWatchlist};
    use std::io::Write;
    use watchlist_sync_models::KeyEncoding;

    fn strategy() -> FakeStrategy {
        FakeStrategy::new(vec![(imdb("tt1"), hex("a")), (imdb("tt2"), hex("b"))])
    }

    #[test]
    fn test_refuses_mismatched_key_encodings() {
        let mut strategy = strategy();
        strategy.encoding = KeyEncoding::Numeric;

        let result = SyncOrchestrator::new(Box::new(strategy), Box::new(FakeWatchlist::new(Vec::new())));

        match result {
            Err(SyncError::KeyEncodingMismatch { resolver, watchlist, .. }) => {
                assert_eq!(resolver, KeyEncoding::Numeric);
                assert_eq!(watchlist, KeyEncoding::Hex);
            }
            Ok(_) => panic!("expected an encoding mismatch"),
        }
    }

    #[tokio::test]
    async fn test_sync_ids_reconciles_both_directions() {
        let watchlist = FakeWatchlist::new(vec![hex("b"), hex("c")]);
        let calls = watchlist.calls.clone();
        let orchestrator = SyncOrchestrator::new(Box::new(strategy()), Box::new(watchlist)).unwrap();

        let result = orchestrator
            .sync_ids(vec![imdb("tt1"), imdb("tt2"), imdb("tt3"), imdb("tt1")])
            .await
            .unwrap();

        assert_eq!(result.requested, 3);
        assert_eq!(result.resolved, 2);
        assert_eq!(result.plex_items, 2);
        assert_eq!((result.added, result.removed), (1, 1));
        assert_eq!(result.strategy, "fake");
        assert_eq!(
            *calls.lock().unwrap(),
            vec![Call::Add(hex("a").to_string()), Call::Remove(hex("c").to_string())]
        );
    }

    #[tokio::test]
    async fn test_dry_run_reports_plan_without_calls() {
        let watchlist = FakeWatchlist::new(vec![hex("c")]);
        let calls = watchlist.calls.clone();
        let orchestrator = SyncOrchestrator::new(Box::new(strategy()), Box::new(watchlist))
            .unwrap()
            .with_options(SyncOptions { dry_run: true });

        let result = orchestrator.sync_ids(vec![imdb("tt1"), imdb("tt2")]).await.unwrap();

        assert!(result.dry_run);
        assert_eq!((result.added, result.removed), (2, 1));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_source_clears_watchlist_without_lookup() {
        let watchlist = FakeWatchlist::new(vec![hex("c")]);
        let orchestrator = SyncOrchestrator::new(Box::new(strategy()), Box::new(watchlist)).unwrap();

        let result = orchestrator.sync_ids(Vec::new()).await.unwrap();

        assert_eq!(result.requested, 0);
        assert_eq!(result.removed, 1);
    }

    #[tokio::test]
    async fn test_resolver_failure_stops_before_watchlist_changes() {
        let mut failing = strategy();
        failing.fail = true;
        let watchlist = FakeWatchlist::new(vec![hex("c")]);
        let calls = watchlist.calls.clone();
        let orchestrator = SyncOrchestrator::new(Box::new(failing), Box::new(watchlist)).unwrap();

        assert!(orchestrator.sync_ids(vec![imdb("tt1")]).await.is_err());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sync_from_local_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Position,Const,Created,Title").unwrap();
        writeln!(file, "1,tt1,2024-01-01,First").unwrap();
        writeln!(file, "2,tt2,2024-01-02,Second").unwrap();

        let watchlist = FakeWatchlist::new(Vec::new());
        let calls = watchlist.calls.clone();
        let orchestrator = SyncOrchestrator::new(Box::new(strategy()), Box::new(watchlist)).unwrap();

        let source = SourceLocation::Local(file.path().to_path_buf());
        let result = orchestrator.sync(&source).await.unwrap();

        assert_eq!(result.added, 2);
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_source_file_is_error() {
        let orchestrator =
            SyncOrchestrator::new(Box::new(strategy()), Box::new(FakeWatchlist::new(Vec::new()))).unwrap();

        let source = SourceLocation::Local("/nonexistent/watchlist.csv".into());
        let err = orchestrator.sync(&source).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read IMDb watchlist"));
    }

    #[test]
    fn test_result_serializes_duration_in_seconds() {
        let result = SyncResult {
            requested: 1,
            resolved: 1,
            plex_items: 0,
            added: 1,
            removed: 0,
            dry_run: false,
            strategy: "sparql".to_string(),
            started_at: Utc::now(),
            duration: Duration::from_millis(1500),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["duration_seconds"], 1.5);
        assert!(json.get("duration").is_none());
    }
}
