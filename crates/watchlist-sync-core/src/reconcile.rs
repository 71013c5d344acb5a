use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info};
use watchlist_sync_models::RatingKey;
use watchlist_sync_sources::WatchlistService;

/// Set difference between the desired and the current watchlist.
///
/// Keys are kept sorted so logs and mutation order are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub to_add: BTreeSet<RatingKey>,
    pub to_remove: BTreeSet<RatingKey>,
}

impl ReconcilePlan {
    pub fn compute(desired: &HashSet<RatingKey>, current: &HashSet<RatingKey>) -> Self {
        Self {
            to_add: desired.difference(current).cloned().collect(),
            to_remove: current.difference(desired).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// What a plan did (or would have done, on a dry run)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub added: usize,
    pub removed: usize,
    pub dry_run: bool,
}

/// Apply `plan` to `watchlist`: every add first, then every remove.
///
/// Each intended change is logged before it is issued. On a dry run nothing
/// is sent. The first failed mutation aborts the run; changes already applied
/// stay applied.
pub async fn apply_plan(plan: &ReconcilePlan, watchlist: &dyn WatchlistService, dry_run: bool) -> Result<ReconcileReport> {
    if plan.is_empty() {
        info!("Plex watchlist already matches IMDb watchlist");
        return Ok(ReconcileReport {
            dry_run,
            ..Default::default()
        });
    }

    info!(
        "Plan: {} to add, {} to remove{}",
        plan.to_add.len(),
        plan.to_remove.len(),
        if dry_run { " (dry run)" } else { "" }
    );

    let mut report = ReconcileReport {
        dry_run,
        ..Default::default()
    };

    for key in &plan.to_add {
        info!(dry_run, "+ {}", key);
        if dry_run {
            continue;
        }
        watchlist
            .add(key)
            .await
            .with_context(|| format!("Failed to add {} to Plex watchlist", key))?;
        report.added += 1;
    }

    for key in &plan.to_remove {
        info!(dry_run, "- {}", key);
        if dry_run {
            continue;
        }
        watchlist
            .remove(key)
            .await
            .with_context(|| format!("Failed to remove {} from Plex watchlist", key))?;
        report.removed += 1;
    }

    if dry_run {
        report.added = plan.to_add.len();
        report.removed = plan.to_remove.len();
        debug!("Dry run: no watchlist changes sent");
    }
    Ok(report)
}
