pub mod error;
pub mod reconcile;
pub mod resolver;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use error::SyncError;
pub use reconcile::{apply_plan, ReconcilePlan, ReconcileReport};
pub use resolver::{resolve_ids, FederatedQueryStrategy, IndexLookupStrategy, ResolutionStrategy};
pub use sync::{SyncOptions, SyncOrchestrator, SyncResult};
