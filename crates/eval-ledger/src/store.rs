//! Run store trait definition.
//!
//! A `RunStore` is an append-only log of `EvalRun` documents keyed by run id.
//! Persisted runs are never updated or deleted; the only write-time decision
//! is revision stamping (see [`RunStore::next_revision`]).
//!
//! Revision contract:
//! - Revisions are strictly increasing integers, never reused or decremented.
//! - A batch saved in one call shares a single revision; the save after a
//!   batch gets `shared + 1`, not `shared + len`.
//! - If the run history cannot be read, revision assignment fails loudly
//!   rather than defaulting to 1 and colliding with genuine first-run state.
//!
//! The scan-then-assign sequence assumes a single writer per store. Both
//! provided backends serialise it for in-process callers; cross-process
//! writers would need a store-level lock.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StorageError;
use crate::model::EvalRun;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Append-only persistence for eval runs.
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Persist a run, stamping `revision = next_revision()` if unset.
    /// Returns the run as stored. Fails with `DuplicateRun` if the id was
    /// already saved.
    async fn save_run(&self, run: EvalRun) -> StorageResult<EvalRun>;

    /// Persist a batch of runs under one shared revision. The next revision
    /// is computed once; every run in the batch that lacks a revision is
    /// stamped with that same value.
    async fn save_batch(&self, runs: Vec<EvalRun>) -> StorageResult<Vec<EvalRun>>;

    /// Retrieve a run by id. Returns `RunNotFound` if absent.
    async fn get_run(&self, run_id: &Uuid) -> StorageResult<EvalRun>;

    /// List persisted runs, optionally filtered by suite, newest first.
    async fn list_runs(&self, suite_id: Option<&str>) -> StorageResult<Vec<EvalRun>>;

    /// Compute the next revision: max assigned revision across all persisted
    /// runs (unassigned counts as 0), plus one.
    async fn next_revision(&self) -> StorageResult<u64>;
}

/// Highest revision assigned among `runs`, treating unassigned as 0.
pub(crate) fn high_water_mark(runs: &[EvalRun]) -> u64 {
    runs.iter().filter_map(|r| r.revision).max().unwrap_or(0)
}

/// Sort runs newest-timestamp-first, the listing order every backend uses.
pub(crate) fn sort_newest_first(runs: &mut [EvalRun]) {
    runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
