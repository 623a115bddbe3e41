//! Port interfaces for sync operations

use async_trait::async_trait;
use clubsync_domain::{NewOperation, OperationRecord, Result};

/// Trait for the durable operation queue store.
///
/// The store persists operation records across process restarts and is the
/// only shared mutable resource of the sync engine. `increment_retry` and
/// `remove` are reserved to the sync coordinator; `clear` exists for
/// administrative reset and test isolation only.
#[async_trait]
pub trait OperationQueue: Send + Sync {
    /// Durably record a new operation; returns the generated id.
    ///
    /// Storage failures surface to the caller; a silently dropped enqueue
    /// is indistinguishable from data loss.
    async fn enqueue(&self, operation: &NewOperation) -> Result<String>;

    /// Snapshot of all pending records, ordered by enqueue time ascending.
    async fn list_pending(&self) -> Result<Vec<OperationRecord>>;

    /// Increment the retry counter of a record after a failed attempt;
    /// returns the new count.
    async fn increment_retry(&self, id: &str) -> Result<i32>;

    /// Delete the record with the given id. Removing an absent id is a
    /// no-op, so the removal step itself can be retried idempotently.
    async fn remove(&self, id: &str) -> Result<()>;

    /// Delete all records. Administrative/test use only.
    async fn clear(&self) -> Result<()>;
}
