//! Persistent storage for the final [`dagforge_execution::ExecutionRecord`] (§6, P6).

use async_trait::async_trait;
use dagforge_execution::ExecutionRecord;

use crate::error::PortError;

/// Persists execution records.
///
/// `save` must be idempotent by `record.id`: calling it twice with the same
/// execution id is safe and returns the same stored record, since the
/// Durable Step Wrapper already guarantees at most one live call per
/// execution (P6) — this trait's idempotence is a second line of defense,
/// not the primary guarantee.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    async fn save(&self, record: ExecutionRecord) -> Result<ExecutionRecord, PortError>;
}
