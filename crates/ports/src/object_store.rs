//! Binary content storage for blob-bearing parameter values (§4.4, §6).

use async_trait::async_trait;
use dagforge_core::ExecutionId;

use crate::error::PortError;

/// A handle returned by [`ObjectStore::write_object`], re-exported from
/// `dagforge-execution` where it is also the wire type exchanged between
/// nodes (`dagforge_execution::BlobHandle`).
pub use dagforge_execution::BlobHandle;

/// Content-addressed or id-addressed binary storage.
///
/// Write-once: implementations must not mutate an object after it is
/// written, so repeated reads of the same handle are idempotent and safe
/// to retry (§5).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Persist `bytes` and return a handle for later retrieval.
    async fn write_object(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        organization_id: &str,
        execution_id: Option<ExecutionId>,
    ) -> Result<BlobHandle, PortError>;

    /// Retrieve the bytes behind a handle.
    async fn read_object(&self, handle: &BlobHandle) -> Result<Vec<u8>, PortError>;
}
