//! Secret, integration, and infrastructure-handle resolution (§6).

use async_trait::async_trait;

use crate::error::PortError;
use crate::secure::SecureString;

/// One-shot-per-execution initialization plus lazy per-node resolution of
/// credentials and integration handles.
///
/// `initialize` is called exactly once by the Coordinator's
/// `preload organization resources` step; `get_secret`/`get_integration`
/// are called lazily from inside a node invocation via
/// [`crate::InvocationContext`]. After `initialize` returns, the
/// provider's internal state is read-only for the remainder of the
/// execution (§5 shared-resource policy).
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// One-shot initialization for an organization (e.g. warm a credential
    /// cache, refresh OAuth tokens).
    async fn initialize(&self, organization_id: &str) -> Result<(), PortError>;

    /// Resolve a secret value by name.
    async fn get_secret(&self, organization_id: &str, name: &str) -> Result<SecureString, PortError>;

    /// Resolve an opaque integration handle by id (e.g. a configured AI
    /// provider or database connection descriptor).
    async fn get_integration(&self, organization_id: &str, id: &str) -> Result<serde_json::Value, PortError>;
}
