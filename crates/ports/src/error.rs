//! Errors a port implementation may return to the engine.

use dagforge_core::NodeId;

/// Errors surfaced by external collaborators.
///
/// These are distinct from `dagforge_execution::ExecutionError`: a
/// `PortError` describes an infrastructure failure (a secret could not be
/// resolved, a blob write failed), never a node's own business-logic error,
/// which is always recorded as a plain string (§7).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PortError {
    #[error("secret `{0}` could not be resolved")]
    SecretNotFound(String),

    #[error("integration `{0}` could not be resolved")]
    IntegrationNotFound(String),

    #[error("object store error: {0}")]
    ObjectStore(String),

    #[error("execution store error: {0}")]
    ExecutionStore(String),

    #[error("credit gate error: {0}")]
    CreditGate(String),

    #[error("durable step `{0}` failed: {1}")]
    DurableStep(String, String),

    #[error("node `{0}` has no registered implementation")]
    NodeTypeNotImplemented(NodeId),
}
