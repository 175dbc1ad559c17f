//! Fatal (taxonomy items 1, 2, 4 of §7) errors from planning and state
//! bookkeeping. Node-local failures are never represented here — they are
//! recorded as plain strings in [`crate::ExecutionState`], per §7.

use dagforge_core::NodeId;
use dagforge_workflow::WorkflowError;

/// Errors raised while building a plan or mutating execution state.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExecutionError {
    /// Planning failed: bad workflow structure or a cycle.
    #[error(transparent)]
    Planning(#[from] WorkflowError),

    /// The workflow has more nodes than the configured budget allows.
    #[error("workflow has {actual} nodes, exceeding the configured budget of {limit}")]
    BudgetExceeded { actual: usize, limit: usize },

    /// A node was recorded into more than one partition, violating P1.
    /// Indicates a Coordinator bug, never a legitimate runtime path.
    #[error("node `{0}` was already recorded as executed, skipped, or failed")]
    AlreadyRecorded(NodeId),

    /// A JSON value failed to (de)serialize.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
