//! Stable step-name construction for the Durable Step Wrapper (§4.7).
//!
//! The Durable Step Wrapper itself is an external collaborator (see
//! `dagforge-ports::DurableStep`); this module only builds the stable
//! names the Coordinator and Level Executor pass to it.

use dagforge_core::{ExecutionId, NodeId};
use std::fmt;

/// A stable, execution-scoped step name.
///
/// Two calls with equal `IdempotencyKey`s within the same process or across
/// a restart must resolve to the same cached durable-step result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Build the key for a named step, e.g. `initialise workflow`.
    #[must_use]
    pub fn for_step(execution_id: ExecutionId, step_name: &str) -> Self {
        Self(format!("{execution_id}:{step_name}"))
    }

    /// Build the key for `run node {nodeId}`, the step name used by the
    /// Level Executor for each node invocation.
    #[must_use]
    pub fn for_node(execution_id: ExecutionId, node_id: NodeId) -> Self {
        Self::for_step(execution_id, &format!("run node {node_id}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
