//! Structural validation and planning failures for a [`crate::Workflow`].

use dagforge_core::NodeId;

/// A validation failure returned instead of a plan.
///
/// Carries a human-readable list of every problem found, not just the
/// first one — the Graph Planner runs the structural validator to
/// completion before reporting.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// One or more structural problems (bad references, duplicate ids,
    /// unmarked fan-in) were found. Fatal: the workflow never executes.
    #[error("workflow validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The graph contains a cycle; no topological level assignment exists.
    #[error("workflow graph contains a cycle")]
    CycleDetected,
}

impl WorkflowError {
    #[must_use]
    pub fn duplicate_node(id: NodeId) -> String {
        format!("duplicate node id `{id}`")
    }

    #[must_use]
    pub fn unknown_node(id: NodeId) -> String {
        format!("connection references unknown node `{id}`")
    }

    #[must_use]
    pub fn unknown_port(node: NodeId, port: &str, direction: &str) -> String {
        format!("node `{node}` has no declared {direction} port `{port}`")
    }

    #[must_use]
    pub fn unmarked_fan_in(node: NodeId, port: &str) -> String {
        format!(
            "node `{node}` input `{port}` receives more than one edge but is not declared `repeated`"
        )
    }
}
