//! The immutable execution plan derived once per workflow instance.

use chrono::{DateTime, Utc};
use dagforge_core::{ExecutionId, NodeId, WorkflowId};
use dagforge_workflow::{DependencyGraph, Workflow};
use serde::{Deserialize, Serialize};

use crate::budget::ExecutionBudget;
use crate::error::ExecutionError;

/// An ordered sequence of levels, each a non-empty set of node ids that may
/// run concurrently (§3, §4.1).
///
/// For every connection s→t, `level(s) < level(t)`; if that cannot be
/// satisfied the workflow graph has a cycle and planning fails before an
/// `ExecutionPlan` is ever produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub execution_id: ExecutionId,
    pub workflow_id: WorkflowId,
    pub levels: Vec<Vec<NodeId>>,
    pub created_at: DateTime<Utc>,
}

impl ExecutionPlan {
    /// Validate `workflow` and compute its topological levels.
    ///
    /// Rejects workflows exceeding `budget.max_total_nodes` and workflows
    /// whose graph contains a cycle (both fatal per §7 taxonomy item 1).
    pub fn from_workflow(
        execution_id: ExecutionId,
        workflow: &Workflow,
        budget: &ExecutionBudget,
    ) -> Result<Self, ExecutionError> {
        if workflow.nodes.len() > budget.max_total_nodes {
            return Err(ExecutionError::BudgetExceeded {
                actual: workflow.nodes.len(),
                limit: budget.max_total_nodes,
            });
        }

        let graph = DependencyGraph::from_definition(workflow)?;
        let levels = graph.compute_levels()?;

        Ok(Self {
            execution_id,
            workflow_id: workflow.id,
            levels,
            created_at: Utc::now(),
        })
    }

    /// Total number of nodes across all levels.
    #[must_use]
    pub fn total_nodes(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    /// All node ids, flattened in level order. Used by the Status Deriver
    /// to determine whether every node has been visited.
    #[must_use]
    pub fn ordered_node_ids(&self) -> Vec<NodeId> {
        self.levels.iter().flatten().copied().collect()
    }
}
