//! The external-facing [`ExecutionRecord`] snapshot: what gets persisted via
//! `ExecutionStore` and pushed to `MonitoringService` (§3, §6).

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use dagforge_core::{ExecutionId, NodeId, WorkflowId};
use serde::{Deserialize, Serialize};

use crate::context::ExecutionContext;
use crate::plan::ExecutionPlan;
use crate::state::{ExecutionState, SkipReason};
use crate::status::{derive_status, DerivedStatus};

/// Per-node status as it appears inside an [`ExecutionRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NodeExecutionRecord {
    Completed {
        node_id: NodeId,
        outputs: crate::runtime_value::NodeRuntimeValues,
        usage: u64,
    },
    Error {
        node_id: NodeId,
        error: String,
        usage: u64,
    },
    Skipped {
        node_id: NodeId,
        skip_reason: SkipReason,
        blocked_by: Vec<NodeId>,
    },
    /// Only appears in in-flight snapshots: the level currently running.
    Executing { node_id: NodeId },
    /// Only appears in in-flight snapshots: not reached yet.
    Idle { node_id: NodeId },
}

impl NodeExecutionRecord {
    #[must_use]
    pub fn node_id(&self) -> NodeId {
        match self {
            Self::Completed { node_id, .. }
            | Self::Error { node_id, .. }
            | Self::Skipped { node_id, .. }
            | Self::Executing { node_id }
            | Self::Idle { node_id } => *node_id,
        }
    }
}

/// The record persisted via `ExecutionStore` and pushed to
/// `MonitoringService`. Built fresh from the plan and state every time —
/// never cached alongside a mutable status field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: ExecutionId,
    pub workflow_id: WorkflowId,
    pub deployment_id: Option<String>,
    pub organization_id: String,
    pub user_id: Option<String>,
    pub status: DerivedStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub node_executions: Vec<NodeExecutionRecord>,
}

impl ExecutionRecord {
    /// The very first snapshot the Coordinator emits, before planning has
    /// even run. There is no plan yet, so there are no `node_executions`.
    #[must_use]
    pub fn submitted(ctx: &ExecutionContext) -> Self {
        Self {
            id: ctx.execution_id,
            workflow_id: ctx.workflow_id,
            deployment_id: ctx.deployment_id.clone(),
            organization_id: ctx.organization_id.clone(),
            user_id: ctx.user_id.clone(),
            status: DerivedStatus::Submitted,
            started_at: None,
            ended_at: None,
            error: None,
            node_executions: Vec::new(),
        }
    }

    /// A terminal record for a failure that happened before a plan could be
    /// produced (bad workflow structure, a cycle, an oversized workflow).
    /// No nodes ran, so there is nothing to list in `node_executions`.
    #[must_use]
    pub fn fatal(ctx: &ExecutionContext, message: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ctx.execution_id,
            workflow_id: ctx.workflow_id,
            deployment_id: ctx.deployment_id.clone(),
            organization_id: ctx.organization_id.clone(),
            user_id: ctx.user_id.clone(),
            status: DerivedStatus::Error,
            started_at: Some(now),
            ended_at: Some(now),
            error: Some(message.into()),
            node_executions: Vec::new(),
        }
    }

    /// Build a record for the current instant.
    ///
    /// `executing_now` is the set of node ids in the level currently being
    /// applied; every other unvisited node is reported `idle`. Pass an
    /// empty set for the final, terminal snapshot.
    ///
    /// `system_error`, when set, becomes the top-level error message unless
    /// a node-level error already exists — an unknown Coordinator or
    /// platform exception never masks a node's own diagnostic (§7 taxonomy
    /// item 4).
    #[must_use]
    pub fn build(
        ctx: &ExecutionContext,
        plan: &ExecutionPlan,
        state: &ExecutionState,
        exhausted: bool,
        executing_now: &HashSet<NodeId>,
        system_error: Option<&str>,
    ) -> Self {
        let status = derive_status(plan, state, exhausted);

        let node_executions = plan
            .ordered_node_ids()
            .into_iter()
            .map(|node_id| {
                if let Some(outputs) = state.node_output(node_id) {
                    NodeExecutionRecord::Completed {
                        node_id,
                        outputs: outputs.clone(),
                        usage: state.node_usage(node_id),
                    }
                } else if let Some(error) = state.node_errors().get(&node_id) {
                    NodeExecutionRecord::Error {
                        node_id,
                        error: error.clone(),
                        usage: state.node_usage(node_id),
                    }
                } else if let Some(skip) = state.skipped_nodes().get(&node_id) {
                    NodeExecutionRecord::Skipped {
                        node_id,
                        skip_reason: skip.reason,
                        blocked_by: skip.blocked_by.clone(),
                    }
                } else if executing_now.contains(&node_id) {
                    NodeExecutionRecord::Executing { node_id }
                } else {
                    NodeExecutionRecord::Idle { node_id }
                }
            })
            .collect();

        // When any node errored, the top-level error is the generic
        // message so per-node diagnostics stay in `node_executions`
        // instead of being duplicated or masked at the top level (§7).
        let error = if !state.node_errors().is_empty() {
            Some("Workflow execution failed".to_string())
        } else if exhausted {
            Some("Insufficient compute credits".to_string())
        } else {
            system_error.map(ToString::to_string)
        };

        Self {
            id: ctx.execution_id,
            workflow_id: ctx.workflow_id,
            deployment_id: ctx.deployment_id.clone(),
            organization_id: ctx.organization_id.clone(),
            user_id: ctx.user_id.clone(),
            status,
            started_at: state.started_at,
            ended_at: state.completed_at,
            error,
            node_executions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::ExecutionBudget;
    use crate::runtime_value::NodeRuntimeValues;
    use dagforge_workflow::{InputPort, NodeDefinition, OutputPort, ParameterType, Workflow};
    use pretty_assertions::assert_eq;

    #[test]
    fn exhausted_record_has_no_node_executions_beyond_idle() {
        let node = NodeId::v4();
        let wf = Workflow::new(WorkflowId::v4()).with_nodes(vec![
            NodeDefinition::new(node, "noop")
                .with_inputs(vec![InputPort::new("a", ParameterType::Number)])
                .with_outputs(vec![OutputPort::new("result", ParameterType::Number)]),
        ]);
        let plan = ExecutionPlan::from_workflow(ExecutionId::v4(), &wf, &ExecutionBudget::default())
            .unwrap();
        let ctx = ExecutionContext::new(plan.execution_id, plan.workflow_id, "org-1");
        let state = ExecutionState::new(plan.execution_id, plan.workflow_id);

        let record = ExecutionRecord::build(&ctx, &plan, &state, true, &HashSet::new(), None);
        assert_eq!(record.status, DerivedStatus::Exhausted);
        assert_eq!(record.error.as_deref(), Some("Insufficient compute credits"));
        assert!(matches!(record.node_executions[0], NodeExecutionRecord::Idle { .. }));
    }

    #[test]
    fn any_node_error_produces_generic_top_level_message() {
        let node = NodeId::v4();
        let wf = Workflow::new(WorkflowId::v4()).with_nodes(vec![
            NodeDefinition::new(node, "noop")
                .with_inputs(vec![InputPort::new("a", ParameterType::Number)])
                .with_outputs(vec![OutputPort::new("result", ParameterType::Number)]),
        ]);
        let plan = ExecutionPlan::from_workflow(ExecutionId::v4(), &wf, &ExecutionBudget::default())
            .unwrap();
        let ctx = ExecutionContext::new(plan.execution_id, plan.workflow_id, "org-1");
        let mut state = ExecutionState::new(plan.execution_id, plan.workflow_id);
        state.mark_failed(node, "division by zero", 1).unwrap();

        let record = ExecutionRecord::build(&ctx, &plan, &state, false, &HashSet::new(), None);
        assert_eq!(record.status, DerivedStatus::Error);
        assert_eq!(record.error.as_deref(), Some("Workflow execution failed"));
        match &record.node_executions[0] {
            NodeExecutionRecord::Error { error, .. } => assert_eq!(error, "division by zero"),
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[test]
    fn completed_record_has_no_top_level_error() {
        let node = NodeId::v4();
        let wf = Workflow::new(WorkflowId::v4()).with_nodes(vec![
            NodeDefinition::new(node, "noop")
                .with_inputs(vec![InputPort::new("a", ParameterType::Number)])
                .with_outputs(vec![OutputPort::new("result", ParameterType::Number)]),
        ]);
        let plan = ExecutionPlan::from_workflow(ExecutionId::v4(), &wf, &ExecutionBudget::default())
            .unwrap();
        let ctx = ExecutionContext::new(plan.execution_id, plan.workflow_id, "org-1");
        let mut state = ExecutionState::new(plan.execution_id, plan.workflow_id);
        state.mark_completed(node, NodeRuntimeValues::new(), 1).unwrap();

        let record = ExecutionRecord::build(&ctx, &plan, &state, false, &HashSet::new(), None);
        assert_eq!(record.status, DerivedStatus::Completed);
        assert!(record.error.is_none());
    }
}
