//! The mutable per-execution state: the three disjoint node partitions plus
//! their associated data (§3). Deliberately has no `status` field — see
//! [`crate::status`].

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use dagforge_core::{ExecutionId, NodeId, WorkflowId};
use serde::{Deserialize, Serialize};

use crate::error::ExecutionError;
use crate::runtime_value::NodeRuntimeValues;

/// Why a node was classified as skipped (§4.2, P8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// At least one inbound edge's source errored or was itself skipped.
    UpstreamFailure,
    /// Every unavailable inbound edge was unavailable only because the
    /// source completed without emitting on the referenced output port.
    ConditionalBranch,
}

/// Record of a node the Skip Resolver excluded from execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkipRecord {
    pub reason: SkipReason,
    pub blocked_by: Vec<NodeId>,
}

/// Mutable state for one workflow execution: the three disjoint node
/// partitions (executed / skipped / errored) and their payloads.
///
/// Invariants enforced by the `mark_*` methods (P1, P2):
/// - a node id appears in at most one of the three partitions;
/// - `node_outputs` keys are exactly `executed_nodes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionState {
    pub execution_id: ExecutionId,
    pub workflow_id: WorkflowId,
    node_outputs: HashMap<NodeId, NodeRuntimeValues>,
    executed_nodes: HashSet<NodeId>,
    skipped_nodes: HashMap<NodeId, SkipRecord>,
    node_errors: HashMap<NodeId, String>,
    node_usage: HashMap<NodeId, u64>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ExecutionState {
    #[must_use]
    pub fn new(execution_id: ExecutionId, workflow_id: WorkflowId) -> Self {
        Self {
            execution_id,
            workflow_id,
            node_outputs: HashMap::new(),
            executed_nodes: HashSet::new(),
            skipped_nodes: HashMap::new(),
            node_errors: HashMap::new(),
            node_usage: HashMap::new(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// True if `node_id` already occupies one of the three partitions.
    #[must_use]
    pub fn is_recorded(&self, node_id: NodeId) -> bool {
        self.executed_nodes.contains(&node_id)
            || self.skipped_nodes.contains_key(&node_id)
            || self.node_errors.contains_key(&node_id)
    }

    fn ensure_unrecorded(&self, node_id: NodeId) -> Result<(), ExecutionError> {
        if self.is_recorded(node_id) {
            return Err(ExecutionError::AlreadyRecorded(node_id));
        }
        Ok(())
    }

    /// Record a node as completed with its encoded outputs and usage cost.
    pub fn mark_completed(
        &mut self,
        node_id: NodeId,
        outputs: NodeRuntimeValues,
        usage: u64,
    ) -> Result<(), ExecutionError> {
        self.ensure_unrecorded(node_id)?;
        self.executed_nodes.insert(node_id);
        self.node_outputs.insert(node_id, outputs);
        self.node_usage.insert(node_id, usage);
        Ok(())
    }

    /// Record a node as skipped, per the Skip Resolver's classification.
    pub fn mark_skipped(
        &mut self,
        node_id: NodeId,
        reason: SkipReason,
        blocked_by: Vec<NodeId>,
    ) -> Result<(), ExecutionError> {
        self.ensure_unrecorded(node_id)?;
        self.skipped_nodes.insert(node_id, SkipRecord { reason, blocked_by });
        Ok(())
    }

    /// Record a node as failed, preserving its own error text verbatim.
    pub fn mark_failed(
        &mut self,
        node_id: NodeId,
        error: impl Into<String>,
        usage: u64,
    ) -> Result<(), ExecutionError> {
        self.ensure_unrecorded(node_id)?;
        self.node_errors.insert(node_id, error.into());
        self.node_usage.insert(node_id, usage);
        Ok(())
    }

    #[must_use]
    pub fn node_outputs(&self) -> &HashMap<NodeId, NodeRuntimeValues> {
        &self.node_outputs
    }

    #[must_use]
    pub fn node_output(&self, node_id: NodeId) -> Option<&NodeRuntimeValues> {
        self.node_outputs.get(&node_id)
    }

    #[must_use]
    pub fn executed_nodes(&self) -> &HashSet<NodeId> {
        &self.executed_nodes
    }

    #[must_use]
    pub fn skipped_nodes(&self) -> &HashMap<NodeId, SkipRecord> {
        &self.skipped_nodes
    }

    #[must_use]
    pub fn node_errors(&self) -> &HashMap<NodeId, String> {
        &self.node_errors
    }

    #[must_use]
    pub fn node_usage(&self, node_id: NodeId) -> u64 {
        self.node_usage.get(&node_id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_usage(&self) -> u64 {
        self.node_usage.values().sum()
    }

    /// Every node id visited so far, across all three partitions.
    #[must_use]
    pub fn visited_nodes(&self) -> HashSet<NodeId> {
        let mut visited: HashSet<NodeId> = self.executed_nodes.clone();
        visited.extend(self.skipped_nodes.keys().copied());
        visited.extend(self.node_errors.keys().copied());
        visited
    }
}
