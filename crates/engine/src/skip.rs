//! Skip Resolver (§4.2): decides whether a node must be excluded from
//! execution given the outcomes of its upstream nodes, and classifies why.

use dagforge_core::NodeId;
use dagforge_execution::{ExecutionState, SkipReason};
use dagforge_workflow::Workflow;

/// The Skip Resolver's verdict for one node, given the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipVerdict {
    /// The node is eligible to run: either it has no inbound edges, or at
    /// least one inbound edge's source is available.
    Execute,
    /// The node must be excluded; `blocked_by` lists the upstream node ids
    /// responsible (deduplicated, in edge declaration order).
    Skip {
        reason: SkipReason,
        blocked_by: Vec<NodeId>,
    },
}

/// Classify `node_id` against `state` (§4.2).
///
/// A node with zero inbound edges is always [`SkipVerdict::Execute`] — it
/// draws only from static defaults. Otherwise it is skipped iff *every*
/// inbound edge is unavailable, where an edge s→t:sp is unavailable iff:
/// 1. `s` is in `nodeErrors`, or
/// 2. `s` is in `skippedNodes`, or
/// 3. `s` completed but did not emit `sourceOutput` (conditional branch).
///
/// Reason is `upstream_failure` if any unavailable edge is due to (1) or
/// (2); otherwise (every unavailable edge is due to (3) alone) the reason
/// is `conditional_branch`.
#[must_use]
pub fn classify(node_id: NodeId, workflow: &Workflow, state: &ExecutionState) -> SkipVerdict {
    let inbound: Vec<_> = workflow.inbound_edges(node_id).collect();
    if inbound.is_empty() {
        return SkipVerdict::Execute;
    }

    let mut unavailable_failure: Vec<NodeId> = Vec::new();
    let mut unavailable_conditional: Vec<NodeId> = Vec::new();

    for edge in &inbound {
        let source = edge.source;
        if state.node_errors().contains_key(&source) || state.skipped_nodes().contains_key(&source)
        {
            if !unavailable_failure.contains(&source) {
                unavailable_failure.push(source);
            }
            continue;
        }

        match state.node_output(source) {
            Some(outputs) if outputs.contains_key(&edge.source_output) => {
                // Available: this edge alone makes the node eligible.
                return SkipVerdict::Execute;
            }
            Some(_) => {
                // Completed but did not emit this port: conditional branch.
                if !unavailable_conditional.contains(&source) {
                    unavailable_conditional.push(source);
                }
            }
            None => {
                // Source has not been visited yet; the Level Executor only
                // calls classify once every predecessor has been applied
                // (cross-level barrier), so this should not happen for a
                // well-formed plan. Treat conservatively as unavailable
                // without resolving eligibility.
                if !unavailable_conditional.contains(&source) {
                    unavailable_conditional.push(source);
                }
            }
        }
    }

    if !unavailable_failure.is_empty() {
        SkipVerdict::Skip {
            reason: SkipReason::UpstreamFailure,
            blocked_by: unavailable_failure,
        }
    } else {
        SkipVerdict::Skip {
            reason: SkipReason::ConditionalBranch,
            blocked_by: unavailable_conditional,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagforge_core::{ExecutionId, WorkflowId};
    use dagforge_execution::runtime_value::{NodeRuntimeValues, RuntimeValue, WiredValue};
    use dagforge_workflow::{Connection, InputPort, NodeDefinition, OutputPort, ParameterType};
    use pretty_assertions::assert_eq;

    fn port_node(id: NodeId) -> NodeDefinition {
        NodeDefinition::new(id, "noop")
            .with_inputs(vec![InputPort::new("a", ParameterType::Number)])
            .with_outputs(vec![OutputPort::new("result", ParameterType::Number)])
    }

    fn new_state() -> ExecutionState {
        ExecutionState::new(ExecutionId::v4(), WorkflowId::v4())
    }

    fn outputs_with(port: &str) -> NodeRuntimeValues {
        let mut m = NodeRuntimeValues::new();
        m.insert(
            port.to_string(),
            WiredValue::Single(RuntimeValue::json(serde_json::json!(1))),
        );
        m
    }

    #[test]
    fn node_with_no_inbound_edges_always_executes() {
        let a = NodeId::v4();
        let wf = Workflow::new(WorkflowId::v4()).with_nodes(vec![port_node(a)]);
        let state = new_state();
        assert_eq!(classify(a, &wf, &state), SkipVerdict::Execute);
    }

    #[test]
    fn available_source_makes_node_eligible() {
        let (a, b) = (NodeId::v4(), NodeId::v4());
        let wf = Workflow::new(WorkflowId::v4())
            .with_nodes(vec![port_node(a), port_node(b)])
            .with_connections(vec![Connection::new(a, "result", b, "a")]);
        let mut state = new_state();
        state.mark_completed(a, outputs_with("result"), 1).unwrap();
        assert_eq!(classify(b, &wf, &state), SkipVerdict::Execute);
    }

    #[test]
    fn errored_source_yields_upstream_failure() {
        let (a, b) = (NodeId::v4(), NodeId::v4());
        let wf = Workflow::new(WorkflowId::v4())
            .with_nodes(vec![port_node(a), port_node(b)])
            .with_connections(vec![Connection::new(a, "result", b, "a")]);
        let mut state = new_state();
        state.mark_failed(a, "division by zero", 1).unwrap();
        assert_eq!(
            classify(b, &wf, &state),
            SkipVerdict::Skip {
                reason: SkipReason::UpstreamFailure,
                blocked_by: vec![a],
            }
        );
    }

    #[test]
    fn skipped_source_yields_upstream_failure() {
        let (a, b) = (NodeId::v4(), NodeId::v4());
        let wf = Workflow::new(WorkflowId::v4())
            .with_nodes(vec![port_node(a), port_node(b)])
            .with_connections(vec![Connection::new(a, "result", b, "a")]);
        let mut state = new_state();
        state
            .mark_skipped(a, SkipReason::ConditionalBranch, vec![])
            .unwrap();
        assert_eq!(
            classify(b, &wf, &state),
            SkipVerdict::Skip {
                reason: SkipReason::UpstreamFailure,
                blocked_by: vec![a],
            }
        );
    }

    #[test]
    fn source_completed_without_emitting_port_is_conditional_branch() {
        let (a, b) = (NodeId::v4(), NodeId::v4());
        let wf = Workflow::new(WorkflowId::v4())
            .with_nodes(vec![port_node(a), port_node(b)])
            .with_connections(vec![Connection::new(a, "false", b, "a")]);
        let mut state = new_state();
        // `a` only emits `result`, not `false` — a conditional node's
        // untaken branch.
        state.mark_completed(a, outputs_with("result"), 1).unwrap();
        assert_eq!(
            classify(b, &wf, &state),
            SkipVerdict::Skip {
                reason: SkipReason::ConditionalBranch,
                blocked_by: vec![a],
            }
        );
    }

    #[test]
    fn mixed_unavailability_prefers_upstream_failure_reason() {
        let (a, b, c) = (NodeId::v4(), NodeId::v4(), NodeId::v4());
        let mut c_node = port_node(c);
        c_node
            .inputs
            .push(InputPort::new("b", ParameterType::Number));
        let wf = Workflow::new(WorkflowId::v4())
            .with_nodes(vec![port_node(a), port_node(b), c_node])
            .with_connections(vec![
                Connection::new(a, "false", c, "a"),
                Connection::new(b, "result", c, "b"),
            ]);
        let mut state = new_state();
        state.mark_completed(a, outputs_with("result"), 1).unwrap();
        state.mark_failed(b, "boom", 1).unwrap();
        assert_eq!(
            classify(c, &wf, &state),
            SkipVerdict::Skip {
                reason: SkipReason::UpstreamFailure,
                blocked_by: vec![b],
            }
        );
    }

    #[test]
    fn one_available_edge_overrides_other_unavailable_edges() {
        let (a, b, c) = (NodeId::v4(), NodeId::v4(), NodeId::v4());
        let mut c_node = port_node(c);
        c_node
            .inputs
            .push(InputPort::new("b", ParameterType::Number));
        let wf = Workflow::new(WorkflowId::v4())
            .with_nodes(vec![port_node(a), port_node(b), c_node])
            .with_connections(vec![
                Connection::new(a, "result", c, "a"),
                Connection::new(b, "result", c, "b"),
            ]);
        let mut state = new_state();
        state.mark_completed(a, outputs_with("result"), 1).unwrap();
        state.mark_failed(b, "boom", 1).unwrap();
        assert_eq!(classify(c, &wf, &state), SkipVerdict::Execute);
    }
}
