//! DAG construction, structural validation, and topological levelization.

use std::collections::{HashMap, HashSet};

use dagforge_core::NodeId;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::error::WorkflowError;
use crate::model::Workflow;

/// The dependency graph derived from a [`Workflow`]: one vertex per node,
/// one edge per connection, validated against the workflow's declared ports.
///
/// This is the graph half of the Graph Planner (§4.1); `compute_levels`
/// implements Kahn's algorithm with level tracking.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<NodeId, ()>,
    index_of: HashMap<NodeId, NodeIndex>,
}

impl DependencyGraph {
    /// Build and structurally validate the dependency graph for `workflow`.
    ///
    /// Validates, in one pass, that: node ids are unique; every connection
    /// references existing nodes and declared ports; and no two connections
    /// target the same `(node, input)` pair unless that input is declared
    /// `repeated`. All problems found are collected before returning.
    pub fn from_definition(workflow: &Workflow) -> Result<Self, WorkflowError> {
        let mut problems = Vec::new();
        let mut graph = DiGraph::new();
        let mut index_of = HashMap::with_capacity(workflow.nodes.len());

        for node in &workflow.nodes {
            if index_of.contains_key(&node.id) {
                problems.push(WorkflowError::duplicate_node(node.id));
                continue;
            }
            index_of.insert(node.id, graph.add_node(node.id));
        }

        let mut fan_in_counts: HashMap<(NodeId, String), usize> = HashMap::new();

        for conn in &workflow.connections {
            let source_node = workflow.node(conn.source);
            let target_node = workflow.node(conn.target);

            match source_node {
                Some(n) if n.output_port(&conn.source_output).is_some() => {}
                Some(_) => problems.push(WorkflowError::unknown_port(
                    conn.source,
                    &conn.source_output,
                    "output",
                )),
                None => problems.push(WorkflowError::unknown_node(conn.source)),
            }

            match target_node {
                Some(n) if n.input_port(&conn.target_input).is_some() => {}
                Some(_) => problems.push(WorkflowError::unknown_port(
                    conn.target,
                    &conn.target_input,
                    "input",
                )),
                None => problems.push(WorkflowError::unknown_node(conn.target)),
            }

            if let (Some(&from), Some(&to)) =
                (index_of.get(&conn.source), index_of.get(&conn.target))
            {
                graph.add_edge(from, to, ());
            }

            *fan_in_counts
                .entry((conn.target, conn.target_input.clone()))
                .or_insert(0) += 1;
        }

        for ((node_id, port), count) in fan_in_counts {
            if count <= 1 {
                continue;
            }
            let allows_repeated = workflow
                .node(node_id)
                .and_then(|n| n.input_port(&port))
                .is_some_and(|p| p.repeated);
            if !allows_repeated {
                problems.push(WorkflowError::unmarked_fan_in(node_id, &port));
            }
        }

        if !problems.is_empty() {
            return Err(WorkflowError::Validation(problems));
        }

        Ok(Self { graph, index_of })
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Node ids with no inbound connections.
    #[must_use]
    pub fn entry_nodes(&self) -> Vec<NodeId> {
        self.graph
            .node_indices()
            .filter(|&ix| {
                self.graph
                    .edges_directed(ix, petgraph::Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|ix| self.graph[ix])
            .collect()
    }

    /// Node ids with no outbound connections.
    #[must_use]
    pub fn exit_nodes(&self) -> Vec<NodeId> {
        self.graph
            .node_indices()
            .filter(|&ix| {
                self.graph
                    .edges_directed(ix, petgraph::Direction::Outgoing)
                    .next()
                    .is_none()
            })
            .map(|ix| self.graph[ix])
            .collect()
    }

    /// Direct predecessors of `node_id`, i.e. sources of inbound connections.
    #[must_use]
    pub fn predecessors(&self, node_id: NodeId) -> Vec<NodeId> {
        let Some(&ix) = self.index_of.get(&node_id) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(ix, petgraph::Direction::Incoming)
            .map(|e| self.graph[e.source()])
            .collect()
    }

    /// Compute topological levels via Kahn's algorithm.
    ///
    /// Level 0 is every node with in-degree 0; level `k` is every node all
    /// of whose predecessors are in levels `0..k`. If fewer nodes are
    /// levelized than exist in the graph, a cycle exists and this returns
    /// [`WorkflowError::CycleDetected`] (P4).
    pub fn compute_levels(&self) -> Result<Vec<Vec<NodeId>>, WorkflowError> {
        if self.graph.node_count() == 0 {
            return Ok(Vec::new());
        }

        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|ix| {
                (
                    ix,
                    self.graph
                        .edges_directed(ix, petgraph::Direction::Incoming)
                        .count(),
                )
            })
            .collect();

        let mut levels = Vec::new();
        let mut remaining: HashSet<NodeIndex> = self.graph.node_indices().collect();

        while !remaining.is_empty() {
            let ready: Vec<NodeIndex> = remaining
                .iter()
                .copied()
                .filter(|ix| in_degree[ix] == 0)
                .collect();

            if ready.is_empty() {
                return Err(WorkflowError::CycleDetected);
            }

            for &ix in &ready {
                remaining.remove(&ix);
                for edge in self.graph.edges_directed(ix, petgraph::Direction::Outgoing) {
                    let target = edge.target();
                    if let Some(count) = in_degree.get_mut(&target) {
                        *count -= 1;
                    }
                }
            }

            let mut level: Vec<NodeId> = ready.into_iter().map(|ix| self.graph[ix]).collect();
            level.sort_by_key(ToString::to_string);
            levels.push(level);
        }

        Ok(levels)
    }

    /// All node ids, flattened in level order (levels must be computed
    /// first; this recomputes them for convenience).
    pub fn ordered_node_ids(&self) -> Result<Vec<NodeId>, WorkflowError> {
        Ok(self.compute_levels()?.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Connection, InputPort, NodeDefinition, OutputPort, ParameterType};
    use dagforge_core::WorkflowId;
    use pretty_assertions::assert_eq;

    fn node(id: NodeId) -> NodeDefinition {
        NodeDefinition::new(id, "noop")
            .with_inputs(vec![InputPort::new("a", ParameterType::Number)])
            .with_outputs(vec![OutputPort::new("result", ParameterType::Number)])
    }

    #[test]
    fn empty_workflow_has_no_levels() {
        let wf = Workflow::new(WorkflowId::v4());
        let graph = DependencyGraph::from_definition(&wf).unwrap();
        assert_eq!(graph.compute_levels().unwrap(), Vec::<Vec<NodeId>>::new());
    }

    #[test]
    fn linear_chain_has_one_level_each() {
        let (a, b, c) = (NodeId::v4(), NodeId::v4(), NodeId::v4());
        let wf = Workflow::new(WorkflowId::v4())
            .with_nodes(vec![node(a), node(b), node(c)])
            .with_connections(vec![
                Connection::new(a, "result", b, "a"),
                Connection::new(b, "result", c, "a"),
            ]);
        let graph = DependencyGraph::from_definition(&wf).unwrap();
        let levels = graph.compute_levels().unwrap();
        assert_eq!(levels, vec![vec![a], vec![b], vec![c]]);
    }

    #[test]
    fn diamond_has_three_levels() {
        let (a, b, c, d) = (NodeId::v4(), NodeId::v4(), NodeId::v4(), NodeId::v4());
        let mut d_node = node(d);
        d_node.inputs.push(InputPort::new("b", ParameterType::Number));
        let wf = Workflow::new(WorkflowId::v4())
            .with_nodes(vec![node(a), node(b), node(c), d_node])
            .with_connections(vec![
                Connection::new(a, "result", b, "a"),
                Connection::new(a, "result", c, "a"),
                Connection::new(b, "result", d, "a"),
                Connection::new(c, "result", d, "b"),
            ]);
        let graph = DependencyGraph::from_definition(&wf).unwrap();
        let levels = graph.compute_levels().unwrap();
        assert_eq!(levels.len(), 3);
        assert_eq!(levels[0], vec![a]);
        let mut middle = levels[1].clone();
        middle.sort_by_key(ToString::to_string);
        let mut expected_middle = vec![b, c];
        expected_middle.sort_by_key(ToString::to_string);
        assert_eq!(middle, expected_middle);
        assert_eq!(levels[2], vec![d]);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let a = NodeId::v4();
        let mut a_node = node(a);
        a_node.inputs.push(InputPort::new("b", ParameterType::Number));
        let wf = Workflow::new(WorkflowId::v4())
            .with_nodes(vec![a_node])
            .with_connections(vec![Connection::new(a, "result", a, "a")]);
        let graph = DependencyGraph::from_definition(&wf).unwrap();
        assert!(matches!(
            graph.compute_levels(),
            Err(WorkflowError::CycleDetected)
        ));
    }

    #[test]
    fn two_node_cycle_is_detected() {
        let (a, b) = (NodeId::v4(), NodeId::v4());
        let wf = Workflow::new(WorkflowId::v4())
            .with_nodes(vec![node(a), node(b)])
            .with_connections(vec![
                Connection::new(a, "result", b, "a"),
                Connection::new(b, "result", a, "a"),
            ]);
        let graph = DependencyGraph::from_definition(&wf).unwrap();
        assert!(matches!(
            graph.compute_levels(),
            Err(WorkflowError::CycleDetected)
        ));
    }

    #[test]
    fn duplicate_node_id_is_rejected() {
        let a = NodeId::v4();
        let wf = Workflow::new(WorkflowId::v4()).with_nodes(vec![node(a), node(a)]);
        assert!(matches!(
            DependencyGraph::from_definition(&wf),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn connection_to_unknown_port_is_rejected() {
        let (a, b) = (NodeId::v4(), NodeId::v4());
        let wf = Workflow::new(WorkflowId::v4())
            .with_nodes(vec![node(a), node(b)])
            .with_connections(vec![Connection::new(a, "result", b, "not_a_port")]);
        let err = DependencyGraph::from_definition(&wf).unwrap_err();
        match err {
            WorkflowError::Validation(problems) => {
                assert!(problems.iter().any(|p| p.contains("not_a_port")));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn unmarked_fan_in_is_rejected() {
        let (a, b, c) = (NodeId::v4(), NodeId::v4(), NodeId::v4());
        let wf = Workflow::new(WorkflowId::v4())
            .with_nodes(vec![node(a), node(b), node(c)])
            .with_connections(vec![
                Connection::new(a, "result", c, "a"),
                Connection::new(b, "result", c, "a"),
            ]);
        assert!(matches!(
            DependencyGraph::from_definition(&wf),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn repeated_input_allows_fan_in() {
        let (a, b, c) = (NodeId::v4(), NodeId::v4(), NodeId::v4());
        let mut c_node = NodeDefinition::new(c, "join")
            .with_inputs(vec![InputPort::new("items", ParameterType::String).repeated()]);
        c_node.outputs = vec![OutputPort::new("result", ParameterType::String)];
        let wf = Workflow::new(WorkflowId::v4())
            .with_nodes(vec![node(a), node(b), c_node])
            .with_connections(vec![
                Connection::new(a, "result", c, "items"),
                Connection::new(b, "result", c, "items"),
            ]);
        assert!(DependencyGraph::from_definition(&wf).is_ok());
    }

    #[test]
    fn entry_and_exit_nodes() {
        let (a, b, c) = (NodeId::v4(), NodeId::v4(), NodeId::v4());
        let wf = Workflow::new(WorkflowId::v4())
            .with_nodes(vec![node(a), node(b), node(c)])
            .with_connections(vec![
                Connection::new(a, "result", b, "a"),
                Connection::new(b, "result", c, "a"),
            ]);
        let graph = DependencyGraph::from_definition(&wf).unwrap();
        assert_eq!(graph.entry_nodes(), vec![a]);
        assert_eq!(graph.exit_nodes(), vec![c]);
        assert_eq!(graph.predecessors(c), vec![b]);
    }
}
