//! Immutable workflow definition: nodes, ports, and connections.

use dagforge_core::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared type of a node parameter (input or output port).
///
/// Only the blob-bearing variants need to transit an `ObjectStore` during
/// encode/decode (see `dagforge-engine`'s parameter codec); everything else
/// round-trips its JSON payload unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    String,
    Number,
    Boolean,
    Json,
    /// Resolved upstream via `ResourceProvider`; encoded/decoded as a plain string.
    Secret,
    Blob(BlobKind),
}

/// Binary-bearing parameter kinds that route through the `ObjectStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobKind {
    Image,
    Audio,
    Document,
    Binary,
}

impl ParameterType {
    /// Parse a declared type name, e.g. as loaded from an external node
    /// catalog. Unrecognized names default to `String` rather than failing,
    /// per the codec's "unknown types default to string" rule.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "json" => Self::Json,
            "secret" => Self::Secret,
            "image" => Self::Blob(BlobKind::Image),
            "audio" => Self::Blob(BlobKind::Audio),
            "document" => Self::Blob(BlobKind::Document),
            "binary" => Self::Blob(BlobKind::Binary),
            _ => Self::String,
        }
    }

    /// True for parameter types whose values must transit an `ObjectStore`.
    #[must_use]
    pub fn is_blob(&self) -> bool {
        matches!(self, Self::Blob(_))
    }
}

/// A declared input port on a node type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputPort {
    pub name: String,
    pub declared_type: ParameterType,
    /// Static default used when no inbound edge supplies a value.
    pub default: Option<Value>,
    pub required: bool,
    /// If true, this port accepts values from more than one inbound edge
    /// and the wired value is an ordered list (see Input Wiring §4.3).
    pub repeated: bool,
}

impl InputPort {
    #[must_use]
    pub fn new(name: impl Into<String>, declared_type: ParameterType) -> Self {
        Self {
            name: name.into(),
            declared_type,
            default: None,
            required: false,
            repeated: false,
        }
    }

    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }
}

/// A declared output port on a node type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputPort {
    pub name: String,
    pub declared_type: ParameterType,
}

impl OutputPort {
    #[must_use]
    pub fn new(name: impl Into<String>, declared_type: ParameterType) -> Self {
        Self {
            name: name.into(),
            declared_type,
        }
    }
}

/// One node instance within a workflow.
///
/// `type_name` is a string key into the host's `NodeRegistry` — the core
/// never knows what a node actually does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub id: NodeId,
    pub type_name: String,
    pub inputs: Vec<InputPort>,
    pub outputs: Vec<OutputPort>,
}

impl NodeDefinition {
    #[must_use]
    pub fn new(id: NodeId, type_name: impl Into<String>) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_inputs(mut self, inputs: Vec<InputPort>) -> Self {
        self.inputs = inputs;
        self
    }

    #[must_use]
    pub fn with_outputs(mut self, outputs: Vec<OutputPort>) -> Self {
        self.outputs = outputs;
        self
    }

    #[must_use]
    pub fn input_port(&self, name: &str) -> Option<&InputPort> {
        self.inputs.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn output_port(&self, name: &str) -> Option<&OutputPort> {
        self.outputs.iter().find(|p| p.name == name)
    }
}

/// A directed edge from one node's output port to another node's input port.
///
/// Declaration order among edges targeting the same `(target, target_input)`
/// determines fan-in ordering for repeated inputs (§4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub source: NodeId,
    pub source_output: String,
    pub target: NodeId,
    pub target_input: String,
}

impl Connection {
    #[must_use]
    pub fn new(
        source: NodeId,
        source_output: impl Into<String>,
        target: NodeId,
        target_input: impl Into<String>,
    ) -> Self {
        Self {
            source,
            source_output: source_output.into(),
            target,
            target_input: target_input.into(),
        }
    }
}

/// The immutable workflow graph as authored: nodes and their connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: dagforge_core::WorkflowId,
    pub nodes: Vec<NodeDefinition>,
    pub connections: Vec<Connection>,
}

impl Workflow {
    #[must_use]
    pub fn new(id: dagforge_core::WorkflowId) -> Self {
        Self {
            id,
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_nodes(mut self, nodes: Vec<NodeDefinition>) -> Self {
        self.nodes = nodes;
        self
    }

    #[must_use]
    pub fn with_connections(mut self, connections: Vec<Connection>) -> Self {
        self.connections = connections;
        self
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&NodeDefinition> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Inbound connections targeting `node_id`, in declaration order.
    pub fn inbound_edges(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.target == node_id)
    }
}
