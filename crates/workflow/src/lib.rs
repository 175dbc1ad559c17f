//! Workflow definition and dependency graph for the dagforge workflow engine.
//!
//! - [`model`]: the immutable [`Workflow`]/[`NodeDefinition`]/[`Connection`]
//!   data model authored by a user.
//! - [`graph`]: [`DependencyGraph`], the structural validator and
//!   topological levelizer (Kahn's algorithm) that backs the Graph Planner.
//! - [`error`]: [`WorkflowError`], returned on validation failure or cycle.

pub mod error;
pub mod graph;
pub mod model;

pub use error::WorkflowError;
pub use graph::DependencyGraph;
pub use model::{
    BlobKind, Connection, InputPort, NodeDefinition, OutputPort, ParameterType, Workflow,
};
