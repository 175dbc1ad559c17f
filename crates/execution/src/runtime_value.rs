//! The wire format exchanged between nodes: [`RuntimeValue`] and the
//! per-node mapping [`NodeRuntimeValues`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An opaque reference to binary content held in an `ObjectStore`.
///
/// Content-addressed or id-addressed at the host's discretion; the core
/// never interprets `id`, only passes it back to the store on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobHandle {
    pub id: String,
    pub mime_type: String,
}

impl BlobHandle {
    #[must_use]
    pub fn new(id: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// A JSON-serializable value exchanged between nodes, or a handle to binary
/// content stored out of band.
///
/// Produced by a node's output, consumed by downstream nodes' inputs, and
/// persisted in [`crate::ExecutionState`] for the life of the workflow
/// instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuntimeValue {
    Json(Value),
    Blob(BlobHandle),
}

impl RuntimeValue {
    #[must_use]
    pub fn json(value: impl Into<Value>) -> Self {
        Self::Json(value.into())
    }

    #[must_use]
    pub fn blob(handle: BlobHandle) -> Self {
        Self::Blob(handle)
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Blob(_) => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&BlobHandle> {
        match self {
            Self::Blob(h) => Some(h),
            Self::Json(_) => None,
        }
    }
}

/// A wired value for a single input or output port: either one value, or an
/// ordered list for `repeated` ports (fan-in, §4.3 / P9).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WiredValue {
    Single(RuntimeValue),
    Repeated(Vec<RuntimeValue>),
}

impl WiredValue {
    /// Flatten to a list of runtime values regardless of arity.
    #[must_use]
    pub fn into_values(self) -> Vec<RuntimeValue> {
        match self {
            Self::Single(v) => vec![v],
            Self::Repeated(vs) => vs,
        }
    }
}

/// Mapping from parameter name to its wired value, for one node's inputs or
/// outputs.
pub type NodeRuntimeValues = HashMap<String, WiredValue>;
