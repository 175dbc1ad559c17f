//! The boundary between the engine and a node's own implementation (§4.5, §6).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dagforge_core::{NodeId, WorkflowId};
use dagforge_execution::TriggerPayload;

use crate::error::PortError;
use crate::registry::NodeRegistry;
use crate::resource::ResourceProvider;
use crate::secure::SecureString;

/// Everything a node implementation receives when invoked.
///
/// Exposes the processed input map, lazy credential/integration lookups
/// routed through the host's [`ResourceProvider`], the triggering payload
/// (opaque to the core), and a read-only catalogue of other invokable node
/// types (the "ToolRegistry" of §9) for nodes that themselves dispatch to
/// other node types (e.g. an AI-agent node calling tool nodes).
///
/// Not `Clone`: a context is built fresh per invocation by the Node Invoker
/// and consumed by exactly one `execute` call.
pub struct InvocationContext {
    pub node_id: NodeId,
    pub workflow_id: WorkflowId,
    pub organization_id: String,
    pub deployment_id: Option<String>,
    pub inputs: HashMap<String, serde_json::Value>,
    pub trigger: Option<TriggerPayload>,
    resources: Arc<dyn ResourceProvider>,
    tool_registry: Arc<dyn NodeRegistry>,
}

impl InvocationContext {
    #[must_use]
    pub fn new(
        node_id: NodeId,
        workflow_id: WorkflowId,
        organization_id: impl Into<String>,
        inputs: HashMap<String, serde_json::Value>,
        resources: Arc<dyn ResourceProvider>,
        tool_registry: Arc<dyn NodeRegistry>,
    ) -> Self {
        Self {
            node_id,
            workflow_id,
            organization_id: organization_id.into(),
            deployment_id: None,
            inputs,
            trigger: None,
            resources,
            tool_registry,
        }
    }

    #[must_use]
    pub fn with_deployment_id(mut self, deployment_id: impl Into<String>) -> Self {
        self.deployment_id = Some(deployment_id.into());
        self
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: TriggerPayload) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Resolve a secret by name, via the host's `ResourceProvider`.
    pub async fn get_secret(&self, name: &str) -> Result<SecureString, PortError> {
        self.resources.get_secret(&self.organization_id, name).await
    }

    /// Resolve an integration handle by id, via the host's `ResourceProvider`.
    pub async fn get_integration(&self, id: &str) -> Result<serde_json::Value, PortError> {
        self.resources.get_integration(&self.organization_id, id).await
    }

    /// Read-only catalogue of other invokable node types, for nodes that
    /// dispatch to other node types at runtime.
    #[must_use]
    pub fn tool_registry(&self) -> &Arc<dyn NodeRegistry> {
        &self.tool_registry
    }
}

impl fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationContext")
            .field("node_id", &self.node_id)
            .field("workflow_id", &self.workflow_id)
            .field("organization_id", &self.organization_id)
            .field("deployment_id", &self.deployment_id)
            .finish_non_exhaustive()
    }
}

/// Result of one node invocation (§4.5, §6). Deliberately narrower than a
/// general-purpose action-result type: the core only ever branches on
/// completed-vs-failed; richer flow control (branching, waiting, iteration)
/// is a node-type concern expressed through its own output ports, not the
/// engine's contract.
#[derive(Debug, Clone)]
pub enum NodeResult {
    Completed {
        outputs: HashMap<String, serde_json::Value>,
        usage: u64,
    },
    Failed {
        error: String,
        usage: u64,
    },
}

impl NodeResult {
    #[must_use]
    pub fn completed(outputs: HashMap<String, serde_json::Value>, usage: u64) -> Self {
        Self::Completed { outputs, usage }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>, usage: u64) -> Self {
        Self::Failed {
            error: error.into(),
            usage,
        }
    }

    #[must_use]
    pub fn usage(&self) -> u64 {
        match self {
            Self::Completed { usage, .. } | Self::Failed { usage, .. } => *usage,
        }
    }
}

/// A registered node type's executable behavior.
///
/// Implementations are discovered through [`NodeRegistry::create_executable`].
/// Mirrors a narrow capability interface rather than a deep class
/// hierarchy (§9 polymorphism note): one method, no inheritance.
#[async_trait]
pub trait Invokable: Send + Sync {
    /// Run this node. A panic inside an implementation is the
    /// implementation's bug; the Node Invoker only catches ordinary
    /// `Result` failures, never unwinding panics, per §4.5 step 5's intent
    /// that errors surface as data, not exceptions.
    async fn execute(&self, ctx: InvocationContext) -> NodeResult;
}
