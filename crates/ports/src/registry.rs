//! Node-type discovery (§4.1 step 2, §4.5 step 2, §6).

use std::sync::Arc;

use async_trait::async_trait;
use dagforge_workflow::NodeDefinition;

use crate::invocation::{Invokable, InvocationContext, NodeResult};

/// Declared metadata for one node *type*, as distinct from a node
/// *instance* (a [`NodeDefinition`] in a particular workflow).
///
/// A `NodeTypeMeta` answers two questions the Node Invoker needs before it
/// will call `execute`: how much budget does this type cost, and is it
/// gated behind a subscription.
#[derive(Debug, Clone)]
pub struct NodeTypeMeta {
    pub type_name: String,
    /// Compute credits charged for one invocation. Defaults to 1 (§4.9 step 3).
    pub usage: u64,
    /// If true, the Node Invoker rejects invocation unless the caller's
    /// plan meets the subscription requirement (§4.5 step 3).
    pub subscription: bool,
}

impl NodeTypeMeta {
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            usage: 1,
            subscription: false,
        }
    }

    #[must_use]
    pub fn with_usage(mut self, usage: u64) -> Self {
        self.usage = usage;
        self
    }

    #[must_use]
    pub fn subscription_only(mut self) -> Self {
        self.subscription = true;
        self
    }
}

/// Catalogue of node types the host runtime knows how to execute.
///
/// Populated by the host at startup; the Node Invoker consults it once per
/// invocation to resolve a `NodeDefinition`'s `type_name` to executable
/// behavior. The core never knows what a node actually does.
#[async_trait]
pub trait NodeRegistry: Send + Sync {
    /// Look up declared metadata for a node type by name.
    fn get_node_type(&self, type_name: &str) -> Option<NodeTypeMeta>;

    /// Build an executable for this node instance, or `None` if the type
    /// is unknown (§4.5 step 2: `error("node type not implemented")`).
    fn create_executable(&self, node: &NodeDefinition) -> Option<Arc<dyn Invokable>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::NodeResult;
    use std::collections::HashMap;

    struct NoOp;

    #[async_trait]
    impl Invokable for NoOp {
        async fn execute(&self, _ctx: InvocationContext) -> NodeResult {
            NodeResult::completed(HashMap::new(), 1)
        }
    }

    struct FixedRegistry;

    impl NodeRegistry for FixedRegistry {
        fn get_node_type(&self, type_name: &str) -> Option<NodeTypeMeta> {
            (type_name == "noop").then(|| NodeTypeMeta::new("noop"))
        }

        fn create_executable(&self, node: &NodeDefinition) -> Option<Arc<dyn Invokable>> {
            (node.type_name == "noop").then(|| Arc::new(NoOp) as Arc<dyn Invokable>)
        }
    }

    #[test]
    fn unknown_type_resolves_to_none() {
        let registry = FixedRegistry;
        assert!(registry.get_node_type("unknown").is_none());
    }

    #[test]
    fn known_type_has_default_usage_and_no_subscription() {
        let registry = FixedRegistry;
        let meta = registry.get_node_type("noop").unwrap();
        assert_eq!(meta.usage, 1);
        assert!(!meta.subscription);
    }
}
