//! Hand-written fakes shared by the end-to-end scenario tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dagforge_core::ExecutionId;
use dagforge_execution::{ExecutionBudget, ExecutionRecord};
use dagforge_ports::{
    AllowAllSubscriptionGate, BlobHandle, CreditCheck, CreditGate, DurableStep, ExecutionStore,
    Invokable, InvocationContext, MonitoringService, NodeRegistry, NodeResult, NodeTypeMeta,
    ObjectStore, PortError, ResourceProvider, SecureString, UnlimitedCreditGate,
};
use dagforge_workflow::NodeDefinition;
use parking_lot::Mutex;
use serde_json::Value;

use dagforge_engine::Coordinator;

/// Fixed-value number node: emits `result` equal to the constant it was
/// registered with.
pub struct Constant(pub i64);

#[async_trait]
impl Invokable for Constant {
    async fn execute(&self, _ctx: InvocationContext) -> NodeResult {
        let mut out = HashMap::new();
        out.insert("result".to_string(), serde_json::json!(self.0));
        NodeResult::completed(out, 1)
    }
}

/// Adds `a` and `b`.
pub struct Add;

#[async_trait]
impl Invokable for Add {
    async fn execute(&self, ctx: InvocationContext) -> NodeResult {
        let a = ctx.inputs.get("a").and_then(Value::as_i64).unwrap_or(0);
        let b = ctx.inputs.get("b").and_then(Value::as_i64).unwrap_or(0);
        let mut out = HashMap::new();
        out.insert("result".to_string(), serde_json::json!(a + b));
        NodeResult::completed(out, 1)
    }
}

/// Multiplies `a` and `b`.
pub struct Multiply;

#[async_trait]
impl Invokable for Multiply {
    async fn execute(&self, ctx: InvocationContext) -> NodeResult {
        let a = ctx.inputs.get("a").and_then(Value::as_i64).unwrap_or(0);
        let b = ctx.inputs.get("b").and_then(Value::as_i64).unwrap_or(0);
        let mut out = HashMap::new();
        out.insert("result".to_string(), serde_json::json!(a * b));
        NodeResult::completed(out, 1)
    }
}

/// Divides `a` by `b`, failing verbatim on division by zero.
pub struct Divide;

#[async_trait]
impl Invokable for Divide {
    async fn execute(&self, ctx: InvocationContext) -> NodeResult {
        let a = ctx.inputs.get("a").and_then(Value::as_i64).unwrap_or(0);
        let b = ctx.inputs.get("b").and_then(Value::as_i64).unwrap_or(0);
        if b == 0 {
            return NodeResult::failed("division by zero", 1);
        }
        let mut out = HashMap::new();
        out.insert("result".to_string(), serde_json::json!(a / b));
        NodeResult::completed(out, 1)
    }
}

/// Always emits only its `true_branch` output, leaving `false_branch` unset
/// — the conditional-branch fixture for S3.
pub struct TrueBranchOnly;

#[async_trait]
impl Invokable for TrueBranchOnly {
    async fn execute(&self, _ctx: InvocationContext) -> NodeResult {
        let mut out = HashMap::new();
        out.insert("true_branch".to_string(), serde_json::json!(true));
        NodeResult::completed(out, 1)
    }
}

/// Echoes whatever it receives back out under `result`.
pub struct Echo;

#[async_trait]
impl Invokable for Echo {
    async fn execute(&self, ctx: InvocationContext) -> NodeResult {
        let mut out = HashMap::new();
        out.insert("result".to_string(), serde_json::json!(ctx.inputs));
        NodeResult::completed(out, 1)
    }
}

/// Fails unless every `required` input it declares is present. Simulates
/// a node-side required-input check (§4.5 does not enforce this itself).
pub struct RequireFields(pub Vec<&'static str>);

#[async_trait]
impl Invokable for RequireFields {
    async fn execute(&self, ctx: InvocationContext) -> NodeResult {
        for field in &self.0 {
            if !ctx.inputs.contains_key(*field) {
                return NodeResult::failed(format!("required input '{field}' missing"), 1);
            }
        }
        let mut out = HashMap::new();
        out.insert("result".to_string(), serde_json::json!(true));
        NodeResult::completed(out, 1)
    }
}

/// A registry backed by a fixed map from node type name to a constructor
/// closure, so each scenario can wire up exactly the handlers it needs.
pub struct FixtureRegistry {
    handlers: HashMap<String, Arc<dyn Invokable>>,
}

impl FixtureRegistry {
    #[must_use]
    pub fn new(handlers: Vec<(&str, Arc<dyn Invokable>)>) -> Self {
        Self {
            handlers: handlers.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}

impl NodeRegistry for FixtureRegistry {
    fn get_node_type(&self, type_name: &str) -> Option<NodeTypeMeta> {
        self.handlers.contains_key(type_name).then(|| NodeTypeMeta::new(type_name))
    }

    fn create_executable(&self, node: &NodeDefinition) -> Option<Arc<dyn Invokable>> {
        self.handlers.get(&node.type_name).cloned()
    }
}

pub struct NoResources;

#[async_trait]
impl ResourceProvider for NoResources {
    async fn initialize(&self, _organization_id: &str) -> Result<(), PortError> {
        Ok(())
    }
    async fn get_secret(&self, _organization_id: &str, name: &str) -> Result<SecureString, PortError> {
        Err(PortError::SecretNotFound(name.to_string()))
    }
    async fn get_integration(&self, _organization_id: &str, id: &str) -> Result<Value, PortError> {
        Err(PortError::IntegrationNotFound(id.to_string()))
    }
}

pub struct NoObjects;

#[async_trait]
impl ObjectStore for NoObjects {
    async fn write_object(
        &self,
        _bytes: Vec<u8>,
        _mime_type: &str,
        _organization_id: &str,
        _execution_id: Option<ExecutionId>,
    ) -> Result<BlobHandle, PortError> {
        unreachable!("scenario fixtures declare no blob ports")
    }
    async fn read_object(&self, _handle: &BlobHandle) -> Result<Vec<u8>, PortError> {
        unreachable!("scenario fixtures declare no blob ports")
    }
}

#[derive(Default)]
pub struct InMemoryExecutionStore(pub Mutex<Vec<ExecutionRecord>>);

#[async_trait]
impl ExecutionStore for InMemoryExecutionStore {
    async fn save(&self, record: ExecutionRecord) -> Result<ExecutionRecord, PortError> {
        self.0.lock().push(record.clone());
        Ok(record)
    }
}

pub struct NoopMonitoring;

#[async_trait]
impl MonitoringService for NoopMonitoring {
    async fn send_update(&self, _session_id: Option<&str>, _record: &ExecutionRecord) {}
}

#[derive(Default)]
pub struct InMemoryDurableStep(Mutex<HashMap<String, Value>>);

#[async_trait]
impl DurableStep for InMemoryDurableStep {
    async fn step_json(
        &self,
        name: &str,
        producer: Box<dyn FnOnce() -> futures::future::BoxFuture<'static, Result<Value, String>> + Send>,
    ) -> Result<Value, PortError> {
        if let Some(cached) = self.0.lock().get(name).cloned() {
            return Ok(cached);
        }
        let value = producer().await.map_err(|e| PortError::DurableStep(name.to_string(), e))?;
        self.0.lock().insert(name.to_string(), value.clone());
        Ok(value)
    }
}

/// Credit gate that denies every request; used by the exhaustion scenario.
pub struct DenyAllCredit;

#[async_trait]
impl CreditGate for DenyAllCredit {
    async fn has_enough_credits(&self, _check: CreditCheck) -> bool {
        false
    }
    async fn record_usage(&self, _organization_id: &str, _actual: u64) {
        panic!("record_usage must not be called on an exhausted execution");
    }
}

/// Assemble a [`Coordinator`] wired to in-memory/no-op ports, for scenarios
/// that only need to assert on the final [`ExecutionRecord`].
#[must_use]
pub fn coordinator_with(
    registry: FixtureRegistry,
    execution_store: Arc<InMemoryExecutionStore>,
) -> Coordinator {
    Coordinator::new(
        Arc::new(registry),
        Arc::new(NoResources),
        Arc::new(NoObjects),
        Arc::new(AllowAllSubscriptionGate),
        execution_store,
        Arc::new(NoopMonitoring),
        Arc::new(UnlimitedCreditGate),
        Arc::new(InMemoryDurableStep::default()),
        ExecutionBudget::default(),
    )
}
