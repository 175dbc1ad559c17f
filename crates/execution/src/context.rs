//! The immutable per-instance execution context (§3): identity, the
//! triggering payload, and the cancellation signal shared by every task in
//! the run.

use dagforge_core::{ExecutionId, WorkflowId};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// The payload that started this execution. Opaque to the core — forwarded
/// to the Node Invoker's `InvocationContext` unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerPayload {
    Http(serde_json::Value),
    Email(serde_json::Value),
    Queue(serde_json::Value),
    Scheduled(serde_json::Value),
}

/// Immutable identity and cancellation handle shared by every task
/// participating in one workflow instance's execution.
///
/// Not serializable: the cancellation token is a runtime handle, not data.
#[derive(Clone)]
pub struct ExecutionContext {
    pub execution_id: ExecutionId,
    pub workflow_id: WorkflowId,
    pub organization_id: String,
    pub user_id: Option<String>,
    pub deployment_id: Option<String>,
    pub trigger: Option<TriggerPayload>,
    /// The organization's credit allowance, passed to the `CreditGate` check
    /// alongside this execution's estimated usage. Defaults to `u64::MAX`
    /// (no cap) for hosts that do not enforce credit limits.
    pub credit_budget: u64,
    pub cancellation: CancellationToken,
}

impl ExecutionContext {
    #[must_use]
    pub fn new(execution_id: ExecutionId, workflow_id: WorkflowId, organization_id: impl Into<String>) -> Self {
        Self {
            execution_id,
            workflow_id,
            organization_id: organization_id.into(),
            user_id: None,
            deployment_id: None,
            trigger: None,
            credit_budget: u64::MAX,
            cancellation: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
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

    #[must_use]
    pub fn with_credit_budget(mut self, credit_budget: u64) -> Self {
        self.credit_budget = credit_budget;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("execution_id", &self.execution_id)
            .field("workflow_id", &self.workflow_id)
            .field("organization_id", &self.organization_id)
            .field("user_id", &self.user_id)
            .field("deployment_id", &self.deployment_id)
            .field("credit_budget", &self.credit_budget)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
