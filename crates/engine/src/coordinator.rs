//! Coordinator (§4.9): the state machine that drives one workflow
//! execution from `submitted` through to a terminal [`ExecutionRecord`].
//!
//! Node-local failures never abort this state machine — they are data
//! inside `ExecutionState` (§7). Only validation/cycle/budget failures at
//! `initialise workflow`, credit exhaustion, and genuine port/infra errors
//! end the run early; everything else proceeds level by level until the
//! plan is exhausted.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use dagforge_execution::{
    ExecutionBudget, ExecutionContext, ExecutionPlan, ExecutionRecord, ExecutionState,
};
use dagforge_ports::{
    CreditCheck, CreditGate, DurableStep, DurableStepExt, ExecutionStore, MonitoringService,
    NodeRegistry, ObjectStore, ResourceProvider, SubscriptionGate,
};
use dagforge_workflow::Workflow;
use tracing::Instrument;

use crate::error::CoordinatorError;
use crate::invoker::InvokerDeps;
use crate::level::{self, LevelExecutorCtx};

/// Collaborators bound to one host deployment; `execute` runs any number of
/// workflow instances against them.
pub struct Coordinator {
    registry: Arc<dyn NodeRegistry>,
    resources: Arc<dyn ResourceProvider>,
    object_store: Arc<dyn ObjectStore>,
    subscription_gate: Arc<dyn SubscriptionGate>,
    execution_store: Arc<dyn ExecutionStore>,
    monitoring: Arc<dyn MonitoringService>,
    credit_gate: Arc<dyn CreditGate>,
    durable_step: Arc<dyn DurableStep>,
    budget: ExecutionBudget,
}

impl Coordinator {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<dyn NodeRegistry>,
        resources: Arc<dyn ResourceProvider>,
        object_store: Arc<dyn ObjectStore>,
        subscription_gate: Arc<dyn SubscriptionGate>,
        execution_store: Arc<dyn ExecutionStore>,
        monitoring: Arc<dyn MonitoringService>,
        credit_gate: Arc<dyn CreditGate>,
        durable_step: Arc<dyn DurableStep>,
        budget: ExecutionBudget,
    ) -> Self {
        Self {
            registry,
            resources,
            object_store,
            subscription_gate,
            execution_store,
            monitoring,
            credit_gate,
            durable_step,
            budget,
        }
    }

    /// Run `workflow` to completion per §4.9's seven-step sequence.
    ///
    /// `caller_plan` is the subscription plan of whoever triggered this
    /// execution, consulted by the Node Invoker's subscription gate.
    /// `session_id` routes monitoring snapshots to a specific observer;
    /// `None` broadcasts to any listener.
    pub async fn execute(
        &self,
        workflow: &Workflow,
        ctx: ExecutionContext,
        caller_plan: Option<&str>,
        session_id: Option<&str>,
    ) -> Result<ExecutionRecord, CoordinatorError> {
        let span = tracing::info_span!(
            "workflow_execution",
            execution_id = %ctx.execution_id,
            workflow_id = %ctx.workflow_id,
        );
        self.run(workflow, ctx, caller_plan, session_id)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        workflow: &Workflow,
        ctx: ExecutionContext,
        caller_plan: Option<&str>,
        session_id: Option<&str>,
    ) -> Result<ExecutionRecord, CoordinatorError> {
        // 1. Emit initial snapshot.
        self.monitoring
            .send_update(session_id, &ExecutionRecord::submitted(&ctx))
            .await;

        // 2. `initialise workflow`.
        let plan = match self.initialise_workflow(workflow, &ctx).await {
            Ok(plan) => plan,
            Err(message) => {
                tracing::warn!(error = %message, "workflow initialisation failed");
                return self.finish_fatal(&ctx, message, session_id).await;
            }
        };

        let mut state = ExecutionState::new(ctx.execution_id, ctx.workflow_id);
        state.started_at = Some(Utc::now());

        // 3. Credit check.
        let estimated = self.estimate_usage(workflow);
        let check = CreditCheck {
            organization_id: ctx.organization_id.clone(),
            budget: ctx.credit_budget,
            estimated,
            subscription_status: None,
            overage_limit: None,
        };
        if !self.credit_gate.has_enough_credits(check).await {
            tracing::warn!(estimated, "insufficient compute credits");
            state.completed_at = Some(Utc::now());
            return self.finish(&ctx, &plan, &state, true, session_id).await;
        }

        // 4. Preload organization resources.
        self.resources.initialize(&ctx.organization_id).await?;

        // 5. Level loop.
        let invoker_deps = Arc::new(InvokerDeps {
            registry: Arc::clone(&self.registry),
            resources: Arc::clone(&self.resources),
            object_store: Arc::clone(&self.object_store),
            subscription_gate: Arc::clone(&self.subscription_gate),
        });
        let level_ctx = LevelExecutorCtx {
            workflow: Arc::new(workflow.clone()),
            workflow_id: ctx.workflow_id,
            execution_id: ctx.execution_id,
            organization_id: Arc::from(ctx.organization_id.as_str()),
            deployment_id: ctx.deployment_id.as_deref().map(Arc::from),
            caller_plan: caller_plan.map(Arc::from),
            trigger: ctx.trigger.clone(),
            invoker_deps,
            durable_step: Arc::clone(&self.durable_step),
            max_concurrent: self.budget.max_concurrent_nodes,
        };

        for level in &plan.levels {
            level::run_level(level, &mut state, &ctx.cancellation, &level_ctx).await?;

            let snapshot = ExecutionRecord::build(&ctx, &plan, &state, false, &HashSet::new(), None);
            self.monitoring.send_update(session_id, &snapshot).await;
            tracing::debug!(level_size = level.len(), "level applied");

            if ctx.is_cancelled() {
                break;
            }
        }

        state.completed_at = Some(Utc::now());

        // 6 & 7. Persist and emit the final snapshot.
        self.finish(&ctx, &plan, &state, false, session_id).await
    }

    /// Run `initialise workflow` as a Durable Step: validate the workflow
    /// and compute its execution plan. The producer never re-runs on
    /// replay, so a workflow definition that was valid at the first
    /// attempt cannot later be re-validated against a changed definition.
    async fn initialise_workflow(
        &self,
        workflow: &Workflow,
        ctx: &ExecutionContext,
    ) -> Result<ExecutionPlan, String> {
        let workflow = workflow.clone();
        let budget = self.budget;
        let execution_id = ctx.execution_id;
        self.durable_step
            .step("initialise workflow", move || async move {
                ExecutionPlan::from_workflow(execution_id, &workflow, &budget)
                    .map_err(|e| e.to_string())
            })
            .await
            .map_err(|e| e.to_string())
    }

    /// Sum `nodeType.usage` (default 1) over every node in the workflow
    /// (§4.9 step 3).
    fn estimate_usage(&self, workflow: &Workflow) -> u64 {
        workflow
            .nodes
            .iter()
            .map(|node| {
                self.registry
                    .get_node_type(&node.type_name)
                    .map_or(1, |meta| meta.usage)
            })
            .sum()
    }

    /// `persist final execution record` (§4.9 step 6): the only call site
    /// that writes the final record. Durable-step memoization makes this
    /// exactly-once across restarts (P6).
    async fn persist(&self, record: ExecutionRecord) -> Result<ExecutionRecord, CoordinatorError> {
        let execution_store = Arc::clone(&self.execution_store);
        let persisted = self
            .durable_step
            .step("persist final execution record", move || async move {
                execution_store.save(record).await.map_err(|e| e.to_string())
            })
            .await?;
        Ok(persisted)
    }

    /// Build, persist, and broadcast the final record for a run that
    /// reached the end of planning (completed, errored, or exhausted).
    async fn finish(
        &self,
        ctx: &ExecutionContext,
        plan: &ExecutionPlan,
        state: &ExecutionState,
        exhausted: bool,
        session_id: Option<&str>,
    ) -> Result<ExecutionRecord, CoordinatorError> {
        let record = ExecutionRecord::build(ctx, plan, state, exhausted, &HashSet::new(), None);
        let persisted = self.persist(record).await?;
        if !exhausted {
            self.credit_gate
                .record_usage(&ctx.organization_id, state.total_usage())
                .await;
        }
        self.monitoring.send_update(session_id, &persisted).await;
        Ok(persisted)
    }

    /// Build, persist, and broadcast the final record for a run that never
    /// produced a plan (validation/cycle/budget failure at step 2).
    async fn finish_fatal(
        &self,
        ctx: &ExecutionContext,
        message: impl Into<String>,
        session_id: Option<&str>,
    ) -> Result<ExecutionRecord, CoordinatorError> {
        let record = ExecutionRecord::fatal(ctx, message);
        let persisted = self.persist(record).await?;
        self.monitoring.send_update(session_id, &persisted).await;
        Ok(persisted)
    }
}
