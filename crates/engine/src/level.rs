//! Level Executor (§4.6): runs every eligible node in one level
//! concurrently, each wrapped in a Durable Step, then applies results to
//! the [`ExecutionState`] serially in a deterministic order.

use std::collections::HashSet;
use std::sync::Arc;

use dagforge_core::{ExecutionId, NodeId, WorkflowId};
use dagforge_execution::runtime_value::NodeRuntimeValues;
use dagforge_execution::{ExecutionState, IdempotencyKey, SkipReason, TriggerPayload};
use dagforge_ports::{DurableStep, DurableStepExt, PortError};
use dagforge_workflow::Workflow;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::invoker::{self, InvocationOutcome, InvokerDeps};
use crate::skip::{classify, SkipVerdict};
use crate::wiring::{collect, inbound_edge_order};

/// The self-contained outcome of classifying and (if eligible) invoking one
/// node. Memoized by the Durable Step Wrapper under `run node {nodeId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeExecutionResult {
    Completed {
        node_id: NodeId,
        outputs: NodeRuntimeValues,
        usage: u64,
    },
    Failed {
        node_id: NodeId,
        error: String,
        usage: u64,
    },
    Skipped {
        node_id: NodeId,
        reason: SkipReason,
        blocked_by: Vec<NodeId>,
    },
}

impl NodeExecutionResult {
    #[must_use]
    pub fn node_id(&self) -> NodeId {
        match self {
            Self::Completed { node_id, .. }
            | Self::Failed { node_id, .. }
            | Self::Skipped { node_id, .. } => *node_id,
        }
    }
}

/// Collaborators and per-instance identity the Level Executor threads
/// through every node invocation in a level.
///
/// Entirely owned/`Arc`-backed (rather than borrowed) so one node's
/// invocation can be handed to a spawned task — and, crucially, so the
/// whole classify→wire→invoke pipeline can live *inside* the Durable Step's
/// `'static` producer closure instead of running eagerly before the cache
/// check (§4.7: the producer must not run at all on a cache hit).
#[derive(Clone)]
pub struct LevelExecutorCtx {
    pub workflow: Arc<Workflow>,
    pub workflow_id: WorkflowId,
    pub execution_id: ExecutionId,
    pub organization_id: Arc<str>,
    pub deployment_id: Option<Arc<str>>,
    pub caller_plan: Option<Arc<str>>,
    pub trigger: Option<TriggerPayload>,
    pub invoker_deps: Arc<InvokerDeps>,
    pub durable_step: Arc<dyn DurableStep>,
    pub max_concurrent: usize,
}

/// Classify and (if eligible) invoke a single node, independent of every
/// other node in the level — no shared mutable state is touched here
/// (§4.6: "no mutation of shared state from inside the concurrent task").
async fn run_one_node(node_id: NodeId, state_snapshot: &ExecutionState, ctx: &LevelExecutorCtx) -> NodeExecutionResult {
    match classify(node_id, &ctx.workflow, state_snapshot) {
        SkipVerdict::Skip { reason, blocked_by } => NodeExecutionResult::Skipped {
            node_id,
            reason,
            blocked_by,
        },
        SkipVerdict::Execute => {
            let node = ctx
                .workflow
                .node(node_id)
                .expect("classify only returns Execute for nodes present in the workflow");
            let edges = inbound_edge_order(&ctx.workflow, node_id);
            let wired = collect(node, state_snapshot, &edges);

            let outcome = invoker::invoke(
                node_id,
                &ctx.workflow,
                wired,
                ctx.workflow_id,
                ctx.execution_id,
                &ctx.organization_id,
                ctx.deployment_id.as_deref(),
                ctx.caller_plan.as_deref(),
                ctx.trigger.clone(),
                &ctx.invoker_deps,
            )
            .await;

            match outcome {
                InvocationOutcome::Completed { outputs, usage } => {
                    NodeExecutionResult::Completed { node_id, outputs, usage }
                }
                InvocationOutcome::Failed { error, usage } => {
                    NodeExecutionResult::Failed { node_id, error, usage }
                }
            }
        }
    }
}

/// Run every node in `level` concurrently (bounded by
/// `ctx.max_concurrent`), wrapping each invocation in a Durable Step, then
/// apply the results to `state` serially in node-id order (§4.6).
///
/// If the execution's cancellation token fires before a node's task is
/// dispatched, that node is left un-applied (still `idle`) rather than
/// started — already-dispatched tasks are allowed to finish so their
/// results can still be applied and persisted (§4.6, §5).
pub async fn run_level(
    level: &[NodeId],
    state: &mut ExecutionState,
    cancellation: &tokio_util::sync::CancellationToken,
    ctx: &LevelExecutorCtx,
) -> Result<(), PortError> {
    let semaphore = Arc::new(Semaphore::new(ctx.max_concurrent.max(1)));
    let snapshot = Arc::new(state.clone());

    let mut tasks = Vec::with_capacity(level.len());
    for &node_id in level {
        if cancellation.is_cancelled() {
            tracing::warn!(node_id = %node_id, "cancellation requested; leaving node idle for this level");
            break;
        }

        let ctx = ctx.clone();
        let snapshot = Arc::clone(&snapshot);
        let semaphore = Arc::clone(&semaphore);
        let key = IdempotencyKey::for_node(ctx.execution_id, node_id);
        let durable_step = Arc::clone(&ctx.durable_step);

        tasks.push(tokio::spawn(async move {
            durable_step
                .step(key.as_str(), move || async move {
                    let _permit = semaphore.acquire_owned().await.expect("semaphore is never closed");
                    Ok::<_, String>(run_one_node(node_id, &snapshot, &ctx).await)
                })
                .await
        }));
    }

    let mut results: Vec<NodeExecutionResult> = Vec::with_capacity(tasks.len());
    for task in tasks {
        let result = task
            .await
            .map_err(|e| PortError::DurableStep("run node".to_string(), e.to_string()))??;
        results.push(result);
    }
    results.sort_by_key(NodeExecutionResult::node_id);

    for result in results {
        apply_result(state, result);
    }

    tracing::debug!(level_size = level.len(), "level applied");
    Ok(())
}

/// Move one node's result into the `ExecutionState`'s matching partition.
/// This is the only place shared state is mutated during level execution.
fn apply_result(state: &mut ExecutionState, result: NodeExecutionResult) {
    let node_id = result.node_id();
    if state.is_recorded(node_id) {
        // A durable-step replay after a restart can hand back a result for
        // a node this process already applied earlier in the same level
        // loop; applying twice would violate P1, so the second apply is a
        // no-op.
        return;
    }
    match result {
        NodeExecutionResult::Completed { node_id, outputs, usage } => {
            state
                .mark_completed(node_id, outputs, usage)
                .expect("not recorded, checked above");
        }
        NodeExecutionResult::Failed { node_id, error, usage } => {
            tracing::warn!(node_id = %node_id, error = %error, "node failed");
            state
                .mark_failed(node_id, error, usage)
                .expect("not recorded, checked above");
        }
        NodeExecutionResult::Skipped {
            node_id,
            reason,
            blocked_by,
        } => {
            tracing::warn!(node_id = %node_id, ?reason, "node skipped");
            state
                .mark_skipped(node_id, reason, blocked_by)
                .expect("not recorded, checked above");
        }
    }
}

/// Distinct node ids referenced by a level, used by callers that need to
/// report "currently executing" sets for monitoring snapshots.
#[must_use]
pub fn as_set(level: &[NodeId]) -> HashSet<NodeId> {
    level.iter().copied().collect()
}
