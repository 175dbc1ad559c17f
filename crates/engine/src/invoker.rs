//! Node Invoker (§4.5): resolves a node type from the registry, builds its
//! invocation context, runs it, and classifies the result.

use std::collections::HashMap;
use std::sync::Arc;

use dagforge_core::{ExecutionId, NodeId, WorkflowId};
use dagforge_execution::runtime_value::NodeRuntimeValues;
use dagforge_execution::TriggerPayload;
use dagforge_ports::{
    InvocationContext, NodeRegistry, NodeResult, ObjectStore, ResourceProvider, SubscriptionGate,
};
use dagforge_workflow::{NodeDefinition, ParameterType, Workflow};

use crate::codec::{decode_inputs, encode_outputs};

/// What came out of invoking one node: either it produced outputs (which
/// may be a partial map — absent ports are a deliberate conditional
/// branch, §4.5 step 6), or it failed. Usage is always recorded, even on
/// failure, per the data model's `nodeUsage` invariant.
#[derive(Debug, Clone)]
pub enum InvocationOutcome {
    Completed {
        outputs: NodeRuntimeValues,
        usage: u64,
    },
    Failed {
        error: String,
        usage: u64,
    },
}

/// Collaborators the Node Invoker needs, bundled so call sites don't thread
/// five separate `Arc`s through the Level Executor.
pub struct InvokerDeps {
    pub registry: Arc<dyn NodeRegistry>,
    pub resources: Arc<dyn ResourceProvider>,
    pub object_store: Arc<dyn ObjectStore>,
    pub subscription_gate: Arc<dyn SubscriptionGate>,
}

/// Invoke one node per §4.5's six steps.
///
/// Steps 1–3 (resolve definition, resolve type metadata, enforce
/// subscription gating) can fail before any node code runs, in which case
/// this returns `Failed` without ever calling `execute`. A panic from
/// `Invokable::execute` is the implementation's own bug and is not caught
/// here — only ordinary `NodeResult::Failed` returns and codec errors
/// become `Failed` outcomes; per §9 this core never downgrades panics.
#[allow(clippy::too_many_arguments)]
pub async fn invoke(
    node_id: NodeId,
    workflow: &Workflow,
    wired_inputs: NodeRuntimeValues,
    workflow_id: WorkflowId,
    execution_id: ExecutionId,
    organization_id: &str,
    deployment_id: Option<&str>,
    caller_plan: Option<&str>,
    trigger: Option<TriggerPayload>,
    deps: &InvokerDeps,
) -> InvocationOutcome {
    let Some(node) = workflow.node(node_id) else {
        return InvocationOutcome::Failed {
            error: "node not found".to_string(),
            usage: 0,
        };
    };

    let Some(meta) = deps.registry.get_node_type(&node.type_name) else {
        return InvocationOutcome::Failed {
            error: "node type not implemented".to_string(),
            usage: 0,
        };
    };

    if meta.subscription && !deps.subscription_gate.is_allowed(&node.type_name, caller_plan) {
        return InvocationOutcome::Failed {
            error: "subscription required".to_string(),
            usage: 0,
        };
    }

    let input_ports = port_types(node, PortDirection::Input);
    let decoded_inputs = match decode_inputs(&input_ports, wired_inputs, deps.object_store.as_ref()).await {
        Ok(inputs) => inputs,
        Err(e) => {
            return InvocationOutcome::Failed {
                error: format!("parameter decode failed: {e}"),
                usage: 0,
            };
        }
    };

    let Some(executable) = deps.registry.create_executable(node) else {
        return InvocationOutcome::Failed {
            error: "node type not implemented".to_string(),
            usage: 0,
        };
    };

    let mut ctx = InvocationContext::new(
        node_id,
        workflow_id,
        organization_id,
        decoded_inputs,
        Arc::clone(&deps.resources),
        Arc::clone(&deps.registry),
    );
    if let Some(deployment_id) = deployment_id {
        ctx = ctx.with_deployment_id(deployment_id);
    }
    if let Some(trigger) = trigger {
        ctx = ctx.with_trigger(trigger);
    }

    match executable.execute(ctx).await {
        NodeResult::Completed { outputs, usage } => {
            let usage = if usage == 0 { meta.usage } else { usage };
            let output_ports = port_types(node, PortDirection::Output);
            match encode_outputs(&output_ports, outputs, organization_id, execution_id, deps.object_store.as_ref()).await {
                Ok(encoded) => InvocationOutcome::Completed { outputs: encoded, usage },
                Err(e) => InvocationOutcome::Failed {
                    error: format!("parameter encode failed: {e}"),
                    usage,
                },
            }
        }
        NodeResult::Failed { error, usage } => InvocationOutcome::Failed { error, usage },
    }
}

enum PortDirection {
    Input,
    Output,
}

fn port_types(node: &NodeDefinition, direction: PortDirection) -> HashMap<String, ParameterType> {
    match direction {
        PortDirection::Input => node
            .inputs
            .iter()
            .map(|p| (p.name.clone(), p.declared_type))
            .collect(),
        PortDirection::Output => node
            .outputs
            .iter()
            .map(|p| (p.name.clone(), p.declared_type))
            .collect(),
    }
}
