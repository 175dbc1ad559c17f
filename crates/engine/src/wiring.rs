//! Input Wiring (§4.3): collects one node's input values from static
//! defaults and inbound edges, honoring repeated (fan-in) ports.

use std::collections::HashMap;

use dagforge_execution::runtime_value::{NodeRuntimeValues, RuntimeValue, WiredValue};
use dagforge_execution::ExecutionState;
use dagforge_workflow::NodeDefinition;
use serde_json::Value;

/// Wired values for one node, keyed by input port name, ready for the
/// Parameter Codec to decode.
pub type WiredInputs = HashMap<String, WiredValue>;

/// Collect `node`'s input values per §4.3:
///
/// 1. Seed from static defaults where present.
/// 2. Group inbound edges by target input. For each:
///    - skip sources that did not emit the referenced output;
///    - `repeated` ports collect every available source in edge
///      declaration order, flattening one level of array-valued sources;
///    - non-repeated ports take the *last* available source in edge
///      declaration order, falling back to the static default if none.
/// 3. Edge values override statics (applied in step 2 above).
#[must_use]
pub fn collect(node: &NodeDefinition, state: &ExecutionState, edges_in_order: &[(String, dagforge_core::NodeId, String)]) -> WiredInputs {
    let mut wired: WiredInputs = HashMap::new();

    for input in &node.inputs {
        if let Some(default) = &input.default {
            wired.insert(
                input.name.clone(),
                WiredValue::Single(RuntimeValue::Json(default.clone())),
            );
        }
    }

    let mut by_port: HashMap<&str, Vec<&dagforge_core::NodeId>> = HashMap::new();
    let mut source_output: HashMap<&str, Vec<&str>> = HashMap::new();
    for (target_input, source, source_output_name) in edges_in_order {
        by_port.entry(target_input.as_str()).or_default().push(source);
        source_output
            .entry(target_input.as_str())
            .or_default()
            .push(source_output_name.as_str());
    }

    for input in &node.inputs {
        let Some(sources) = by_port.get(input.name.as_str()) else {
            continue;
        };
        let ports = &source_output[input.name.as_str()];

        let mut available: Vec<RuntimeValue> = Vec::new();
        for (source, port) in sources.iter().zip(ports.iter()) {
            let Some(outputs) = state.node_output(**source) else {
                continue;
            };
            let Some(value) = outputs.get(*port) else {
                continue;
            };
            available.extend(value.clone().into_values());
        }

        if available.is_empty() {
            continue;
        }

        if input.repeated {
            let flattened: Vec<RuntimeValue> = available
                .into_iter()
                .flat_map(flatten_one_level)
                .collect();
            wired.insert(input.name.clone(), WiredValue::Repeated(flattened));
        } else if let Some(last) = available.into_iter().next_back() {
            wired.insert(input.name.clone(), WiredValue::Single(last));
        }
    }

    wired
}

/// Flatten a single `RuntimeValue` one level if it holds a JSON array;
/// anything else (scalar, object, blob) passes through as one element.
fn flatten_one_level(value: RuntimeValue) -> Vec<RuntimeValue> {
    match value {
        RuntimeValue::Json(Value::Array(items)) => {
            items.into_iter().map(RuntimeValue::Json).collect()
        }
        other => vec![other],
    }
}

/// Build the `(target_input, source_node, source_output)` edge list for
/// `node_id` from the workflow, in declaration order — the shape
/// [`collect`] expects.
#[must_use]
pub fn inbound_edge_order(
    workflow: &dagforge_workflow::Workflow,
    node_id: dagforge_core::NodeId,
) -> Vec<(String, dagforge_core::NodeId, String)> {
    workflow
        .inbound_edges(node_id)
        .map(|c| (c.target_input.clone(), c.source, c.source_output.clone()))
        .collect()
}
