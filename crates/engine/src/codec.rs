//! Parameter Codec (§4.4): converts between wire-format [`RuntimeValue`]s
//! and the plain JSON values a node implementation actually sees, routing
//! blob-bearing parameters through the [`ObjectStore`].

use std::collections::HashMap;

use dagforge_core::ExecutionId;
use dagforge_execution::runtime_value::{NodeRuntimeValues, RuntimeValue, WiredValue};
use dagforge_ports::{ObjectStore, PortError};
use dagforge_workflow::ParameterType;
use serde_json::Value;

/// Decode one wired input value into the plain JSON a node sees.
///
/// Only blob-bearing types round-trip through the `ObjectStore`; everything
/// else passes its JSON payload through unchanged. Unknown parameter types
/// default to `string` handling (pass-through), per §4.4.
pub async fn decode_value(
    declared_type: ParameterType,
    value: RuntimeValue,
    object_store: &dyn ObjectStore,
) -> Result<Value, PortError> {
    match (declared_type, value) {
        (ParameterType::Blob(_), RuntimeValue::Blob(handle)) => {
            let bytes = object_store.read_object(&handle).await?;
            Ok(serde_json::json!({
                "mimeType": handle.mime_type,
                "bytes": bytes,
            }))
        }
        (_, RuntimeValue::Json(v)) => Ok(v),
        // A blob handle arriving for a non-blob port, or vice versa, is a
        // host/authoring mismatch upstream of this codec; pass the handle
        // through as plain JSON rather than failing the whole node.
        (_, RuntimeValue::Blob(handle)) => Ok(serde_json::to_value(handle)?),
    }
}

/// Decode an entire node's wired inputs into the plain JSON map an
/// `Invokable::execute` receives.
///
/// `null`/missing values are not written to the processed map (§4.4) —
/// `required` checks are the node's own concern at invocation time.
/// Repeated parameters decode each element and re-assemble a JSON array.
pub async fn decode_inputs(
    ports: &HashMap<String, ParameterType>,
    wired: NodeRuntimeValues,
    object_store: &dyn ObjectStore,
) -> Result<HashMap<String, Value>, PortError> {
    let mut decoded = HashMap::with_capacity(wired.len());
    for (name, value) in wired {
        let declared_type = ports.get(&name).copied().unwrap_or(ParameterType::String);
        let json = match value {
            WiredValue::Single(v) => {
                let decoded_single = decode_value(declared_type, v, object_store).await?;
                if decoded_single.is_null() {
                    continue;
                }
                decoded_single
            }
            WiredValue::Repeated(values) => {
                let mut items = Vec::with_capacity(values.len());
                for v in values {
                    items.push(decode_value(declared_type, v, object_store).await?);
                }
                Value::Array(items)
            }
        };
        decoded.insert(name, json);
    }
    Ok(decoded)
}

/// Encode one node-facing JSON output value into the wire-format
/// [`RuntimeValue`], writing binary payloads to the `ObjectStore`.
///
/// Secret-typed parameters are encoded as plain strings: the secret was
/// already resolved upstream via `ResourceProvider` and this codec never
/// re-encrypts it.
pub async fn encode_value(
    declared_type: ParameterType,
    value: Value,
    organization_id: &str,
    execution_id: ExecutionId,
    object_store: &dyn ObjectStore,
) -> Result<RuntimeValue, PortError> {
    match declared_type {
        ParameterType::Blob(_) => {
            let (bytes, mime_type) = extract_blob_payload(&value);
            let handle = object_store
                .write_object(bytes, &mime_type, organization_id, Some(execution_id))
                .await?;
            Ok(RuntimeValue::Blob(handle))
        }
        _ => Ok(RuntimeValue::Json(value)),
    }
}

/// Pull `{bytes, mimeType}` out of a node's raw blob output, defaulting the
/// mime type when the node did not supply one.
fn extract_blob_payload(value: &Value) -> (Vec<u8>, String) {
    let mime_type = value
        .get("mimeType")
        .and_then(Value::as_str)
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = value
        .get("bytes")
        .and_then(|b| serde_json::from_value::<Vec<u8>>(b.clone()).ok())
        .unwrap_or_default();
    (bytes, mime_type)
}

/// Encode an entire node's returned outputs into wired, wire-format values.
///
/// Absent output ports in `raw_outputs` are deliberately left out of the
/// result — their absence is the signal the Skip Resolver reads as a
/// conditional branch not taken (§4.5 step 6).
pub async fn encode_outputs(
    ports: &HashMap<String, ParameterType>,
    raw_outputs: HashMap<String, Value>,
    organization_id: &str,
    execution_id: ExecutionId,
    object_store: &dyn ObjectStore,
) -> Result<NodeRuntimeValues, PortError> {
    let mut encoded = NodeRuntimeValues::new();
    for (name, value) in raw_outputs {
        let declared_type = ports.get(&name).copied().unwrap_or(ParameterType::String);
        let wired = encode_value(declared_type, value, organization_id, execution_id, object_store).await?;
        encoded.insert(name, WiredValue::Single(wired));
    }
    Ok(encoded)
}
