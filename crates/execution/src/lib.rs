//! Execution-time types for the dagforge workflow engine: the immutable
//! [`ExecutionPlan`] derived from a `Workflow`, the mutable [`ExecutionState`]
//! that accumulates as nodes run, the pure [`status::derive_status`]
//! function, and the [`ExecutionRecord`] snapshot persisted via the host's
//! `ExecutionStore`.
//!
//! This crate owns no I/O: planning, state mutation, and status derivation
//! are all synchronous, side-effect-free operations over plain data. The
//! Coordinator and Level Executor (in `dagforge-engine`) drive this crate's
//! types against the external ports defined in `dagforge-ports`.

pub mod budget;
pub mod context;
pub mod error;
pub mod idempotency;
pub mod plan;
pub mod record;
pub mod runtime_value;
pub mod state;
pub mod status;

pub use budget::ExecutionBudget;
pub use context::{ExecutionContext, TriggerPayload};
pub use error::ExecutionError;
pub use idempotency::IdempotencyKey;
pub use plan::ExecutionPlan;
pub use record::{ExecutionRecord, NodeExecutionRecord};
pub use runtime_value::{BlobHandle, NodeRuntimeValues, RuntimeValue, WiredValue};
pub use state::{ExecutionState, SkipReason, SkipRecord};
pub use status::{derive_status, DerivedStatus};
