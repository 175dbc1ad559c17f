//! Skip resolution, input wiring, parameter codec, node invocation, level
//! execution, and coordination for the dagforge workflow engine.
//!
//! `dagforge-core`, `dagforge-workflow`, `dagforge-execution`, and
//! `dagforge-ports` describe data, pure functions, and collaborator
//! traits; this crate is where they are driven end to end. [`Coordinator`]
//! is the entry point a host constructs and calls `execute` on.

pub mod codec;
pub mod coordinator;
pub mod error;
pub mod invoker;
pub mod level;
pub mod skip;
pub mod wiring;

pub use coordinator::Coordinator;
pub use error::CoordinatorError;
pub use invoker::{InvocationOutcome, InvokerDeps};
pub use level::{LevelExecutorCtx, NodeExecutionResult};
pub use skip::SkipVerdict;
pub use wiring::WiredInputs;
