//! Errors the Coordinator surfaces at its boundary.
//!
//! Node-local failures never appear here — they are recorded as plain
//! strings inside [`dagforge_execution::ExecutionState`] (§7) and never
//! unwind the orchestration layer. Only the taxonomy-1/2/4 failures of §7
//! (validation, cycles, budget, platform-port errors) are represented as
//! real Rust errors.

use dagforge_execution::ExecutionError;
use dagforge_ports::PortError;

/// Errors surfaced while coordinating one workflow execution.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoordinatorError {
    /// Planning or state-bookkeeping failed (validation, cycle, budget).
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// An external collaborator (durable step store, execution store,
    /// object store, resource provider) returned an infrastructure error.
    #[error(transparent)]
    Port(#[from] PortError),
}
