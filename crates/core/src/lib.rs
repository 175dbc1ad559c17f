//! Core types shared across the dagforge workflow engine crates.
//!
//! This crate provides the fundamental building blocks used by the
//! `workflow`, `execution`, `ports`, and `engine` crates:
//!
//! - Strongly-typed identifiers: [`ExecutionId`], [`WorkflowId`], [`NodeId`].
//! - [`CoreError`] and the crate-wide [`Result`] alias.

pub mod error;
pub mod id;

pub use error::CoreError;
pub use id::{ExecutionId, NodeId, UuidParseError, WorkflowId};

/// Result type used throughout the workflow engine's core crates.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Common prelude for dagforge crates.
pub mod prelude {
    pub use super::{CoreError, ExecutionId, NodeId, Result, WorkflowId};
}
