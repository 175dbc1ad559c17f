//! Strongly-typed identifiers for workflow engine entities.
//!
//! Built on [`domain-key`](https://crates.io/crates/domain-key) `Uuid<D>`
//! wrappers. Each identifier type carries a distinct domain marker so the
//! compiler rejects passing, say, a `NodeId` where an `ExecutionId` is
//! expected. All ID types are `Copy` (16 bytes) and support `v4()`, `nil()`,
//! `parse(&str)`, serde, `Display`, `FromStr`, `Ord`, `Hash`.

use domain_key::define_uuid;

pub use domain_key::UuidParseError;

define_uuid!(ExecutionIdDomain => ExecutionId);
define_uuid!(WorkflowIdDomain => WorkflowId);
define_uuid!(NodeIdDomain => NodeId);
