//! External-collaborator traits for the dagforge workflow engine (§6).
//!
//! `dagforge-core`, `dagforge-workflow`, and `dagforge-execution` describe
//! pure data and pure functions; everything with a side effect — node
//! implementations, credential resolution, blob storage, persistence,
//! monitoring, billing, and durable-step memoization — is expressed here as
//! a trait. `dagforge-engine` drives these traits; a host binds concrete
//! implementations to them.

pub mod credit_gate;
pub mod durable_step;
pub mod error;
pub mod execution_store;
pub mod invocation;
pub mod monitoring;
pub mod object_store;
pub mod registry;
pub mod resource;
pub mod secure;
pub mod subscription;

pub use credit_gate::{CreditCheck, CreditGate, UnlimitedCreditGate};
pub use durable_step::{DurableStep, DurableStepExt};
pub use error::PortError;
pub use execution_store::ExecutionStore;
pub use invocation::{Invokable, InvocationContext, NodeResult};
pub use monitoring::{MonitoringService, NoopMonitoringService};
pub use object_store::{BlobHandle, ObjectStore};
pub use registry::{NodeRegistry, NodeTypeMeta};
pub use resource::ResourceProvider;
pub use secure::SecureString;
pub use subscription::{AllowAllSubscriptionGate, SubscriptionGate};
