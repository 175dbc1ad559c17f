//! Memoized, at-most-once-per-name execution (§4.7).

use std::future::Future;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::PortError;

/// Runs a named unit of work at most once per execution id, caching its
/// result for every subsequent call with the same name.
///
/// The object-safe core operates on JSON values so it can live behind a
/// `dyn DurableStep`; [`DurableStepExt::step`] provides the typed
/// convenience wrapper the Coordinator and Level Executor actually call.
#[async_trait]
pub trait DurableStep: Send + Sync {
    /// Run or replay the step named `name`. `producer` is invoked only on
    /// the first call for this name within the execution; its result is
    /// persisted and returned verbatim on every later call.
    async fn step_json(
        &self,
        name: &str,
        producer: Box<dyn FnOnce() -> futures::future::BoxFuture<'static, Result<serde_json::Value, String>> + Send>,
    ) -> Result<serde_json::Value, PortError>;
}

/// Typed convenience wrapper over [`DurableStep::step_json`].
#[async_trait]
pub trait DurableStepExt: DurableStep {
    async fn step<T, F, Fut>(&self, name: &str, producer: F) -> Result<T, PortError>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, String>> + Send + 'static,
    {
        let boxed = Box::new(move || {
            Box::pin(async move {
                let value = producer().await?;
                serde_json::to_value(value).map_err(|e| e.to_string())
            }) as futures::future::BoxFuture<'static, Result<serde_json::Value, String>>
        });
        let json = self.step_json(name, boxed).await?;
        serde_json::from_value(json).map_err(|e| PortError::DurableStep(name.to_string(), e.to_string()))
    }
}

impl<T: DurableStep + ?Sized> DurableStepExt for T {}
