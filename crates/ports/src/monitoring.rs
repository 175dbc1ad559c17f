//! Real-time snapshot delivery (§6, §4.9 step 1/5/7). Best-effort: failure
//! here is logged, never fatal.

use async_trait::async_trait;
use dagforge_execution::ExecutionRecord;

/// Pushes in-flight and final execution snapshots to an observer (a UI
/// session, a webhook, etc).
///
/// Implementations should never propagate errors back into the Coordinator
/// — a failed `send_update` is a monitoring-visibility problem, not an
/// execution problem. `async_trait` methods here return `()` rather than
/// `Result` for exactly this reason; log internally instead.
#[async_trait]
pub trait MonitoringService: Send + Sync {
    /// `session_id` is an optional routing hint (e.g. a live UI session
    /// subscribed to this execution); `None` means broadcast to any
    /// listener.
    async fn send_update(&self, session_id: Option<&str>, record: &ExecutionRecord);
}

/// A `MonitoringService` that drops every update. Useful as a default when
/// no observer is attached.
pub struct NoopMonitoringService;

#[async_trait]
impl MonitoringService for NoopMonitoringService {
    async fn send_update(&self, _session_id: Option<&str>, _record: &ExecutionRecord) {}
}
