//! Tunables the Coordinator and Level Executor consult (§5).

use std::time::Duration;

/// Configuration for one workflow execution: concurrency limits, timeouts,
/// and output size caps.
///
/// Constructed explicitly by the host; the core never reads environment
/// variables itself.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionBudget {
    /// Maximum number of node invocations running concurrently within a
    /// single level.
    pub max_concurrent_nodes: usize,
    /// Maximum total nodes a workflow may contain; plans exceeding this are
    /// rejected at the `initialise workflow` step.
    pub max_total_nodes: usize,
    /// Per durable-step timeout (§5): "nominally 10 minutes".
    pub step_timeout: Duration,
    /// Maximum encoded output size per node before it is rejected.
    pub max_output_bytes_per_node: u64,
}

impl Default for ExecutionBudget {
    fn default() -> Self {
        Self {
            max_concurrent_nodes: 16,
            max_total_nodes: 1_000,
            step_timeout: Duration::from_secs(600),
            max_output_bytes_per_node: 10 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_budget_has_sane_values() {
        let budget = ExecutionBudget::default();
        assert_eq!(budget.max_concurrent_nodes, 16);
        assert_eq!(budget.step_timeout, Duration::from_secs(600));
    }
}
