//! Status derivation (§4.8) — the single source of truth for a workflow's
//! status.
//!
//! An earlier design stored `status` as a field on `ExecutionState`
//! alongside the partition counters. That field drifted out of sync with
//! the counters under partial failure and produced a "stuck executing"
//! desync bug. There is no `set_status` anywhere in this crate: status is
//! always computed fresh from [`ExecutionPlan`] and [`ExecutionState`],
//! never stored or assigned.

use serde::{Deserialize, Serialize};

use crate::plan::ExecutionPlan;
use crate::state::ExecutionState;

/// The derived status of one workflow execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedStatus {
    /// Set by the Coordinator before planning begins; never derived.
    Submitted,
    Executing,
    Completed,
    Error,
    Exhausted,
}

impl DerivedStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error | Self::Exhausted)
    }
}

impl std::fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Submitted => "submitted",
            Self::Executing => "executing",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Exhausted => "exhausted",
        };
        f.write_str(s)
    }
}

/// Derive the workflow's status from the plan and current state.
///
/// Pure function, no mutation, no side effects:
/// - `exhausted` (credit gate failed) always wins.
/// - Otherwise, compare `state.visited_nodes()` against the plan's full
///   node set: any unvisited node means the workflow is still `executing`.
/// - Once every node has been visited, the result is `error` if any node
///   failed, else `completed`.
#[must_use]
pub fn derive_status(plan: &ExecutionPlan, state: &ExecutionState, exhausted: bool) -> DerivedStatus {
    if exhausted {
        return DerivedStatus::Exhausted;
    }

    let visited = state.visited_nodes();
    let total = plan.ordered_node_ids();

    if total.iter().any(|id| !visited.contains(id)) {
        return DerivedStatus::Executing;
    }

    if state.node_errors().is_empty() {
        DerivedStatus::Completed
    } else {
        DerivedStatus::Error
    }
}
