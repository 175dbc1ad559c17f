//! Compute-credit enforcement (§6, §4.9 step 3).

use async_trait::async_trait;

/// Inputs to a credit check, grouped the way the Coordinator assembles them
/// at `submitted` (§4.9 step 3).
#[derive(Debug, Clone)]
pub struct CreditCheck {
    pub organization_id: String,
    /// The organization's credit allowance for this execution.
    pub budget: u64,
    /// Sum of `nodeType.usage` (default 1) over every node in the plan.
    pub estimated: u64,
    pub subscription_status: Option<String>,
    pub overage_limit: Option<u64>,
}

/// Gates execution on available compute credits and records actual usage
/// once an execution completes.
///
/// A development-mode implementation may unconditionally return `true` from
/// `has_enough_credits` — this trait makes no assumption about enforcement
/// strictness.
#[async_trait]
pub trait CreditGate: Send + Sync {
    async fn has_enough_credits(&self, check: CreditCheck) -> bool;

    /// Record the actual cumulative usage after a non-exhausted execution
    /// completes (§4.9 step 6).
    async fn record_usage(&self, organization_id: &str, actual: u64);
}

/// A `CreditGate` that always permits execution. For local development and
/// tests where credit enforcement is out of scope.
pub struct UnlimitedCreditGate;

#[async_trait]
impl CreditGate for UnlimitedCreditGate {
    async fn has_enough_credits(&self, _check: CreditCheck) -> bool {
        true
    }

    async fn record_usage(&self, _organization_id: &str, _actual: u64) {}
}
