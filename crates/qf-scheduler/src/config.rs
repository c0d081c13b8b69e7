//! Runtime configuration for the submission scheduler.

use serde::Deserialize;

/// Scheduler tuning knobs.
#[derive(Clone, Debug, Deserialize)]
pub struct SchedulerConfig {
    /// Percentage added on top of the estimator's fee quote.
    pub fee_buffer_percent: u64,

    /// Heights a target may lag its schedule before it stops being
    /// eligible. Enforced by the target store's eligibility query.
    pub maximum_grace_period: u64,

    /// Maximum concurrent submission executions per trigger.
    pub execution_queue_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            fee_buffer_percent: 20,
            maximum_grace_period: 100,
            execution_queue_size: 10,
        }
    }
}
