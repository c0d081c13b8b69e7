//! # Scheduler Ports
//!
//! The scheduler talks to the world through three traits: the target store
//! (which feeds it work and records progress), the fee estimator, and the
//! submission pipeline that performs the actual write.

use crate::error::SchedulerResult;
use async_trait::async_trait;
use primitive_types::U256;
use shared_types::Address;

/// A finalized head of the host ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Head {
    pub number: u64,
}

/// One registered submission target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetRegistration {
    pub id: u64,
    /// The aggregator this target submits to.
    pub aggregator: Address,
    /// The key the submission is sent from.
    pub from: Address,
    /// Gas allowance for the submission itself.
    pub submit_gas_limit: u64,
}

/// The payload a fee quote is requested for.
pub fn submission_payload(target: &TargetRegistration) -> Vec<u8> {
    let mut payload = Vec::with_capacity(8 + 20);
    payload.extend_from_slice(&target.id.to_be_bytes());
    payload.extend_from_slice(&target.aggregator);
    payload
}

/// Eligible-target queries and last-run bookkeeping.
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Targets due at `head_number`, filtered by the grace-period policy
    /// against each target's last-run height.
    async fn eligible_targets(
        &self,
        head_number: u64,
        maximum_grace_period: u64,
    ) -> SchedulerResult<Vec<TargetRegistration>>;

    /// Record the height of a target's last successful action.
    async fn record_last_run_height(&self, target_id: u64, height: u64) -> SchedulerResult<()>;
}

/// Quotes a fee price for including a submission.
#[async_trait]
pub trait FeePriceEstimator: Send + Sync {
    async fn estimate_fee_price(&self, payload: &[u8], gas_limit: u64) -> SchedulerResult<U256>;
}

/// A fully-priced submission handed to the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionJob {
    pub target: TargetRegistration,
    pub head_number: u64,
    /// Estimator quote with the configured buffer applied.
    pub fee_price: U256,
}

/// What became of a pipeline run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// A submission was broadcast.
    Completed,
    /// The run finished without broadcasting; nothing to record.
    Incomplete,
}

/// Builds and executes the submission that calls the aggregator's write
/// surface.
#[async_trait]
pub trait SubmissionPipeline: Send + Sync {
    async fn run(&self, job: SubmissionJob) -> SchedulerResult<PipelineOutcome>;
}
