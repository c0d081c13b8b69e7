//! # qf-scheduler
//!
//! The off-chain side of Quorum-Feed: decides *when* to submit, not *what*
//! is true. A head tracker delivers finalized heights; for every eligible
//! target the scheduler estimates a fee price, buffers it, and hands a
//! submission job to the pipeline that eventually calls the aggregator's
//! write surface. The height of the last successful action is recorded per
//! target.
//!
//! ## Trigger semantics
//!
//! Heads are coalesced through a capacity-1, latest-wins mailbox: if the
//! loop is still busy when new heads arrive, only the newest survives.
//! Missed triggers are skipped, never queued.

pub mod config;
pub mod error;
pub mod mailbox;
pub mod ports;
pub mod service;

pub use config::SchedulerConfig;
pub use error::{SchedulerError, SchedulerResult};
pub use mailbox::Mailbox;
pub use ports::{
    FeePriceEstimator, Head, PipelineOutcome, SubmissionJob, SubmissionPipeline,
    TargetRegistration, TargetStore,
};
pub use service::{apply_fee_buffer, SubmissionScheduler};
