//! Error types for the submission scheduler.

use thiserror::Error;

/// Scheduler error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// The target store could not serve or record registrations.
    #[error("target store error: {0}")]
    TargetStore(String),

    /// The fee estimator had no quote.
    #[error("fee estimation failed: {0}")]
    FeeEstimation(String),

    /// The submission pipeline failed to execute a run.
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// `start()` called on a scheduler that is already running.
    #[error("scheduler already running")]
    AlreadyRunning,
}

/// Result type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;
